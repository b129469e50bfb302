use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{PUBLIC_KEY_BYTES, PUBLIC_KEY_PREFIX};
use crate::error::BiosError;

// ── AccountName ──────────────────────────────────────────────────────────────

/// On-chain account identifier (e.g. `eosio`, `producer1`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountName(pub String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `len` characters of the name.
    pub fn prefix(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self.0)
    }
}

impl From<&str> for AccountName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for AccountName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// ── PublicKey ────────────────────────────────────────────────────────────────

/// Dilithium2 public key (1312 bytes), written as `PUB_DIL2_<hex>`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub Vec<u8>);

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PUBLIC_KEY_PREFIX, hex::encode(&self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(&self.0);
        write!(f, "PublicKey({}…)", &hex[..hex.len().min(16)])
    }
}

impl FromStr for PublicKey {
    type Err = BiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(PUBLIC_KEY_PREFIX)
            .ok_or_else(|| BiosError::invalid_key(s, format!("missing {PUBLIC_KEY_PREFIX} prefix")))?;
        let bytes = hex::decode(body).map_err(|e| BiosError::invalid_key(s, e.to_string()))?;
        if bytes.len() != PUBLIC_KEY_BYTES {
            return Err(BiosError::invalid_key(
                s,
                format!("expected {PUBLIC_KEY_BYTES} bytes, got {}", bytes.len()),
            ));
        }
        Ok(Self(bytes))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Authorities ──────────────────────────────────────────────────────────────

/// `actor@permission` pair authorizing an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: AccountName,
    pub permission: String,
}

impl PermissionLevel {
    pub fn new(actor: impl Into<AccountName>, permission: &str) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.to_string(),
        }
    }

    pub fn active(actor: impl Into<AccountName>) -> Self {
        Self::new(actor, "active")
    }
}

impl From<&AccountName> for AccountName {
    fn from(a: &AccountName) -> Self {
        a.clone()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyWeight {
    pub key: PublicKey,
    pub weight: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevelWeight {
    pub permission: PermissionLevel,
    pub weight: u16,
}

/// Weighted key/account set with the threshold needed to satisfy it.
/// A threshold of 0 marks a disabled permission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub threshold: u32,
    #[serde(default)]
    pub keys: Vec<KeyWeight>,
    #[serde(default)]
    pub accounts: Vec<PermissionLevelWeight>,
}

impl Authority {
    /// Single-key authority with threshold 1.
    pub fn single_key(key: PublicKey) -> Self {
        Self {
            threshold: 1,
            keys: vec![KeyWeight { key, weight: 1 }],
            accounts: Vec::new(),
        }
    }

    /// Authority delegated entirely to `actor@permission`.
    pub fn delegated(actor: impl Into<AccountName>, permission: &str) -> Self {
        Self {
            threshold: 1,
            keys: Vec::new(),
            accounts: vec![PermissionLevelWeight {
                permission: PermissionLevel::new(actor, permission),
                weight: 1,
            }],
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Owner and active authorities a producer account is created with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerAuthority {
    pub owner: Authority,
    pub active: Authority,
}

// ── ProducerDef ──────────────────────────────────────────────────────────────

/// A candidate producer listed in the launch file.
///
/// Entries added to pad a short schedule carry `cloned_from`, a by-name
/// back-reference to the candidate they were copied from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerDef {
    pub account_name: AccountName,
    pub authority: ProducerAuthority,
    pub initial_block_signing_public_key: PublicKey,
    #[serde(default)]
    pub keybase_user: String,
    #[serde(default)]
    pub pgp_public_key: String,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<AccountName>,
}

impl ProducerDef {
    /// Copy of this producer answering to `account_name`, pointing back here.
    pub fn clone_as(&self, account_name: AccountName) -> Self {
        Self {
            account_name,
            cloned_from: Some(self.account_name.clone()),
            ..self.clone()
        }
    }

    pub fn is_clone(&self) -> bool {
        self.cloned_from.is_some()
    }
}

impl fmt::Display for ProducerDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.account_name, self.organization_name)?;
        if let Some(source) = &self.cloned_from {
            write!(f, " [clone of {source}]")?;
        }
        Ok(())
    }
}

// ── Chain state ──────────────────────────────────────────────────────────────

/// One named permission of an on-chain account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub perm_name: String,
    #[serde(default)]
    pub parent: String,
    pub required_auth: Authority,
}

/// Account state as reported by the chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_name: AccountName,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}
