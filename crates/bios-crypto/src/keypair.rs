use std::fmt;
use std::str::FromStr;

use bios_core::constants::PRIVATE_KEY_PREFIX;
use bios_core::{BiosError, PublicKey};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{PublicKey as _, SecretKey as _};
use zeroize::Zeroizing;

/// Dilithium2 secret key, written as `PVT_DIL2_<hex>`.
///
/// The bytes live in a `Zeroizing<Vec<u8>>` and are wiped on drop.
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<Vec<u8>>);

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Text form, suitable for key files and the kickstart payload.
    pub fn to_text(&self) -> String {
        format!("{}{}", PRIVATE_KEY_PREFIX, hex::encode(self.0.as_slice()))
    }
}

impl FromStr for PrivateKey {
    type Err = BiosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Never echo the key material back in the error.
        let shown = format!("{PRIVATE_KEY_PREFIX}…");
        let body = s
            .strip_prefix(PRIVATE_KEY_PREFIX)
            .ok_or_else(|| BiosError::invalid_key(&shown, format!("missing {PRIVATE_KEY_PREFIX} prefix")))?;
        let bytes = Zeroizing::new(
            hex::decode(body).map_err(|e| BiosError::invalid_key(&shown, e.to_string()))?,
        );
        dilithium2::SecretKey::from_bytes(&bytes).map_err(|_| {
            BiosError::invalid_key(
                &shown,
                format!(
                    "expected {} bytes, got {}",
                    dilithium2::secret_key_bytes(),
                    bytes.len()
                ),
            )
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

/// A Dilithium2 keypair: the ephemeral boot key, or a loaded block-signing key.
#[derive(Clone)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    /// Generate a fresh Dilithium2 keypair from OS entropy.
    pub fn generate() -> Self {
        let (pk, sk) = dilithium2::keypair();
        Self {
            public_key: PublicKey(pk.as_bytes().to_vec()),
            private_key: PrivateKey(Zeroizing::new(sk.as_bytes().to_vec())),
        }
    }

    /// Restore a keypair from its text forms.
    ///
    /// The two halves are parsed independently; nothing checks that they
    /// belong together.
    pub fn from_text(public_key: &str, private_key: &str) -> Result<Self, BiosError> {
        Ok(Self {
            public_key: public_key.parse()?,
            private_key: private_key.parse()?,
        })
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, BiosError> {
        crate::dilithium::sign(&self.private_key, message)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_key_text_round_trip() {
        let kp = KeyPair::generate();
        let text = kp.private_key.to_text();
        assert!(text.starts_with(PRIVATE_KEY_PREFIX));

        let parsed: PrivateKey = text.parse().unwrap();
        assert_eq!(parsed.as_bytes(), kp.private_key.as_bytes());
    }

    #[test]
    fn private_key_rejects_garbage() {
        for bad in ["", "PVT_DIL2_", "PVT_DIL2_not-hex", "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3"] {
            assert!(
                matches!(bad.parse::<PrivateKey>(), Err(BiosError::InvalidKey { .. })),
                "{bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn invalid_key_error_does_not_leak_material() {
        let err = "PVT_DIL2_deadbeef".parse::<PrivateKey>().unwrap_err();
        assert!(!err.to_string().contains("deadbeef"));
    }

    #[test]
    fn from_text_restores_generated_pair() {
        let kp = KeyPair::generate();
        let restored =
            KeyPair::from_text(&kp.public_key.to_string(), &kp.private_key.to_text()).unwrap();
        assert_eq!(restored.public_key, kp.public_key);
    }
}
