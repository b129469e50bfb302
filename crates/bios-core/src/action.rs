use serde::{Deserialize, Serialize};

use crate::types::{AccountName, PermissionLevel};

/// A single contract action, the unit the boot sequence is built from.
///
/// `data` holds the action arguments as JSON; the chain node packs them
/// against the contract ABI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Contract account the action is dispatched to.
    pub account: AccountName,
    /// Action name within the contract (e.g. `newaccount`).
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    pub data: serde_json::Value,
}

impl Action {
    /// Action authorized by `actor@active`.
    pub fn new(
        account: impl Into<AccountName>,
        name: &str,
        actor: impl Into<AccountName>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            account: account.into(),
            name: name.to_string(),
            authorization: vec![PermissionLevel::active(actor)],
            data,
        }
    }
}

/// The body that gets signed: an ordered list of actions submitted atomically.
///
/// The chain ID is part of the signed bytes so a signature cannot be replayed
/// on another network.
#[derive(Serialize)]
pub struct TransactionBody<'a> {
    pub chain_id: &'a [u8],
    pub expiration: i64,
    pub actions: &'a [Action],
}

/// A detached signature together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub public_key: String,
    /// Hex-encoded signature bytes.
    pub signature: String,
}

/// A signed batch of actions, as pushed to the chain node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub expiration: i64,
    pub actions: Vec<Action>,
    pub signatures: Vec<TxSignature>,
}
