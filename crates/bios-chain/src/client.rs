use async_trait::async_trait;
use bios_core::{AccountInfo, AccountName, Action, BiosError, PublicKey};
use bios_crypto::KeyPair;

/// The chain as seen by the launch: one node, one signer, calls strictly in
/// order. Later batches may depend on state committed by earlier ones, so
/// callers never run two calls at once.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Raw chain ID reported by the node.
    async fn chain_id(&self) -> Result<Vec<u8>, BiosError>;

    /// Add `key` to the signer. Keys are never removed.
    async fn import_key(&mut self, key: KeyPair) -> Result<(), BiosError>;

    /// Public keys the signer can sign with.
    fn available_keys(&self) -> Vec<PublicKey>;

    /// Sign `actions` with every available key and submit them as a single
    /// transaction. Returns the transaction ID.
    async fn push_actions(&self, actions: &[Action]) -> Result<String, BiosError>;

    async fn get_account(&self, name: &AccountName) -> Result<AccountInfo, BiosError>;
}
