use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bios_core::constants::SYSTEM_ACCOUNT;
use bios_core::{AccountInfo, AccountName, Action, Authority, BiosError, Permission, PublicKey};
use bios_crypto::KeyPair;
use serde::Deserialize;
use tracing::debug;

use crate::client::ChainClient;
use crate::keybag::KeyBag;

/// Account table and push log shared between a `MemoryChain` and its handles.
#[derive(Default)]
struct MemoryState {
    accounts: BTreeMap<AccountName, AccountInfo>,
    pushed: Vec<Vec<Action>>,
    reject_push: Option<usize>,
    failing_reads: usize,
}

/// In-process chain: applies `newaccount` and `updateauth` to an account
/// table and records every pushed batch. Backs `bios run --dry-run` and the
/// test suites.
pub struct MemoryChain {
    chain_id: Vec<u8>,
    keys: KeyBag,
    state: Arc<Mutex<MemoryState>>,
}

/// Inspection and fault-injection handle onto a `MemoryChain`.
#[derive(Clone)]
pub struct MemoryChainHandle {
    chain_id: Vec<u8>,
    state: Arc<Mutex<MemoryState>>,
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryChain {
    /// A fresh chain holding only the system account, controlled by
    /// `system_key`.
    pub fn new(chain_id: Vec<u8>, system_key: &PublicKey) -> Self {
        let mut state = MemoryState::default();
        let system = AccountName::from(SYSTEM_ACCOUNT);
        state.accounts.insert(
            system.clone(),
            account(
                system,
                Authority::single_key(system_key.clone()),
                Authority::single_key(system_key.clone()),
            ),
        );
        Self {
            chain_id,
            keys: KeyBag::new(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn handle(&self) -> MemoryChainHandle {
        MemoryChainHandle {
            chain_id: self.chain_id.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl MemoryChainHandle {
    /// Another client onto the same chain, with its own empty key bag.
    pub fn connect(&self) -> MemoryChain {
        MemoryChain {
            chain_id: self.chain_id.clone(),
            keys: KeyBag::new(),
            state: Arc::clone(&self.state),
        }
    }

    /// Every batch pushed so far, in submission order.
    pub fn pushed(&self) -> Vec<Vec<Action>> {
        lock(&self.state).pushed.clone()
    }

    /// Reject the push with this 0-based index (counting all pushes).
    pub fn reject_push(&self, index: usize) {
        lock(&self.state).reject_push = Some(index);
    }

    /// Make the next `count` account reads fail.
    pub fn fail_reads(&self, count: usize) {
        lock(&self.state).failing_reads = count;
    }

    pub fn account(&self, name: &str) -> Option<AccountInfo> {
        lock(&self.state).accounts.get(&AccountName::from(name)).cloned()
    }

    /// Overwrite (or create) an account.
    pub fn set_account(&self, info: AccountInfo) {
        lock(&self.state)
            .accounts
            .insert(info.account_name.clone(), info);
    }
}

fn account(name: AccountName, owner: Authority, active: Authority) -> AccountInfo {
    AccountInfo {
        account_name: name,
        permissions: vec![
            Permission {
                perm_name: "owner".into(),
                parent: String::new(),
                required_auth: owner,
            },
            Permission {
                perm_name: "active".into(),
                parent: "owner".into(),
                required_auth: active,
            },
        ],
    }
}

#[derive(Deserialize)]
struct NewAccount {
    name: AccountName,
    owner: Authority,
    active: Authority,
}

#[derive(Deserialize)]
struct UpdateAuth {
    account: AccountName,
    permission: String,
    #[serde(default)]
    parent: String,
    auth: Authority,
}

impl MemoryState {
    fn apply(&mut self, action: &Action) -> Result<(), BiosError> {
        match action.name.as_str() {
            "newaccount" => {
                let data: NewAccount = serde_json::from_value(action.data.clone())
                    .map_err(|e| BiosError::Chain(format!("newaccount: {e}")))?;
                if self.accounts.contains_key(&data.name) {
                    return Err(BiosError::Chain(format!("account {} already exists", data.name)));
                }
                self.accounts
                    .insert(data.name.clone(), account(data.name, data.owner, data.active));
            }
            "updateauth" => {
                let data: UpdateAuth = serde_json::from_value(action.data.clone())
                    .map_err(|e| BiosError::Chain(format!("updateauth: {e}")))?;
                let info = self
                    .accounts
                    .get_mut(&data.account)
                    .ok_or_else(|| BiosError::Chain(format!("unknown account {}", data.account)))?;
                match info.permissions.iter_mut().find(|p| p.perm_name == data.permission) {
                    Some(perm) => perm.required_auth = data.auth,
                    None => info.permissions.push(Permission {
                        perm_name: data.permission,
                        parent: data.parent,
                        required_auth: data.auth,
                    }),
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MemoryChain {
    async fn chain_id(&self) -> Result<Vec<u8>, BiosError> {
        Ok(self.chain_id.clone())
    }

    async fn import_key(&mut self, key: KeyPair) -> Result<(), BiosError> {
        self.keys.import(key);
        Ok(())
    }

    fn available_keys(&self) -> Vec<PublicKey> {
        self.keys.available_keys()
    }

    async fn push_actions(&self, actions: &[Action]) -> Result<String, BiosError> {
        let tx = self.keys.sign(&self.chain_id, 0, actions)?;

        let mut state = lock(&self.state);
        let index = state.pushed.len();
        if state.reject_push == Some(index) {
            return Err(BiosError::Chain(format!("transaction {index} rejected")));
        }

        // Transactions are atomic: roll back the table if any action fails.
        let snapshot = state.accounts.clone();
        for action in &tx.actions {
            if let Err(e) = state.apply(action) {
                state.accounts = snapshot;
                return Err(e);
            }
        }
        state.pushed.push(tx.actions);
        debug!(index, actions = actions.len(), "memory chain accepted transaction");
        Ok(format!("memtx-{index}"))
    }

    async fn get_account(&self, name: &AccountName) -> Result<AccountInfo, BiosError> {
        let mut state = lock(&self.state);
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(BiosError::Chain("account read failed".into()));
        }
        state
            .accounts
            .get(name)
            .cloned()
            .ok_or_else(|| BiosError::Chain(format!("account {name} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain() -> (MemoryChain, KeyPair) {
        let kp = KeyPair::generate();
        let mut chain = MemoryChain::new(vec![9; 32], &kp.public_key);
        chain.keys.import(kp.clone());
        (chain, kp)
    }

    fn new_account(name: &str, key: &PublicKey) -> Action {
        Action::new(
            SYSTEM_ACCOUNT,
            "newaccount",
            SYSTEM_ACCOUNT,
            json!({
                "creator": SYSTEM_ACCOUNT,
                "name": name,
                "owner": Authority::single_key(key.clone()),
                "active": Authority::single_key(key.clone()),
            }),
        )
    }

    #[tokio::test]
    async fn applies_newaccount_and_updateauth() {
        let (chain, kp) = chain();
        chain
            .push_actions(&[new_account("alice", &kp.public_key)])
            .await
            .unwrap();

        let disable = Action::new(
            SYSTEM_ACCOUNT,
            "updateauth",
            "alice",
            json!({"account": "alice", "permission": "active", "parent": "owner", "auth": Authority::disabled()}),
        );
        chain.push_actions(&[disable]).await.unwrap();

        let alice = chain.get_account(&"alice".into()).await.unwrap();
        assert_eq!(alice.permissions[1].required_auth.threshold, 0);
        assert_eq!(chain.handle().pushed().len(), 2);
    }

    #[tokio::test]
    async fn failed_transaction_leaves_no_trace() {
        let (chain, kp) = chain();
        let batch = [new_account("bob", &kp.public_key), new_account("bob", &kp.public_key)];
        assert!(chain.push_actions(&batch).await.is_err());
        assert!(chain.handle().account("bob").is_none());
        assert!(chain.handle().pushed().is_empty());
    }

    #[tokio::test]
    async fn injected_faults() {
        let (chain, _) = chain();
        let handle = chain.handle();
        handle.reject_push(0);
        assert!(chain.push_actions(&[]).await.is_err());

        handle.fail_reads(1);
        assert!(chain.get_account(&SYSTEM_ACCOUNT.into()).await.is_err());
        assert!(chain.get_account(&SYSTEM_ACCOUNT.into()).await.is_ok());
    }

    #[tokio::test]
    async fn connected_clients_share_state() {
        let (chain, kp) = chain();
        let other = chain.handle().connect();
        chain
            .push_actions(&[new_account("dave", &kp.public_key)])
            .await
            .unwrap();
        assert!(other.get_account(&"dave".into()).await.is_ok());
        assert!(other.available_keys().is_empty());
        assert_eq!(other.chain_id().await.unwrap(), vec![9; 32]);
    }

    #[tokio::test]
    async fn unsigned_push_is_refused() {
        let kp = KeyPair::generate();
        let chain = MemoryChain::new(vec![1], &kp.public_key);
        assert!(matches!(
            chain.push_actions(&[new_account("carol", &kp.public_key)]).await,
            Err(BiosError::Crypto(_))
        ));
    }
}
