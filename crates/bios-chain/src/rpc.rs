use async_trait::async_trait;
use bios_core::{AccountInfo, AccountName, Action, BiosError, PublicKey};
use bios_crypto::KeyPair;
use tracing::debug;

use crate::client::ChainClient;
use crate::keybag::KeyBag;

/// Transactions expire this long after they are signed (seconds).
const TX_EXPIRATION_SECS: i64 = 30 * 60;

/// JSON-RPC 2.0 client for the locally booting chain node.
///
/// Uses raw HTTP POST with serde_json; transactions are signed locally with
/// the `KeyBag` before they are pushed.
pub struct JsonRpcChainClient {
    url: String,
    client: reqwest::Client,
    keys: KeyBag,
}

impl JsonRpcChainClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
            keys: KeyBag::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, BiosError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BiosError::Chain(format!("connecting to node at {}: {e}", self.url)))?;

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| BiosError::Chain(format!("parsing RPC response: {e}")))?;

        rpc_result(method, json)
    }
}

/// Split a JSON-RPC response into its result or an error.
fn rpc_result(method: &str, json: serde_json::Value) -> Result<serde_json::Value, BiosError> {
    if let Some(err) = json.get("error") {
        return Err(BiosError::Chain(format!("{method}: RPC error: {err}")));
    }
    Ok(json["result"].clone())
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn chain_id(&self) -> Result<Vec<u8>, BiosError> {
        let result = self.call("chain_getInfo", serde_json::json!([])).await?;
        let id = result["chain_id"]
            .as_str()
            .ok_or_else(|| BiosError::Chain("missing chain_id in info response".into()))?;
        hex::decode(id).map_err(|e| BiosError::Chain(format!("invalid chain_id hex: {e}")))
    }

    async fn import_key(&mut self, key: KeyPair) -> Result<(), BiosError> {
        self.keys.import(key);
        Ok(())
    }

    fn available_keys(&self) -> Vec<PublicKey> {
        self.keys.available_keys()
    }

    async fn push_actions(&self, actions: &[Action]) -> Result<String, BiosError> {
        let chain_id = self.chain_id().await?;
        let expiration = chrono::Utc::now().timestamp() + TX_EXPIRATION_SECS;
        let tx = self.keys.sign(&chain_id, expiration, actions)?;

        let result = self
            .call("chain_pushTransaction", serde_json::json!([tx]))
            .await?;
        let tx_id = result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BiosError::Chain("expected tx_id string from pushTransaction".into()))?;

        debug!(tx_id = %tx_id, actions = actions.len(), "transaction pushed");
        Ok(tx_id)
    }

    async fn get_account(&self, name: &AccountName) -> Result<AccountInfo, BiosError> {
        let result = self
            .call("chain_getAccount", serde_json::json!([name]))
            .await?;
        if result.is_null() {
            return Err(BiosError::Chain(format!("account {name} not found")));
        }
        serde_json::from_value(result)
            .map_err(|e| BiosError::Chain(format!("parsing account {name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_is_surfaced() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "tx rejected"}});
        let err = rpc_result("chain_pushTransaction", json).unwrap_err();
        assert!(err.to_string().contains("tx rejected"));
    }

    #[test]
    fn rpc_result_is_extracted() {
        let json = serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": {"chain_id": "00ff"}});
        assert_eq!(rpc_result("chain_getInfo", json).unwrap()["chain_id"], "00ff");
    }

    #[tokio::test]
    async fn unreachable_node_is_a_chain_error() {
        let client = JsonRpcChainClient::new("http://127.0.0.1:1");
        assert!(matches!(client.chain_id().await, Err(BiosError::Chain(_))));
    }
}
