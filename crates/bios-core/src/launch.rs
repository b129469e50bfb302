use serde::{Deserialize, Serialize};

use crate::types::{AccountName, ProducerDef, PublicKey};

/// Everything every operator agrees on before launch: the candidate
/// producers and the boot sequence the boot node will execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchData {
    pub producers: Vec<ProducerDef>,
    #[serde(default)]
    pub boot_sequence: Vec<BootStep>,
}

/// One named step of the boot sequence.
///
/// `op` selects the action builder; `data` is that builder's argument
/// object and is interpreted only by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootStep {
    pub label: String,
    pub op: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl BootStep {
    pub fn new(label: &str, op: &str, data: serde_json::Value) -> Self {
        Self {
            label: label.to_string(),
            op: op.to_string(),
            data,
        }
    }
}

/// One line of the opening-balances snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub account_name: AccountName,
    pub public_key: PublicKey,
    /// Asset string, e.g. `"1000.0000 SYS"`.
    pub balance: String,
}

/// Opening balances carried over to the new chain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub Vec<SnapshotLine>);

impl Snapshot {
    /// The first `limit` lines, or all of them when `limit` is 0.
    pub fn truncated(&self, limit: usize) -> &[SnapshotLine] {
        if limit == 0 || limit >= self.0.len() {
            &self.0
        } else {
            &self.0[..limit]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_step_data_defaults_to_null() {
        let step: BootStep =
            serde_json::from_str(r#"{"label":"Set privileged","op":"system.setpriv"}"#).unwrap();
        assert_eq!(step.op, "system.setpriv");
        assert!(step.data.is_null());
    }

    #[test]
    fn snapshot_truncation() {
        let line = SnapshotLine {
            account_name: "holder".into(),
            public_key: PublicKey(vec![1; crate::PUBLIC_KEY_BYTES]),
            balance: "1.0000 SYS".into(),
        };
        let snap = Snapshot(vec![line; 5]);
        assert_eq!(snap.truncated(0).len(), 5);
        assert_eq!(snap.truncated(2).len(), 2);
        assert_eq!(snap.truncated(9).len(), 5);
    }
}
