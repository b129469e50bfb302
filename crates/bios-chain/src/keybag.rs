use bios_core::{Action, BiosError, PublicKey, SignedTransaction, TransactionBody, TxSignature};
use bios_crypto::KeyPair;
use tracing::debug;

/// In-memory signer holding every key imported during the run.
#[derive(Default)]
pub struct KeyBag {
    keys: Vec<KeyPair>,
}

impl KeyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; importing the same public key twice is a no-op.
    pub fn import(&mut self, key: KeyPair) {
        if self.keys.iter().any(|k| k.public_key == key.public_key) {
            return;
        }
        debug!(key = ?key.public_key, "key imported into signer");
        self.keys.push(key);
    }

    pub fn available_keys(&self) -> Vec<PublicKey> {
        self.keys.iter().map(|k| k.public_key.clone()).collect()
    }

    /// Sign `actions` for `chain_id` with every key in the bag.
    pub fn sign(
        &self,
        chain_id: &[u8],
        expiration: i64,
        actions: &[Action],
    ) -> Result<SignedTransaction, BiosError> {
        if self.keys.is_empty() {
            return Err(BiosError::Crypto("no keys available to sign with".into()));
        }

        let body = TransactionBody {
            chain_id,
            expiration,
            actions,
        };
        let body_bytes =
            bincode::serialize(&body).map_err(|e| BiosError::Serialization(e.to_string()))?;

        let signatures = self
            .keys
            .iter()
            .map(|k| {
                Ok(TxSignature {
                    public_key: k.public_key.to_string(),
                    signature: hex::encode(k.sign(&body_bytes)?),
                })
            })
            .collect::<Result<Vec<_>, BiosError>>()?;

        Ok(SignedTransaction {
            expiration,
            actions: actions.to_vec(),
            signatures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bios_crypto::verify_signature;

    fn action() -> Action {
        Action::new("eosio", "setpriv", "eosio", serde_json::json!({"account": "eosio.msig", "is_priv": 1}))
    }

    #[test]
    fn signs_with_every_key() {
        let mut bag = KeyBag::new();
        let a = KeyPair::generate();
        let b = KeyPair::generate();
        bag.import(a.clone());
        bag.import(b.clone());
        bag.import(a.clone());
        assert_eq!(bag.available_keys(), vec![a.public_key.clone(), b.public_key.clone()]);

        let actions = vec![action()];
        let tx = bag.sign(&[1, 2, 3], 1_700_000_000, &actions).unwrap();
        assert_eq!(tx.signatures.len(), 2);

        let body = bincode::serialize(&TransactionBody {
            chain_id: &[1, 2, 3],
            expiration: 1_700_000_000,
            actions: &actions,
        })
        .unwrap();
        let sig = hex::decode(&tx.signatures[0].signature).unwrap();
        assert!(verify_signature(&a.public_key, &body, &sig).is_ok());
    }

    #[test]
    fn signature_is_bound_to_chain_id() {
        let mut bag = KeyBag::new();
        let kp = KeyPair::generate();
        bag.import(kp.clone());
        let actions = vec![action()];
        let tx = bag.sign(&[1], 0, &actions).unwrap();

        let other_chain = bincode::serialize(&TransactionBody {
            chain_id: &[2],
            expiration: 0,
            actions: &actions,
        })
        .unwrap();
        let sig = hex::decode(&tx.signatures[0].signature).unwrap();
        assert!(verify_signature(&kp.public_key, &other_chain, &sig).is_err());
    }

    #[test]
    fn empty_bag_cannot_sign() {
        assert!(matches!(
            KeyBag::new().sign(&[], 0, &[action()]),
            Err(BiosError::Crypto(_))
        ));
    }
}
