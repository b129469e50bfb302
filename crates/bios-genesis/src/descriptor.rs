use bios_core::constants::GENESIS_TIMESTAMP_FORMAT;
use bios_core::{BiosError, PublicKey};
use bios_crypto::PrivateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Genesis parameters every node of the new network boots from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDescriptor {
    /// `YYYY-MM-DDTHH:MM:SS`, UTC, second precision.
    pub initial_timestamp: String,
    /// The ephemeral public key, sole initial authority of the chain.
    pub initial_key: String,
    /// Hex-encoded chain ID.
    pub initial_chain_id: String,
}

impl GenesisDescriptor {
    pub fn new(timestamp: DateTime<Utc>, initial_key: &PublicKey, chain_id: &[u8]) -> Self {
        Self {
            initial_timestamp: timestamp.format(GENESIS_TIMESTAMP_FORMAT).to_string(),
            initial_key: initial_key.to_string(),
            initial_chain_id: hex::encode(chain_id),
        }
    }

    /// The `genesis.json` text carried inside the kickstart payload.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("GenesisDescriptor serialization is infallible")
    }

    pub fn from_json(json: &str) -> Result<Self, BiosError> {
        serde_json::from_str(json).map_err(|e| BiosError::MalformedHandoff(format!("genesis json: {e}")))
    }
}

/// Network-join data published by the boot node.
///
/// Never persisted: it exists only as the encoded text the operators relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickstartPayload {
    /// Externally routable p2p endpoint of the boot node.
    pub bios_p2p_address: String,
    pub public_key_used: String,
    pub private_key_used: String,
    /// `GenesisDescriptor` as JSON text.
    pub genesis_json: String,
}

impl KickstartPayload {
    pub fn new(
        p2p_address: &str,
        public_key: &PublicKey,
        private_key: &PrivateKey,
        genesis: &GenesisDescriptor,
    ) -> Self {
        Self {
            bios_p2p_address: p2p_address.to_string(),
            public_key_used: public_key.to_string(),
            private_key_used: private_key.to_text(),
            genesis_json: genesis.to_json(),
        }
    }

    /// Parse the embedded ephemeral private key.
    pub fn ephemeral_private_key(&self) -> Result<PrivateKey, BiosError> {
        self.private_key_used.parse()
    }

    pub fn genesis(&self) -> Result<GenesisDescriptor, BiosError> {
        GenesisDescriptor::from_json(&self.genesis_json)
    }
}
