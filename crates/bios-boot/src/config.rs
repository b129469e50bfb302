//! Local operator configuration (`bios.json`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bios_core::{AccountName, BiosError, PublicKey};
use bios_crypto::{KeyPair, PrivateKey};
use bios_hooks::HookConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Contract files deployed by `system.setcode`, by contract name.
    #[serde(default)]
    pub contracts: HashMap<String, ContractLocation>,

    #[serde(default)]
    pub opening_balances: OpeningBalances,

    /// The local producing node.
    pub producer: ProducerConfig,

    /// Chain parameters this producer votes for in `regproducer`.
    #[serde(default)]
    pub my_parameters: ProducerParameters,

    /// Lifecycle hooks, by hook key (see `bios_hooks::HOOK_KEYS`).
    #[serde(default)]
    pub hooks: HashMap<String, HookConfig>,

    /// Must all be left at their defaults for a production launch.
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractLocation {
    /// Compiled contract code.
    pub code_path: PathBuf,
    /// Contract ABI (JSON).
    pub abi_path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpeningBalances {
    /// Snapshot JSON with the balances carried over to the new chain.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Account this producer uses on chain; must match a launch-file entry.
    pub my_account: AccountName,
    /// JSON-RPC endpoint of the local, clean-slate node. Need only be
    /// reachable from this machine.
    pub api_address: String,
    /// p2p endpoint published in the kickstart data. Must be externally
    /// routable; kept secret until then.
    pub secret_p2p_address: String,
    /// Key registered to sign blocks.
    pub block_signing_public_key: PublicKey,
    /// File holding the matching private key.
    pub block_signing_private_key_path: PathBuf,
    /// Populated by `Config::load` from the path above.
    #[serde(skip)]
    pub block_signing_key: Option<KeyPair>,
}

/// Chain parameters proposed in `regproducer`; defaults are the chain's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerParameters {
    pub max_block_size: u32,
    pub target_block_size: u32,
    pub max_storage_size: u64,
    pub max_transaction_lifetime: u32,
    pub max_authority_depth: u16,
    pub max_transaction_exec_time: u32,
    pub max_inline_depth: u16,
    pub max_inline_action_size: u32,
    pub max_generated_transaction_size: u32,
    pub max_generated_transaction_count: u32,
}

impl Default for ProducerParameters {
    fn default() -> Self {
        let max_block_size = 1024 * 1024;
        Self {
            max_block_size,
            target_block_size: max_block_size / 10,
            max_storage_size: 10 * 1024,
            max_transaction_lifetime: 60 * 60,
            max_authority_depth: 6,
            max_transaction_exec_time: 10 * 1000,
            max_inline_depth: 4,
            max_inline_action_size: 4 * 1024,
            max_generated_transaction_size: 64 * 1024,
            max_generated_transaction_count: 16,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Keep the launch-file order instead of shuffling. Helps exercise each
    /// role (boot node, ABP, participant) in tests.
    pub no_shuffle: bool,
    /// Leave the system account's keys in place at the end of the boot.
    pub keep_system_account: bool,
    /// Transfer tokens to every producer in the schedule.
    pub enrich_producers: bool,
    /// Use only the first N snapshot lines (0 = all).
    pub truncate_snapshot: usize,
}

impl Config {
    /// Read `bios.json`, validate it and load the block-signing private key.
    pub fn load(path: &Path) -> Result<Self, BiosError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BiosError::Configuration(format!("reading {}: {e}", path.display()))
        })?;
        let mut config = Self::parse(&text)?;
        config.producer.load_signing_key()?;
        Ok(config)
    }

    /// Parse and validate config JSON without touching the key file.
    pub fn parse(json: &str) -> Result<Self, BiosError> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| BiosError::Configuration(format!("parsing config: {e}")))?;

        reqwest::Url::parse(&config.producer.api_address).map_err(|e| {
            BiosError::Configuration(format!(
                "producer.api_address {:?}: {e}",
                config.producer.api_address
            ))
        })?;
        if config.producer.secret_p2p_address.trim().is_empty() {
            return Err(BiosError::Configuration(
                "producer.secret_p2p_address is empty".into(),
            ));
        }

        if config.debug.no_shuffle
            || config.debug.keep_system_account
            || config.debug.enrich_producers
            || config.debug.truncate_snapshot > 0
        {
            info!(debug = ?config.debug, "debug options enabled; not for production launches");
        }
        Ok(config)
    }
}

impl ProducerConfig {
    /// Read and parse the block-signing private key file.
    pub fn load_signing_key(&mut self) -> Result<(), BiosError> {
        let path = &self.block_signing_private_key_path;
        let text = std::fs::read_to_string(path).map_err(|e| {
            BiosError::Configuration(format!("reading private key {}: {e}", path.display()))
        })?;
        let private_key: PrivateKey = text
            .trim()
            .parse()
            .map_err(|e| BiosError::Crypto(format!("block signing key {}: {e}", path.display())))?;
        self.block_signing_key = Some(KeyPair {
            public_key: self.block_signing_public_key.clone(),
            private_key,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bios_crypto::KeyPair;

    fn config_json(key: &PublicKey, key_path: &Path) -> String {
        serde_json::json!({
            "producer": {
                "my_account": "producer01",
                "api_address": "http://127.0.0.1:8888",
                "secret_p2p_address": "10.0.0.1:9876",
                "block_signing_public_key": key,
                "block_signing_private_key_path": key_path,
            },
            "hooks": {
                "done": { "exec": "echo done" }
            },
            "debug": { "no_shuffle": true }
        })
        .to_string()
    }

    #[test]
    fn loads_config_and_private_key() {
        let kp = KeyPair::generate();
        let dir = std::env::temp_dir().join(format!("bios_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let key_path = dir.join("signing.key");
        std::fs::write(&key_path, format!("{}\n", kp.private_key.to_text())).unwrap();
        let config_path = dir.join("bios.json");
        std::fs::write(&config_path, config_json(&kp.public_key, &key_path)).unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.producer.my_account.as_str(), "producer01");
        assert!(config.debug.no_shuffle);
        assert!(!config.debug.enrich_producers);
        assert_eq!(config.hooks["done"].exec, "echo done");
        assert_eq!(config.my_parameters, ProducerParameters::default());
        let loaded = config.producer.block_signing_key.unwrap();
        assert_eq!(loaded.private_key.as_bytes(), kp.private_key.as_bytes());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn bad_api_address_is_a_configuration_error() {
        let kp = KeyPair::generate();
        let json = config_json(&kp.public_key, Path::new("/nonexistent"))
            .replace("http://127.0.0.1:8888", "not a url");
        assert!(matches!(Config::parse(&json), Err(BiosError::Configuration(_))));
    }

    #[test]
    fn missing_key_file_is_a_configuration_error() {
        let kp = KeyPair::generate();
        let mut config = Config::parse(&config_json(&kp.public_key, Path::new("/nonexistent/key"))).unwrap();
        assert!(matches!(
            config.producer.load_signing_key(),
            Err(BiosError::Configuration(_))
        ));
    }

    #[test]
    fn garbage_key_file_is_a_crypto_error() {
        let kp = KeyPair::generate();
        let key_path = std::env::temp_dir().join(format!("bios_bad_key_{}", std::process::id()));
        std::fs::write(&key_path, "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3").unwrap();
        let mut config = Config::parse(&config_json(&kp.public_key, &key_path)).unwrap();
        assert!(matches!(config.producer.load_signing_key(), Err(BiosError::Crypto(_))));
        let _ = std::fs::remove_file(&key_path);
    }

    #[test]
    fn default_parameters_match_chain_defaults() {
        let p = ProducerParameters::default();
        assert_eq!(p.max_block_size, 1_048_576);
        assert_eq!(p.target_block_size, 104_857);
        assert_eq!(p.max_generated_transaction_count, 16);
    }
}
