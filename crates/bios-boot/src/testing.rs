//! Shared fixtures for the unit tests.

use std::collections::HashMap;

use bios_core::{LaunchData, ProducerDef};
use bios_crypto::KeyPair;
use bios_schedule::ShuffleSeed;
use chrono::{TimeZone, Utc};

use crate::config::{Config, DebugConfig, ProducerConfig, ProducerParameters};

/// A candidate with a `https://<name>.example` URL.
pub fn producer(name: &str, key_byte: u8) -> ProducerDef {
    ProducerDef {
        urls: vec![format!("https://{name}.example")],
        ..bios_core::testing::producer(name, key_byte)
    }
}

/// `producer00`, `producer01`, ... with no boot sequence.
pub fn launch_data(n: usize) -> LaunchData {
    LaunchData {
        producers: (0..n).map(|i| producer(&format!("producer{i:02}"), i as u8)).collect(),
        boot_sequence: Vec::new(),
    }
}

/// Unshuffled config for `account`, with a freshly generated signing key.
pub fn config_for(account: &str) -> Config {
    let key = KeyPair::generate();
    Config {
        contracts: HashMap::new(),
        opening_balances: Default::default(),
        producer: ProducerConfig {
            my_account: account.into(),
            api_address: "http://127.0.0.1:8888".into(),
            secret_p2p_address: "10.0.0.1:9876".into(),
            block_signing_public_key: key.public_key.clone(),
            block_signing_private_key_path: "/dev/null".into(),
            block_signing_key: Some(key),
        },
        my_parameters: ProducerParameters::default(),
        hooks: HashMap::new(),
        debug: DebugConfig {
            no_shuffle: true,
            ..DebugConfig::default()
        },
    }
}

pub fn seed() -> ShuffleSeed {
    ShuffleSeed::new(
        Utc.with_ymd_and_hms(2018, 6, 1, 12, 0, 0).unwrap(),
        (1..=32).collect(),
    )
}
