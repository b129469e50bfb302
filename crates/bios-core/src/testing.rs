//! Fixtures shared by the workspace's tests.

use crate::constants::PUBLIC_KEY_BYTES;
use crate::types::{Authority, ProducerAuthority, ProducerDef, PublicKey};

/// A candidate whose keys are all `key_byte` repeated, with no URLs.
pub fn producer(name: &str, key_byte: u8) -> ProducerDef {
    let key = PublicKey(vec![key_byte; PUBLIC_KEY_BYTES]);
    ProducerDef {
        account_name: name.into(),
        authority: ProducerAuthority {
            owner: Authority::single_key(key.clone()),
            active: Authority::single_key(key.clone()),
        },
        initial_block_signing_public_key: key,
        keybase_user: String::new(),
        pgp_public_key: String::new(),
        organization_name: format!("Org {name}"),
        timezone: "UTC".into(),
        urls: Vec::new(),
        cloned_from: None,
    }
}
