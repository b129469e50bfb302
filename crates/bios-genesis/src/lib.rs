//! bios-genesis
//!
//! The two documents the boot node hands to everybody else:
//!
//! 1. `GenesisDescriptor`: the `genesis.json` every node starts from:
//!    initial timestamp (the schedule's seed time), the ephemeral public key
//!    as initial authority, and the chain ID reported by the boot node's
//!    chain client.
//! 2. `KickstartPayload`: genesis plus the boot node's p2p address and the
//!    ephemeral keypair, relayed by humans as one unpadded base64 token
//!    (see `codec`).

pub mod codec;
pub mod descriptor;

pub use codec::{decode_kickstart, encode_kickstart};
pub use descriptor::{GenesisDescriptor, KickstartPayload};
