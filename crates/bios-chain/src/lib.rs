//! bios-chain
//!
//! Everything the launch needs from the chain, behind one trait:
//!
//!   chain_id        - ID of the chain the local node is running
//!   import_key      - add a key to the local signer (kept for the process lifetime)
//!   push_actions    - sign and submit one batch of actions as one transaction
//!   get_account     - read an account's permissions
//!
//! `JsonRpcChainClient` talks to a node over HTTP JSON-RPC; `MemoryChain`
//! applies actions to an in-process account table (dry runs, tests).

pub mod client;
pub mod keybag;
pub mod memory;
pub mod rpc;

pub use client::ChainClient;
pub use keybag::KeyBag;
pub use memory::{MemoryChain, MemoryChainHandle};
pub use rpc::JsonRpcChainClient;
