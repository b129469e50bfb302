pub mod dilithium;
pub mod hash;
pub mod keypair;

pub use dilithium::{sign, verify_signature};
pub use hash::shuffle_key;
pub use keypair::{KeyPair, PrivateKey};
