use bios_core::{BiosError, PublicKey};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey as _, SecretKey as _};

use crate::keypair::PrivateKey;

/// Sign `message` with a Dilithium2 secret key.
/// Returns the detached signature bytes.
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>, BiosError> {
    let sk = dilithium2::SecretKey::from_bytes(private_key.as_bytes())
        .map_err(|e| BiosError::Crypto(format!("loading secret key: {e:?}")))?;
    let sig = dilithium2::detached_sign(message, &sk);
    Ok(sig.as_bytes().to_vec())
}

/// Verify a detached Dilithium2 signature.
pub fn verify_signature(
    public_key: &PublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), BiosError> {
    let pk = dilithium2::PublicKey::from_bytes(&public_key.0).map_err(|_| {
        BiosError::Crypto(format!(
            "invalid public key length: expected {}, got {}",
            dilithium2::public_key_bytes(),
            public_key.0.len()
        ))
    })?;
    let sig = dilithium2::DetachedSignature::from_bytes(signature)
        .map_err(|_| BiosError::Crypto("invalid signature".into()))?;
    dilithium2::verify_detached_signature(&sig, message, &pk)
        .map_err(|_| BiosError::Crypto("invalid signature".into()))
}
