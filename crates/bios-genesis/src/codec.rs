//! Kickstart handoff codec.
//!
//! Wire form: `base64(json(KickstartPayload))`, standard alphabet, no padding,
//! one contiguous token. Decoding ignores any whitespace, so text that was
//! wrapped or re-flowed on its way through chat or email still decodes.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use bios_core::BiosError;
use tracing::debug;

use crate::descriptor::KickstartPayload;

/// Encode a payload as a single unpadded base64 token.
pub fn encode_kickstart(payload: &KickstartPayload) -> String {
    let json = serde_json::to_vec(payload).expect("KickstartPayload serialization is infallible");
    STANDARD_NO_PAD.encode(json)
}

/// Decode relayed kickstart text.
///
/// Fails with `MalformedHandoff` when the text is not base64 or not a
/// payload, and with `InvalidKey` when the embedded private key does not
/// parse. The public and private keys are not checked against each other.
pub fn decode_kickstart(text: &str) -> Result<KickstartPayload, BiosError> {
    let token: String = text.split_whitespace().collect();

    let raw = STANDARD_NO_PAD
        .decode(token.as_bytes())
        .map_err(|e| BiosError::MalformedHandoff(format!("kickstart base64 decode: {e}")))?;

    let payload: KickstartPayload = serde_json::from_slice(&raw)
        .map_err(|e| BiosError::MalformedHandoff(format!("unmarshal kickstart data: {e}")))?;

    payload.ephemeral_private_key()?;

    debug!(
        p2p_address = %payload.bios_p2p_address,
        bytes = raw.len(),
        "kickstart data decoded"
    );
    Ok(payload)
}
