//! Canonical intent serialization and signature verification.
//!
//! The off-chain signer and this verifier must agree byte-for-byte on the
//! signing preimage; any drift in field order, width, or membership
//! silently invalidates every signature. The contract is therefore fixed
//! here and versioned, never left to incidental compatibility.
//!
//! # Wire format
//!
//! The preimage is the BCS encoding of
//! `IntentMessage { intent: u8, timestamp_ms: u64, data: PriceUpdatePayload { price: u64 } }`:
//! unsigned little-endian fixed-width integers in declared field order with
//! no padding; 17 bytes total for a price update. The digest is SHA-256 of
//! those bytes; the signature is non-recoverable compact ECDSA-secp256k1
//! (r‖s, 64 bytes) over the digest.
//!
//! Keys that are not compressed secp256k1 points verify as `false` here;
//! the normalizer deliberately defers curve rejection to this stage.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::key::PublicKey;

/// Intent scope for price updates. Must match the off-chain signer.
pub const PRICE_INTENT_SCOPE: u8 = 0;

/// Compact signature length (r‖s, no recovery id).
pub const SIGNATURE_LEN: usize = 64;

/// Fixed-point scale the signer applies to prices (10^6).
pub const PRICE_SCALE: u64 = 1_000_000;

/// SHA-256 digest length.
pub const DIGEST_LEN: usize = 32;

/// Errors raised while building or checking a signing preimage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IntentError {
    /// BCS encoding of the intent message failed.
    #[error("failed to serialize intent message: {0}")]
    Serialize(#[from] bcs::Error),

    /// The submitted signature is not 64 bytes.
    #[error("signature must be 64 bytes, got {len}")]
    InvalidSignatureLength {
        /// The rejected length.
        len: usize,
    },
}

/// The domain-separated envelope every signed message travels in.
///
/// Field order and widths are part of the signing contract; do not reorder
/// or widen without versioning the intent scope.
#[derive(Debug, Clone, Serialize)]
pub struct IntentMessage<T> {
    /// Domain separator.
    pub intent: u8,
    /// Unix milliseconds at signing time.
    pub timestamp_ms: u64,
    /// The signed payload.
    pub data: T,
}

/// Payload of a price-update intent.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PriceUpdatePayload {
    /// Fixed-point price, scaled by [`PRICE_SCALE`].
    pub price: u64,
}

/// Builds the exact signing preimage for a price update.
///
/// # Errors
///
/// Returns [`IntentError::Serialize`] if BCS encoding fails.
pub fn signing_bytes(intent: u8, timestamp_ms: u64, price: u64) -> Result<Vec<u8>, IntentError> {
    let message = IntentMessage {
        intent,
        timestamp_ms,
        data: PriceUpdatePayload { price },
    };
    Ok(bcs::to_bytes(&message)?)
}

/// SHA-256 digest of the signing preimage.
///
/// # Errors
///
/// Returns [`IntentError::Serialize`] if BCS encoding fails.
pub fn signing_digest(
    intent: u8,
    timestamp_ms: u64,
    price: u64,
) -> Result<[u8; DIGEST_LEN], IntentError> {
    let bytes = signing_bytes(intent, timestamp_ms, price)?;
    Ok(Sha256::digest(&bytes).into())
}

/// Verifies a compact secp256k1 signature over a price-update intent.
///
/// Returns `Ok(false)` (rather than an error) when the key is not a valid
/// compressed secp256k1 point or the signature does not parse or verify:
/// those are trust failures, not caller mistakes.
///
/// # Errors
///
/// Returns [`IntentError::InvalidSignatureLength`] for signatures that are
/// not exactly 64 bytes.
pub fn verify_price_signature(
    public_key: &PublicKey,
    signature: &[u8],
    timestamp_ms: u64,
    price: u64,
) -> Result<bool, IntentError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(IntentError::InvalidSignatureLength {
            len: signature.len(),
        });
    }
    if !public_key.is_compressed_secp256k1() {
        return Ok(false);
    }
    let digest = signing_digest(PRICE_INTENT_SCOPE, timestamp_ms, price)?;

    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key.as_bytes()) else {
        return Ok(false);
    };
    let Ok(parsed) = Signature::from_slice(signature) else {
        return Ok(false);
    };
    Ok(verifying_key.verify_prehash(&digest, &parsed).is_ok())
}
