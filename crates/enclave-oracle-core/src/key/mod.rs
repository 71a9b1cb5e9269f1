//! Public-key canonicalization.
//!
//! Attestation and signing stacks emit the same key in several encodings:
//! SEC1 uncompressed (65 bytes with an `0x04` tag), bare uncompressed X‖Y
//! (64 bytes), SEC1 compressed (33 bytes), or a raw 32-byte key from an
//! alternate scheme. The registry keys its entries by exact bytes, so every
//! encoding is normalized to one canonical form before any lookup or
//! insert:
//!
//! 1. 65 bytes tagged `0x04` → strip the tag, then compress.
//! 2. 64 bytes → compress: tag from the parity of the final Y byte
//!    (`0x02` even, `0x03` odd) followed by the 32-byte X coordinate.
//! 3. 33 bytes → pass through; the tag must be `0x02` or `0x03`.
//! 4. 32 bytes → pass through unchanged.
//! 5. Any other length is rejected.
//!
//! No curve-membership check happens here. A 32-byte key may belong to a
//! scheme the oracle's verifier does not support; invalid points are
//! rejected at signature-verification time, not at normalization time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Length of a raw key from an alternate scheme (e.g. X25519).
pub const RAW_KEY_LEN: usize = 32;

/// Length of a SEC1 compressed secp256k1 key (tag + X coordinate).
pub const COMPRESSED_KEY_LEN: usize = 33;

/// Length of a bare uncompressed key (X‖Y, no tag).
pub const UNCOMPRESSED_KEY_LEN: usize = 64;

/// Length of a SEC1 uncompressed key (`0x04` tag + X‖Y).
pub const SEC1_UNCOMPRESSED_LEN: usize = 65;

const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;
const COMPRESSED_EVEN_TAG: u8 = 0x02;
const COMPRESSED_ODD_TAG: u8 = 0x03;

/// Errors raised while canonicalizing a public key.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyError {
    /// The key has a length no supported encoding uses.
    #[error("unsupported public key length: {len} bytes")]
    InvalidLength {
        /// The rejected length.
        len: usize,
    },

    /// A 33-byte key carried a tag other than `0x02`/`0x03`.
    #[error("invalid compressed public key prefix: {prefix:#04x}")]
    InvalidCompressedPrefix {
        /// The rejected tag byte.
        prefix: u8,
    },

    /// A 65-byte key carried a tag other than `0x04`.
    #[error("invalid uncompressed public key prefix: {prefix:#04x}")]
    InvalidUncompressedPrefix {
        /// The rejected tag byte.
        prefix: u8,
    },
}

/// A canonical public key: 33 bytes (compressed secp256k1) or 32 bytes
/// (raw key of an alternate scheme).
///
/// Equality, ordering, and hashing are exact byte comparisons, so two
/// registrations of the same key in different encodings collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Returns the canonical bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the canonical length (32 or 33).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A canonical key is never empty; kept for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this key is shaped like a compressed secp256k1 point.
    ///
    /// Shape only: the point is not checked for curve membership until
    /// signature verification.
    #[must_use]
    pub fn is_compressed_secp256k1(&self) -> bool {
        self.0.len() == COMPRESSED_KEY_LEN
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Canonicalizes a raw public-key byte string.
///
/// # Errors
///
/// Returns [`KeyError::InvalidLength`] for lengths outside
/// {32, 33, 64, 65}, [`KeyError::InvalidUncompressedPrefix`] for a 65-byte
/// key not tagged `0x04`, and [`KeyError::InvalidCompressedPrefix`] for a
/// 33-byte key not tagged `0x02`/`0x03`.
pub fn normalize_public_key(raw: &[u8]) -> Result<PublicKey, KeyError> {
    match raw.len() {
        SEC1_UNCOMPRESSED_LEN => {
            if raw[0] != SEC1_UNCOMPRESSED_TAG {
                return Err(KeyError::InvalidUncompressedPrefix { prefix: raw[0] });
            }
            Ok(PublicKey(compress(&raw[1..])))
        }
        UNCOMPRESSED_KEY_LEN => Ok(PublicKey(compress(raw))),
        COMPRESSED_KEY_LEN => match raw[0] {
            COMPRESSED_EVEN_TAG | COMPRESSED_ODD_TAG => Ok(PublicKey(raw.to_vec())),
            prefix => Err(KeyError::InvalidCompressedPrefix { prefix }),
        },
        RAW_KEY_LEN => Ok(PublicKey(raw.to_vec())),
        len => Err(KeyError::InvalidLength { len }),
    }
}

/// Compresses a bare 64-byte X‖Y key to SEC1 compressed form.
fn compress(xy: &[u8]) -> Vec<u8> {
    debug_assert_eq!(xy.len(), UNCOMPRESSED_KEY_LEN);
    let tag = if xy[UNCOMPRESSED_KEY_LEN - 1] % 2 == 0 {
        COMPRESSED_EVEN_TAG
    } else {
        COMPRESSED_ODD_TAG
    };
    let mut out = Vec::with_capacity(COMPRESSED_KEY_LEN);
    out.push(tag);
    out.extend_from_slice(&xy[..RAW_KEY_LEN]);
    out
}
