//! Oracle-specific error types.

use thiserror::Error;
use uuid::Uuid;

use crate::intent::IntentError;
use crate::registry::RegistryError;

/// Errors raised by oracle configuration, updates, and reads.
///
/// Every variant is a failed precondition: the first one hit aborts the
/// whole call with no partial mutation, and retry policy belongs to the
/// caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OracleError {
    /// The presented capability is bound to a different oracle.
    #[error("capability is not bound to oracle {oracle_id}")]
    InvalidCapability {
        /// The oracle that rejected the capability.
        oracle_id: Uuid,
    },

    /// The oracle has not been configured with expected PCRs yet.
    #[error("expected PCRs are not initialized; configure the oracle before updating")]
    PcrsNotInitialized,

    /// The submission is outside the staleness window or from the future.
    #[error("stale price: timestamp_ms={timestamp_ms}, current_time_ms={current_time_ms}")]
    StalePrice {
        /// The submitted timestamp.
        timestamp_ms: u64,
        /// The host-supplied current time.
        current_time_ms: u64,
    },

    /// Registry lookup failed (typically an unregistered key).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The submitting key's registered measurements differ from the
    /// expected ones.
    #[error("registered PCRs do not match the expected PCRs")]
    InvalidPcrs,

    /// The signature over the canonical intent encoding did not verify.
    #[error("price update signature verification failed")]
    InvalidSignature,

    /// The signing preimage could not be built or the signature had an
    /// invalid shape.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// A price for this timestamp was already recorded (replay guard).
    #[error("price already recorded for timestamp_ms={timestamp_ms}")]
    DuplicateTimestamp {
        /// The duplicated timestamp.
        timestamp_ms: u64,
    },

    /// No price has ever been accepted.
    #[error("no price available yet")]
    NoPriceAvailable,

    /// No price is recorded at the requested timestamp.
    #[error("no price recorded at timestamp_ms={timestamp_ms}")]
    NoPriceAtTimestamp {
        /// The requested timestamp.
        timestamp_ms: u64,
    },
}
