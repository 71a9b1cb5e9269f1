//! Price oracle: trust policy, price ledger, and the update orchestrator.
//!
//! # State machine
//!
//! ```text
//! PriceOracle::new --> Uninitialized (pcrs_initialized = false)
//!                         |
//!                         v  update_expected_pcrs(&AdminCap, ...)
//!                      Configured (one-way; reconfiguration allowed)
//!                         |
//!                         v  update_price(...)
//!                      ledger entry + latest pointer + PriceUpdated
//! ```
//!
//! Only a Configured oracle accepts price updates. `update_price` runs the
//! full trust gate in a fixed order (configured, fresh, trusted PCRs,
//! valid signature, unseen timestamp) and every check precedes the first
//! mutation, so any failure leaves zero observable change.
//!
//! # Authorization
//!
//! [`AdminCap`] is minted once, alongside its oracle, with the oracle's
//! identifier embedded. It is not `Clone` and its field is private, so
//! within safe Rust it cannot be forged; the capability check is a value
//! comparison against the protected instance's stored identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::attestation::PcrSet;
use crate::events::{EventSink, OracleEvent, TracingEventSink};
use crate::intent::verify_price_signature;
use crate::key::PublicKey;
use crate::registry::AttestationRegistry;

mod error;


pub use error::OracleError;

/// Default staleness window: one hour in milliseconds.
pub const DEFAULT_MAX_PRICE_AGE_MS: u64 = 3_600_000;

/// Oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Maximum tolerated age of a submission, in milliseconds. Equality is
    /// accepted on both boundaries of the window.
    #[serde(default = "default_max_price_age_ms")]
    pub max_price_age_ms: u64,
}

fn default_max_price_age_ms() -> u64 {
    DEFAULT_MAX_PRICE_AGE_MS
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_price_age_ms: DEFAULT_MAX_PRICE_AGE_MS,
        }
    }
}

/// Unforgeable authorization token for oracle configuration.
///
/// Minted exactly once per oracle by [`PriceOracle::new`] and bound to that
/// instance by its embedded identifier. Deliberately neither `Clone` nor
/// `Copy`.
#[derive(Debug)]
pub struct AdminCap {
    oracle_id: Uuid,
}

impl AdminCap {
    /// The oracle this capability is bound to.
    #[must_use]
    pub fn oracle_id(&self) -> Uuid {
        self.oracle_id
    }
}

/// The price oracle: expected measurements plus an append-only
/// timestamp→price ledger with a latest pointer.
pub struct PriceOracle {
    id: Uuid,
    expected_pcrs: PcrSet,
    pcrs_initialized: bool,
    prices: BTreeMap<u64, u64>,
    latest_price: u64,
    latest_timestamp: u64,
    config: OracleConfig,
    sink: Arc<dyn EventSink>,
}

impl PriceOracle {
    /// Creates an oracle (reporting events through `tracing`) and mints its
    /// admin capability.
    #[must_use]
    pub fn new(config: OracleConfig) -> (Self, AdminCap) {
        Self::with_sink(config, Arc::new(TracingEventSink))
    }

    /// Creates an oracle with an explicit event sink.
    #[must_use]
    pub fn with_sink(config: OracleConfig, sink: Arc<dyn EventSink>) -> (Self, AdminCap) {
        let id = Uuid::new_v4();
        let oracle = Self {
            id,
            expected_pcrs: PcrSet::default(),
            pcrs_initialized: false,
            prices: BTreeMap::new(),
            latest_price: 0,
            latest_timestamp: 0,
            config,
            sink,
        };
        oracle.sink.emit(OracleEvent::OracleCreated { oracle_id: id });
        (oracle, AdminCap { oracle_id: id })
    }

    /// This oracle's instance identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether expected PCRs have been configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.pcrs_initialized
    }

    /// The currently expected measurements.
    #[must_use]
    pub fn expected_pcrs(&self) -> &PcrSet {
        &self.expected_pcrs
    }

    /// Overwrites the expected PCR quadruple wholesale and marks the oracle
    /// configured. Emits [`OracleEvent::ExpectedPcrsChanged`].
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::InvalidCapability`] if `cap` is bound to a
    /// different oracle.
    pub fn update_expected_pcrs(
        &mut self,
        cap: &AdminCap,
        pcrs: PcrSet,
    ) -> Result<(), OracleError> {
        if cap.oracle_id != self.id {
            warn!(oracle_id = %self.id, presented = %cap.oracle_id, "capability rejected");
            return Err(OracleError::InvalidCapability { oracle_id: self.id });
        }
        self.expected_pcrs = pcrs.clone();
        self.pcrs_initialized = true;
        self.sink.emit(OracleEvent::ExpectedPcrsChanged {
            oracle_id: self.id,
            pcrs,
        });
        Ok(())
    }

    /// Runs the full trust gate and, on success, records the price.
    ///
    /// The gate order is fixed: configured → fresh → trusted PCRs → valid
    /// signature → unseen timestamp. Every check precedes the first
    /// mutation; a failed call leaves the oracle unchanged. The latest
    /// pointer advances only for timestamps newer than the current latest,
    /// so out-of-order submissions are stored without rewinding it.
    ///
    /// `current_time_ms` is the host-supplied clock reading; staleness is a
    /// pure value comparison against it.
    ///
    /// # Errors
    ///
    /// - [`OracleError::PcrsNotInitialized`] before configuration.
    /// - [`OracleError::StalePrice`] for future timestamps or submissions
    ///   older than the configured window (boundary equality accepted).
    /// - [`OracleError::Registry`] if the key is not registered.
    /// - [`OracleError::InvalidPcrs`] on measurement mismatch.
    /// - [`OracleError::InvalidSignature`] on signature mismatch, and
    ///   [`OracleError::Intent`] for malformed signature input.
    /// - [`OracleError::DuplicateTimestamp`] if the timestamp was already
    ///   recorded, by any submitter.
    pub fn update_price(
        &mut self,
        registry: &AttestationRegistry,
        current_time_ms: u64,
        enclave_public_key: &PublicKey,
        price: u64,
        timestamp_ms: u64,
        signature: &[u8],
    ) -> Result<(), OracleError> {
        if !self.pcrs_initialized {
            return Err(OracleError::PcrsNotInitialized);
        }
        if timestamp_ms > current_time_ms
            || current_time_ms - timestamp_ms > self.config.max_price_age_ms
        {
            return Err(OracleError::StalePrice {
                timestamp_ms,
                current_time_ms,
            });
        }

        let registered = registry.get_pcrs(enclave_public_key)?;
        if !registered.ct_matches(&self.expected_pcrs) {
            warn!(oracle_id = %self.id, public_key = %enclave_public_key, "PCR mismatch");
            return Err(OracleError::InvalidPcrs);
        }

        let valid = verify_price_signature(enclave_public_key, signature, timestamp_ms, price)?;
        if !valid {
            warn!(oracle_id = %self.id, public_key = %enclave_public_key, "bad signature");
            return Err(OracleError::InvalidSignature);
        }

        if self.prices.contains_key(&timestamp_ms) {
            return Err(OracleError::DuplicateTimestamp { timestamp_ms });
        }

        self.prices.insert(timestamp_ms, price);
        if timestamp_ms > self.latest_timestamp {
            self.latest_price = price;
            self.latest_timestamp = timestamp_ms;
        }
        self.sink.emit(OracleEvent::PriceUpdated {
            oracle_id: self.id,
            price,
            timestamp_ms,
        });
        Ok(())
    }

    /// The most recent accepted price as `(price, timestamp_ms)`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::NoPriceAvailable`] until a first update
    /// succeeds (`latest_timestamp == 0` is the empty sentinel; a real
    /// timestamp-zero submission cannot pass the freshness gate against
    /// any live clock).
    pub fn latest_price(&self) -> Result<(u64, u64), OracleError> {
        if self.latest_timestamp == 0 {
            return Err(OracleError::NoPriceAvailable);
        }
        Ok((self.latest_price, self.latest_timestamp))
    }

    /// The latest accepted timestamp, zero before any update.
    #[must_use]
    pub fn latest_timestamp(&self) -> u64 {
        self.latest_timestamp
    }

    /// The price recorded at an exact timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::NoPriceAtTimestamp`] if nothing was recorded
    /// at `timestamp_ms`.
    pub fn price_at(&self, timestamp_ms: u64) -> Result<u64, OracleError> {
        debug!(oracle_id = %self.id, timestamp_ms, "ledger lookup");
        self.prices
            .get(&timestamp_ms)
            .copied()
            .ok_or(OracleError::NoPriceAtTimestamp { timestamp_ms })
    }

    /// Whether a price is recorded at an exact timestamp.
    #[must_use]
    pub fn has_price_at(&self, timestamp_ms: u64) -> bool {
        self.prices.contains_key(&timestamp_ms)
    }

    /// Number of ledger entries.
    #[must_use]
    pub fn price_count(&self) -> usize {
        self.prices.len()
    }
}
