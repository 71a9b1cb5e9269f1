//! Emitted notifications and the sink seam.
//!
//! Registry and oracle mutations produce [`OracleEvent`] values for
//! external observers and indexers; nothing in this crate consumes them.
//! Stores hold an `Arc<dyn EventSink>`: [`TracingEventSink`] renders
//! events through `tracing` (the default), [`MemoryEventSink`] buffers
//! them for tests and embedded indexers.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use uuid::Uuid;

use crate::attestation::PcrSet;

/// An observable side effect of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleEvent {
    /// A price oracle instance was created.
    OracleCreated {
        /// The new oracle's identifier.
        oracle_id: Uuid,
    },

    /// A registry entry was created for a newly attested key.
    EnclaveRegistered {
        /// The canonical public key, hex-encoded.
        public_key: String,
        /// The measurements recorded for the key.
        pcrs: PcrSet,
    },

    /// The oracle's expected measurements were (re)configured.
    ExpectedPcrsChanged {
        /// The reconfigured oracle.
        oracle_id: Uuid,
        /// The new expected measurements.
        pcrs: PcrSet,
    },

    /// A price update passed the trust gate and was recorded.
    PriceUpdated {
        /// The updated oracle.
        oracle_id: Uuid,
        /// The accepted price (fixed-point, 10^6 scale).
        price: u64,
        /// The accepted timestamp in Unix milliseconds.
        timestamp_ms: u64,
    },
}

/// Receives emitted events. Sinks are shared across stores, so emission
/// takes `&self`; implementations use interior mutability as needed.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn emit(&self, event: OracleEvent);
}

/// Buffers events in memory; drain them to assert on ordering or to feed
/// an external indexer.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<OracleEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty shared sink handle.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Removes and returns all buffered events in emission order.
    pub fn drain(&self) -> Vec<OracleEvent> {
        let mut guard = self
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *guard)
    }

    /// Returns a snapshot of the buffered events.
    #[must_use]
    pub fn events(&self) -> Vec<OracleEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: OracleEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}

/// Renders events as structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: OracleEvent) {
        match &event {
            OracleEvent::OracleCreated { oracle_id } => {
                tracing::info!(%oracle_id, "oracle created");
            }
            OracleEvent::EnclaveRegistered { public_key, .. } => {
                tracing::info!(%public_key, "enclave registered");
            }
            OracleEvent::ExpectedPcrsChanged { oracle_id, .. } => {
                tracing::info!(%oracle_id, "expected PCRs changed");
            }
            OracleEvent::PriceUpdated {
                oracle_id,
                price,
                timestamp_ms,
            } => {
                tracing::info!(%oracle_id, price, timestamp_ms, "price updated");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_preserves_emission_order() {
        let sink = MemoryEventSink::new();
        let id = Uuid::new_v4();

        sink.emit(OracleEvent::OracleCreated { oracle_id: id });
        sink.emit(OracleEvent::PriceUpdated {
            oracle_id: id,
            price: 42,
            timestamp_ms: 7,
        });

        let events = sink.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], OracleEvent::OracleCreated { oracle_id: id });
        assert!(sink.events().is_empty());
    }

    #[test]
    fn events_serialize_with_a_type_tag() {
        let event = OracleEvent::PriceUpdated {
            oracle_id: Uuid::nil(),
            price: 1_250_000,
            timestamp_ms: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "price_updated");
        assert_eq!(json["price"], 1_250_000);
        assert_eq!(json["timestamp_ms"], 1_700_000_000_000u64);
    }
}
