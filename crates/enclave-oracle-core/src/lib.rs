//! Attestation-backed trust registry and price oracle core.
//!
//! This crate implements a permissionless store of (public key →
//! code-measurement) pairs proven by hardware attestation, and a price
//! oracle that consults that store before accepting any cryptographically
//! signed price update.
//!
//! # Architecture
//!
//! ```text
//! VerifiedAttestation --> AttestationRegistry (key -> PcrSet, append-only)
//!                                |
//!                                v
//! signed submission --> PriceOracle::update_price
//!   1. configured?      (expected PCRs set via AdminCap)
//!   2. fresh?           (timestamp within the staleness window)
//!   3. trusted?         (registry PCRs == expected PCRs)
//!   4. authentic?       (secp256k1 signature over the intent digest)
//!   5. new?             (timestamp never seen before)
//!   --> price ledger + latest pointer + PriceUpdated event
//! ```
//!
//! # Key Concepts
//!
//! - **Canonical key**: heterogeneous key encodings (raw 32-byte,
//!   compressed or uncompressed secp256k1) are normalized to one comparable
//!   form before any lookup or insert ([`normalize_public_key`]).
//! - **PCR quadruple**: the four boot/code measurements (indices 0, 1, 2
//!   and 16) that identify exactly which code holds a key ([`PcrSet`]).
//! - **Trust gate**: a price update is accepted only when the submitting
//!   key's registered measurements equal the oracle's expected ones and the
//!   signature over the canonical intent encoding verifies.
//! - **Capability**: reconfiguring the expected measurements requires the
//!   [`AdminCap`] minted with the oracle instance; authorization is a value
//!   comparison, not ambient permission.
//!
//! # Concurrency
//!
//! Every mutating operation takes `&mut self`; the crate performs no
//! locking of its own. A host embedding these stores in a multi-writer
//! environment must serialize access per instance (one mutex or actor per
//! registry/oracle).
//!
//! # Example
//!
//! ```rust
//! use enclave_oracle_core::{
//!     AttestationDocument, AttestationRegistry, OracleConfig, PriceOracle,
//! };
//!
//! let mut registry = AttestationRegistry::new();
//! let doc = AttestationDocument {
//!     public_key: Some(vec![0x02; 33]),
//!     pcrs: vec![
//!         (0, vec![0xaa; 48]),
//!         (1, vec![0xbb; 48]),
//!         (2, vec![0xcc; 48]),
//!         (16, vec![0xdd; 48]),
//!     ],
//! };
//! let key = registry.register(&doc).unwrap();
//! assert!(registry.is_registered(&key));
//!
//! let (mut oracle, cap) = PriceOracle::new(OracleConfig::default());
//! let pcrs = registry.get_pcrs(&key).unwrap().clone();
//! oracle.update_expected_pcrs(&cap, pcrs).unwrap();
//! assert!(oracle.is_configured());
//! ```

pub mod attestation;
pub mod events;
pub mod intent;
pub mod key;
pub mod oracle;
pub mod registry;

pub use attestation::{AttestationDocument, PcrSet, VerifiedAttestation, PCR_INDICES};
pub use events::{EventSink, MemoryEventSink, OracleEvent, TracingEventSink};
pub use intent::{
    signing_bytes, signing_digest, verify_price_signature, IntentError, IntentMessage,
    PriceUpdatePayload, PRICE_INTENT_SCOPE, PRICE_SCALE, SIGNATURE_LEN,
};
pub use key::{normalize_public_key, KeyError, PublicKey};
pub use oracle::{
    AdminCap, OracleConfig, OracleError, PriceOracle, DEFAULT_MAX_PRICE_AGE_MS,
};
pub use registry::{AttestationRegistry, RegistryError};
