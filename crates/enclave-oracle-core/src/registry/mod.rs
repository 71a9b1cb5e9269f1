//! Permissionless, append-only attestation registry.
//!
//! Anyone may register a key by presenting a pre-verified attestation
//! document; the binding (canonical key → PCR quadruple) is then permanent.
//! There is no update, no delete, and no second chance: a repeat
//! registration for the same canonical key always fails, even with
//! different measurements, so the first attested binding is the only one
//! observers will ever see.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::attestation::{PcrSet, VerifiedAttestation};
use crate::events::{EventSink, OracleEvent, TracingEventSink};
use crate::key::{normalize_public_key, KeyError, PublicKey};


/// Errors raised by registry operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The attestation document carries no public key.
    #[error("attestation document carries no public key")]
    NoPublicKey,

    /// The document's key failed canonicalization.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The canonical key already has an entry.
    #[error("public key already registered: {public_key}")]
    AlreadyRegistered {
        /// The canonical key, hex-encoded.
        public_key: String,
    },

    /// The canonical key has no entry.
    #[error("public key not registered: {public_key}")]
    NotRegistered {
        /// The canonical key, hex-encoded.
        public_key: String,
    },
}

/// Long-lived shared store of attested key bindings.
///
/// Key uniqueness holds at all times and the map only grows. Mutation goes
/// through `&mut self`; a multi-writer host serializes access per instance.
pub struct AttestationRegistry {
    entries: BTreeMap<PublicKey, PcrSet>,
    sink: Arc<dyn EventSink>,
}

impl AttestationRegistry {
    /// Creates a registry that reports events through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingEventSink))
    }

    /// Creates a registry with an explicit event sink.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn EventSink>) -> Self {
        Self {
            entries: BTreeMap::new(),
            sink,
        }
    }

    /// Registers the key attested by `doc`, recording its PCR quadruple.
    ///
    /// The insert is atomic: every check precedes the write, so a failed
    /// call leaves the registry untouched. Returns the canonical key on
    /// success and emits [`OracleEvent::EnclaveRegistered`].
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NoPublicKey`] if the document has no key.
    /// - [`RegistryError::Key`] if the key bytes fail canonicalization.
    /// - [`RegistryError::AlreadyRegistered`] if the canonical key already
    ///   has an entry (the stored entry is unchanged).
    pub fn register(&mut self, doc: &dyn VerifiedAttestation) -> Result<PublicKey, RegistryError> {
        let raw = doc.public_key().ok_or(RegistryError::NoPublicKey)?;
        let public_key = normalize_public_key(raw)?;
        if self.entries.contains_key(&public_key) {
            return Err(RegistryError::AlreadyRegistered {
                public_key: public_key.to_string(),
            });
        }

        let pcrs = PcrSet::from_indexed(doc.pcrs());
        self.entries.insert(public_key.clone(), pcrs.clone());
        self.sink.emit(OracleEvent::EnclaveRegistered {
            public_key: public_key.to_string(),
            pcrs,
        });
        Ok(public_key)
    }

    /// Whether the canonical key has an entry.
    #[must_use]
    pub fn is_registered(&self, public_key: &PublicKey) -> bool {
        self.entries.contains_key(public_key)
    }

    /// Looks up the measurements recorded for a key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotRegistered`] if the key has no entry.
    pub fn get_pcrs(&self, public_key: &PublicKey) -> Result<&PcrSet, RegistryError> {
        debug!(public_key = %public_key, "registry lookup");
        self.entries
            .get(public_key)
            .ok_or_else(|| RegistryError::NotRegistered {
                public_key: public_key.to_string(),
            })
    }

    /// Number of registered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AttestationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
