//! Code measurements and the attestation-document seam.
//!
//! The hardware chain of trust is verified by the hosting runtime before a
//! document reaches this crate; what arrives here is a
//! [`VerifiedAttestation`]: a public key plus a PCR-indexed measurement
//! list. The registry condenses that list into a [`PcrSet`], the quadruple
//! of measurements at indices 0, 1, 2, and 16 that identifies exactly which
//! code holds the key.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// The PCR indices a registry entry records. Missing indices default to
/// empty measurements.
pub const PCR_INDICES: [u16; 4] = [0, 1, 2, 16];

/// The four-measurement quadruple stored per registered key.
///
/// Named fields rather than positional access: a silent field-order swap
/// here would let the wrong code pass the trust gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcrSet {
    /// PCR0: the enclave image measurement.
    pub pcr0: Vec<u8>,
    /// PCR1: the kernel and boot ramdisk measurement.
    pub pcr1: Vec<u8>,
    /// PCR2: the application measurement.
    pub pcr2: Vec<u8>,
    /// PCR16: the custom/user-extended measurement.
    pub pcr16: Vec<u8>,
}

impl PcrSet {
    /// Builds a quadruple from explicit measurements.
    #[must_use]
    pub fn new(pcr0: Vec<u8>, pcr1: Vec<u8>, pcr2: Vec<u8>, pcr16: Vec<u8>) -> Self {
        Self {
            pcr0,
            pcr1,
            pcr2,
            pcr16,
        }
    }

    /// Selects the quadruple out of a PCR-indexed list.
    ///
    /// Entries at indices other than [`PCR_INDICES`] are ignored; missing
    /// indices yield empty measurements.
    #[must_use]
    pub fn from_indexed(entries: &[(u16, Vec<u8>)]) -> Self {
        let pick = |index: u16| {
            entries
                .iter()
                .find(|(i, _)| *i == index)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        };
        Self {
            pcr0: pick(0),
            pcr1: pick(1),
            pcr2: pick(2),
            pcr16: pick(16),
        }
    }

    /// Constant-time structural equality over all four measurements.
    ///
    /// Used by the trust gate so a rejected submission leaks nothing about
    /// which field diverged. Length mismatches compare unequal.
    #[must_use]
    pub fn ct_matches(&self, other: &PcrSet) -> bool {
        let matched = self.pcr0.as_slice().ct_eq(other.pcr0.as_slice())
            & self.pcr1.as_slice().ct_eq(other.pcr1.as_slice())
            & self.pcr2.as_slice().ct_eq(other.pcr2.as_slice())
            & self.pcr16.as_slice().ct_eq(other.pcr16.as_slice());
        bool::from(matched)
    }
}

/// An attestation document whose cryptographic validity was established by
/// an external collaborator before it reached this core.
pub trait VerifiedAttestation {
    /// The attested public key, if the document carries one.
    fn public_key(&self) -> Option<&[u8]>;

    /// The PCR-indexed measurement list.
    fn pcrs(&self) -> &[(u16, Vec<u8>)];
}

/// A plain carrier for hosts that hand over pre-verified document fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttestationDocument {
    /// The attested public key bytes, in any encoding the normalizer
    /// accepts.
    pub public_key: Option<Vec<u8>>,
    /// The PCR-indexed measurement list.
    pub pcrs: Vec<(u16, Vec<u8>)>,
}

impl VerifiedAttestation for AttestationDocument {
    fn public_key(&self) -> Option<&[u8]> {
        self.public_key.as_deref()
    }

    fn pcrs(&self) -> &[(u16, Vec<u8>)] {
        &self.pcrs
    }
}
