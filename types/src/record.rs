//! The provenance record and access-grant relation.

use serde::{Deserialize, Serialize};

use crate::{
    ContentRef, Fingerprint, LocationConstraint, Signature, SubmitterAddress, Timestamp,
};

/// Durable, append-only binding of one fingerprint to its submitter.
///
/// For a given fingerprint the first accepted record is authoritative. Records
/// are never updated or deleted once the ledger has accepted them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub fingerprint: Fingerprint,
    /// Name of the fingerprint algorithm that produced `fingerprint`.
    pub algorithm: String,
    pub submitter: SubmitterAddress,
    /// Signature by `submitter` over `fingerprint.signing_message()`.
    pub signature: Signature,
    pub timestamp: Timestamp,
    pub content_ref: ContentRef,
    /// Optional geofence; `None` means verification is not location gated.
    #[serde(default)]
    pub location: Option<LocationConstraint>,
    /// Insertion ordinal assigned by the ledger (0 until stored).
    #[serde(default)]
    pub sequence: u64,
}

impl ProvenanceRecord {
    pub fn is_location_gated(&self) -> bool {
        self.location.is_some()
    }

    /// Whether the ledger returned the null sentinel instead of a real record.
    pub fn is_null(&self) -> bool {
        self.submitter.is_null()
    }
}

/// "`grantee` may read/verify the record for `fingerprint`."
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessGrant {
    pub fingerprint: Fingerprint,
    pub grantee: SubmitterAddress,
}
