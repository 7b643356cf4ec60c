//! The verdict model.
//!
//! A verdict is ephemeral: built fresh for every request and never persisted.

use docguard_types::{Fingerprint, ProvenanceRecord};
use serde::{Deserialize, Serialize};

/// Terminal outcome of one verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationOutcome {
    /// No record for these bytes. Either they were altered after submission or
    /// they were never submitted; the two cannot be told apart.
    NotFound,
    /// The ledger answered with a record for a different fingerprint.
    Tampered,
    /// Record found and the requester is inside the location constraint.
    Verified,
    /// Record found but the requester is outside the location constraint.
    VerifiedLocationFailed,
    /// Record found and it carries no location constraint.
    VerifiedNoLocationRequired,
    /// Record found but the requester's position could not be established.
    VerifiedLocationIndeterminate,
}

impl VerificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationOutcome::NotFound => "NotFound",
            VerificationOutcome::Tampered => "Tampered",
            VerificationOutcome::Verified => "Verified",
            VerificationOutcome::VerifiedLocationFailed => "VerifiedLocationFailed",
            VerificationOutcome::VerifiedNoLocationRequired => "VerifiedNoLocationRequired",
            VerificationOutcome::VerifiedLocationIndeterminate => {
                "VerifiedLocationIndeterminate"
            }
        }
    }

    /// Whether a matching record was found.
    pub fn record_matched(&self) -> bool {
        !matches!(
            self,
            VerificationOutcome::NotFound | VerificationOutcome::Tampered
        )
    }
}

/// Why a gated record's location check could not be carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminateReason {
    Denied,
    Unavailable,
    TimedOut,
    /// The caller supplied no position at all.
    NotProvided,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationStatus {
    NotRequired,
    Passed,
    Failed,
    Indeterminate(IndeterminateReason),
}

impl LocationStatus {
    /// `Some(true|false)` once a geofence check ran, `None` otherwise.
    pub fn verified(&self) -> Option<bool> {
        match self {
            LocationStatus::Passed => Some(true),
            LocationStatus::Failed => Some(false),
            LocationStatus::NotRequired | LocationStatus::Indeterminate(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerificationVerdict {
    pub outcome: VerificationOutcome,
    /// Fingerprint of the candidate bytes.
    pub fingerprint: Fingerprint,
    pub record: Option<ProvenanceRecord>,
    /// Great-circle distance to the record's reference point, when measured.
    pub distance_meters: Option<f64>,
    pub location: LocationStatus,
}

impl VerificationVerdict {
    pub(crate) fn not_found(fingerprint: Fingerprint) -> Self {
        Self {
            outcome: VerificationOutcome::NotFound,
            fingerprint,
            record: None,
            distance_meters: None,
            location: LocationStatus::NotRequired,
        }
    }

    pub(crate) fn tampered(fingerprint: Fingerprint) -> Self {
        Self {
            outcome: VerificationOutcome::Tampered,
            ..Self::not_found(fingerprint)
        }
    }

    pub(crate) fn no_location_required(record: ProvenanceRecord) -> Self {
        Self {
            outcome: VerificationOutcome::VerifiedNoLocationRequired,
            fingerprint: record.fingerprint,
            record: Some(record),
            distance_meters: None,
            location: LocationStatus::NotRequired,
        }
    }

    pub(crate) fn indeterminate(record: ProvenanceRecord, reason: IndeterminateReason) -> Self {
        Self {
            outcome: VerificationOutcome::VerifiedLocationIndeterminate,
            fingerprint: record.fingerprint,
            record: Some(record),
            distance_meters: None,
            location: LocationStatus::Indeterminate(reason),
        }
    }

    pub(crate) fn measured(record: ProvenanceRecord, distance_meters: f64, within: bool) -> Self {
        let (outcome, location) = if within {
            (VerificationOutcome::Verified, LocationStatus::Passed)
        } else {
            (
                VerificationOutcome::VerifiedLocationFailed,
                LocationStatus::Failed,
            )
        };
        Self {
            outcome,
            fingerprint: record.fingerprint,
            record: Some(record),
            distance_meters: Some(distance_meters),
            location,
        }
    }

    pub fn location_verified(&self) -> Option<bool> {
        self.location.verified()
    }

    /// Wire shape: `{ outcome, fingerprint, record?, distanceMeters?, locationVerified, indeterminateReason? }`.
    pub fn to_envelope(&self) -> VerdictEnvelope {
        VerdictEnvelope {
            outcome: self.outcome,
            fingerprint: self.fingerprint,
            record: self.record.clone(),
            distance_meters: self.distance_meters,
            location_verified: self.location_verified(),
            indeterminate_reason: match self.location {
                LocationStatus::Indeterminate(reason) => Some(reason),
                _ => None,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictEnvelope {
    pub outcome: VerificationOutcome,
    pub fingerprint: Fingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ProvenanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    /// `null` when no geofence check ran.
    pub location_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indeterminate_reason: Option<IndeterminateReason>,
}
