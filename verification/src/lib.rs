//! Verification orchestrator.
//!
//! Re-fingerprints a candidate file, looks up its bound record and folds
//! tamper detection, access control and geofence membership into a single
//! terminal [`VerificationVerdict`]. Precedence is fixed: a record must exist
//! and match before access is checked, and access must be granted before a
//! location is ever requested.

pub mod error;
pub mod orchestrator;
pub mod outcomes;

pub use docguard_geofence::{FixedLocation, LocationFix, LocationSource, NoLocation};
pub use error::VerifyError;
pub use orchestrator::{VerificationOrchestrator, DEFAULT_LOCATION_TIMEOUT};
pub use outcomes::{
    IndeterminateReason, LocationStatus, VerdictEnvelope, VerificationOutcome,
    VerificationVerdict,
};
