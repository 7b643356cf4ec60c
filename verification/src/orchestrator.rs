//! End-to-end verification flow.

use std::time::Duration;

use docguard_access::{AccessConfig, AccessGate, AccessPolicy};
use docguard_crypto::fingerprint;
use docguard_geofence::{evaluate, LocationFix, LocationSource};
use docguard_store::{AccessStore, RecordStore};
use docguard_types::{Fingerprint, LocationConstraint, ProvenanceRecord, SubmitterAddress};

use crate::outcomes::{IndeterminateReason, VerificationVerdict};
use crate::VerifyError;

/// Bound on waiting for the requester's position.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// What the ledger and gate decided before any location is involved.
enum Resolution {
    Done(VerificationVerdict),
    NeedsLocation(ProvenanceRecord, LocationConstraint),
}

/// Drives verification against a record ledger and an access store.
///
/// Read-only with respect to both: no path through the orchestrator writes.
/// A `requester` passed in is trusted as-is; proving it is the caller's job.
pub struct VerificationOrchestrator<'a, R: ?Sized, A: ?Sized> {
    records: &'a R,
    grants: &'a A,
    access: &'a AccessConfig,
    location_timeout: Duration,
}

impl<'a, R, A> VerificationOrchestrator<'a, R, A>
where
    R: RecordStore + Sync + ?Sized,
    A: AccessStore + Sync + ?Sized,
{
    pub fn new(records: &'a R, grants: &'a A, access: &'a AccessConfig) -> Self {
        Self {
            records,
            grants,
            access,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Verify candidate bytes, asking `location` for a position only if the
    /// matched record is location gated.
    ///
    /// Dropping the returned future cancels any in-flight location request;
    /// no verdict is produced for an abandoned verification.
    pub async fn verify<S>(
        &self,
        candidate: &[u8],
        requester: Option<&SubmitterAddress>,
        location: &S,
    ) -> Result<VerificationVerdict, VerifyError>
    where
        S: LocationSource + ?Sized,
    {
        self.verify_fingerprint_with(fingerprint(candidate), requester, location)
            .await
    }

    /// [`Self::verify`] for a fingerprint computed elsewhere (streamed files).
    pub async fn verify_fingerprint_with<S>(
        &self,
        fp: Fingerprint,
        requester: Option<&SubmitterAddress>,
        location: &S,
    ) -> Result<VerificationVerdict, VerifyError>
    where
        S: LocationSource + ?Sized,
    {
        let verdict = match self.resolve(fp, requester)? {
            Resolution::Done(verdict) => verdict,
            Resolution::NeedsLocation(record, constraint) => {
                let fix = match tokio::time::timeout(
                    self.location_timeout,
                    location.current_location(self.location_timeout),
                )
                .await
                {
                    Ok(fix) => fix,
                    Err(_) => {
                        tracing::debug!(fingerprint = %fp, "location request timed out");
                        LocationFix::TimedOut
                    }
                };
                judge(record, constraint, Some(fix))
            }
        };
        log_verdict(&verdict);
        Ok(verdict)
    }

    /// Synchronous verification for callers that already hold the
    /// requester's position (or know they have none).
    pub fn verify_fingerprint(
        &self,
        fp: Fingerprint,
        requester: Option<&SubmitterAddress>,
        requester_location: Option<LocationFix>,
    ) -> Result<VerificationVerdict, VerifyError> {
        let verdict = match self.resolve(fp, requester)? {
            Resolution::Done(verdict) => verdict,
            Resolution::NeedsLocation(record, constraint) => {
                judge(record, constraint, requester_location)
            }
        };
        log_verdict(&verdict);
        Ok(verdict)
    }

    fn resolve(
        &self,
        fp: Fingerprint,
        requester: Option<&SubmitterAddress>,
    ) -> Result<Resolution, VerifyError> {
        let record = match self.records.get(&fp)? {
            Some(record) if !record.is_null() => record,
            _ => return Ok(Resolution::Done(VerificationVerdict::not_found(fp))),
        };

        if record.fingerprint != fp {
            tracing::warn!(
                requested = %fp,
                returned = %record.fingerprint,
                "ledger returned a record for a different fingerprint"
            );
            return Ok(Resolution::Done(VerificationVerdict::tampered(fp)));
        }

        if self.access.policy == AccessPolicy::SubmitterOnly {
            let gate = AccessGate::new(self.records, self.grants, self.access);
            let allowed = match requester {
                Some(who) => gate.allows(&record, who)?,
                None => false,
            };
            if !allowed {
                tracing::info!(
                    fingerprint = %fp,
                    requester = %requester.map(|r| r.short()).unwrap_or_default(),
                    "verification refused by access policy"
                );
                return Err(VerifyError::Unauthorized {
                    fingerprint: fp,
                    requester: requester.cloned(),
                });
            }
        }

        match record.location {
            None => Ok(Resolution::Done(VerificationVerdict::no_location_required(
                record,
            ))),
            Some(constraint) => Ok(Resolution::NeedsLocation(record, constraint)),
        }
    }
}

/// Fold a location answer into the verdict for a gated record.
fn judge(
    record: ProvenanceRecord,
    constraint: LocationConstraint,
    fix: Option<LocationFix>,
) -> VerificationVerdict {
    match fix {
        Some(LocationFix::Position { point, .. }) => {
            let report = evaluate(&constraint, point);
            VerificationVerdict::measured(record, report.distance_meters, report.within)
        }
        Some(LocationFix::Denied) => {
            VerificationVerdict::indeterminate(record, IndeterminateReason::Denied)
        }
        Some(LocationFix::Unavailable) => {
            VerificationVerdict::indeterminate(record, IndeterminateReason::Unavailable)
        }
        Some(LocationFix::TimedOut) => {
            VerificationVerdict::indeterminate(record, IndeterminateReason::TimedOut)
        }
        None => VerificationVerdict::indeterminate(record, IndeterminateReason::NotProvided),
    }
}

fn log_verdict(verdict: &VerificationVerdict) {
    tracing::info!(
        fingerprint = %verdict.fingerprint,
        outcome = verdict.outcome.as_str(),
        distance_m = verdict.distance_meters,
        "verification complete"
    );
}
