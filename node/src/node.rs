//! The DocGuard node: one LMDB environment behind every core operation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::Instrument;

use docguard_access::{
    verify_authorization, AccessAction, AccessError, AccessGate, AccessPolicy, Ack,
    ReadAuthorization, LISTING_SCOPE,
};
use docguard_crypto::{fingerprint, Ed25519Verifier};
use docguard_geofence::{LocationFix, LocationSource};
use docguard_provenance::{BindError, BindOutcome, BindRequest, ProvenanceBinder};
use docguard_store::{ContentStore, RecordStore, SuppressionStore};
use docguard_store_lmdb::environment::DEFAULT_MAX_DBS;
use docguard_store_lmdb::integrity::{check_data_dir, check_integrity};
use docguard_store_lmdb::{
    LmdbAccessStore, LmdbContentStore, LmdbEnvironment, LmdbRecordStore, LmdbSuppressionStore,
};
use docguard_types::{
    Clock, ContentRef, Fingerprint, LocationConstraint, ProvenanceRecord, Signature,
    SubmitterAddress, SystemClock, Timestamp,
};
use docguard_verification::{VerificationOrchestrator, VerificationVerdict, VerifyError};

use crate::audit::{AuditPage, AuditTrail};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::requests::{SignedAccessChange, SignedSuppression};
use crate::tracing_spans;

/// Point-in-time summary for health endpoints.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeStatus {
    pub records: u64,
    pub suppressed: u64,
    pub uptime_secs: u64,
    pub access_policy: AccessPolicy,
}

/// Owns the ledger and exposes every operation transports need.
///
/// All methods take `&self`; the node is shared across tasks behind an `Arc`.
/// Duplicate submissions are arbitrated by LMDB's single write transaction,
/// so no lock is held here.
pub struct DocGuardNode {
    config: NodeConfig,
    // Keeps the environment alive for the store handles below.
    _environment: LmdbEnvironment,
    records: LmdbRecordStore,
    grants: LmdbAccessStore,
    content: LmdbContentStore,
    suppression: LmdbSuppressionStore,
    verifier: Ed25519Verifier,
    clock: SystemClock,
    metrics: Arc<NodeMetrics>,
    started_at: Timestamp,
}

impl DocGuardNode {
    /// Open (or create) the ledger under `config.data_dir` and check it.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        check_data_dir(&config.data_dir).map_err(NodeError::Integrity)?;

        let environment =
            LmdbEnvironment::open(&config.data_dir, DEFAULT_MAX_DBS, config.map_size_bytes())?;
        let report = check_integrity(&environment)?;
        if !report.is_healthy() {
            return Err(NodeError::Integrity(report.errors.join("; ")));
        }

        let metrics = Arc::new(NodeMetrics::new()?);
        let records = environment.record_store();
        metrics.record_count.set(records.record_count()? as i64);

        tracing::info!(
            data_dir = %config.data_dir.display(),
            records = metrics.record_count.get(),
            policy = ?config.access.policy,
            "node ready"
        );

        Ok(Self {
            records,
            grants: environment.access_store(),
            content: environment.content_store(),
            suppression: environment.suppression_store(),
            _environment: environment,
            config,
            verifier: Ed25519Verifier,
            clock: SystemClock,
            metrics,
            started_at: Timestamp::now(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<NodeMetrics> {
        &self.metrics
    }

    // ── Provenance ─────────────────────────────────────────────────────

    /// Store `bytes` and bind their fingerprint to `submitter`.
    pub fn submit(
        &self,
        bytes: &[u8],
        submitter: SubmitterAddress,
        signature: Signature,
        location: Option<LocationConstraint>,
    ) -> Result<BindOutcome, NodeError> {
        let span = tracing_spans::submit_span(&submitter.short());
        let _guard = span.enter();
        self.metrics.submissions.inc();
        let result = self.binder().submit(bytes, &self.content, submitter, signature, location);
        self.observe_bind(result)
    }

    /// Bind a fingerprint computed elsewhere, with content already stored.
    pub fn bind(&self, request: BindRequest) -> Result<BindOutcome, NodeError> {
        let span = tracing_spans::submit_span(&request.submitter.short());
        let _guard = span.enter();
        self.metrics.submissions.inc();
        let result = self.binder().bind(request);
        self.observe_bind(result)
    }

    fn binder(&self) -> ProvenanceBinder<'_, LmdbRecordStore, Ed25519Verifier, SystemClock> {
        ProvenanceBinder::new(&self.records, &self.verifier, &self.clock)
    }

    fn observe_bind(
        &self,
        result: Result<BindOutcome, BindError>,
    ) -> Result<BindOutcome, NodeError> {
        match &result {
            Ok(BindOutcome::Bound(_)) => {
                self.metrics.records_bound.inc();
                self.metrics.record_count.inc();
            }
            Ok(BindOutcome::Conflict { .. }) => self.metrics.conflicts.inc(),
            Err(BindError::Authenticity { .. }) => self.metrics.authenticity_rejections.inc(),
            Err(_) => {}
        }
        Ok(result?)
    }

    // ── Verification ───────────────────────────────────────────────────

    fn orchestrator(&self) -> VerificationOrchestrator<'_, LmdbRecordStore, LmdbAccessStore> {
        VerificationOrchestrator::new(&self.records, &self.grants, &self.config.access)
            .with_location_timeout(self.config.location_timeout())
    }

    /// Verify candidate bytes, asking `location` for a position only when the
    /// matched record is location gated.
    ///
    /// `reader` must be signed for the candidate's fingerprint.
    pub async fn verify<S>(
        &self,
        candidate: &[u8],
        reader: Option<&ReadAuthorization>,
        location: &S,
    ) -> Result<VerificationVerdict, NodeError>
    where
        S: LocationSource + ?Sized,
    {
        let fp = fingerprint(candidate);
        let requester = self.authenticate(reader, &fp)?;
        let requester_short = requester.map(|r| r.short());
        let span = tracing_spans::verify_span(requester_short.as_deref());
        let started = Instant::now();
        let result = self
            .orchestrator()
            .verify_fingerprint_with(fp, requester, location)
            .instrument(span)
            .await;
        self.observe_verdict(result, started)
    }

    /// Verify a fingerprint against a position the caller already holds.
    /// `None` means the requester sent no position at all.
    pub fn verify_fingerprint(
        &self,
        fingerprint: Fingerprint,
        reader: Option<&ReadAuthorization>,
        requester_location: Option<LocationFix>,
    ) -> Result<VerificationVerdict, NodeError> {
        let requester = self.authenticate(reader, &fingerprint)?;
        let requester_short = requester.map(|r| r.short());
        let span = tracing_spans::verify_span(requester_short.as_deref());
        let _guard = span.enter();
        let started = Instant::now();
        let result =
            self.orchestrator()
                .verify_fingerprint(fingerprint, requester, requester_location);
        self.observe_verdict(result, started)
    }

    fn observe_verdict(
        &self,
        result: Result<VerificationVerdict, VerifyError>,
        started: Instant,
    ) -> Result<VerificationVerdict, NodeError> {
        self.metrics
            .verify_latency_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        match &result {
            Ok(verdict) => self
                .metrics
                .verdicts
                .with_label_values(&[verdict.outcome.as_str()])
                .inc(),
            Err(VerifyError::Unauthorized { .. }) => self.metrics.verify_refusals.inc(),
            Err(_) => {}
        }
        Ok(result?)
    }

    // ── Reads ──────────────────────────────────────────────────────────

    /// The address a signed read proves, checked against `scope` and the
    /// node clock. An unsigned caller is anonymous.
    fn authenticate<'r>(
        &self,
        reader: Option<&'r ReadAuthorization>,
        scope: &Fingerprint,
    ) -> Result<Option<&'r SubmitterAddress>, NodeError> {
        let now = self.clock.now();
        match reader {
            Some(auth) => Ok(Some(auth.authenticate(&self.verifier, scope, now)?)),
            None => Ok(None),
        }
    }

    fn existing_record(&self, fingerprint: &Fingerprint) -> Result<ProvenanceRecord, NodeError> {
        match self.records.get(fingerprint)? {
            Some(record) if !record.is_null() => Ok(record),
            _ => Err(AccessError::RecordNotFound(*fingerprint).into()),
        }
    }

    /// Refuse unless the read policy lets `requester` see `record`.
    fn require_read(
        &self,
        record: &ProvenanceRecord,
        requester: Option<&SubmitterAddress>,
    ) -> Result<(), NodeError> {
        let gate = self.gate();
        let allowed = match requester {
            Some(who) => gate.allows(record, who)?,
            None => gate.policy() == AccessPolicy::PublicRead,
        };
        if allowed {
            return Ok(());
        }
        Err(VerifyError::Unauthorized {
            fingerprint: record.fingerprint,
            requester: requester.cloned(),
        }
        .into())
    }

    /// Look up the record for a fingerprint, subject to the read policy.
    ///
    /// Absent records and the null sentinel both come back as `None`.
    pub fn record(
        &self,
        fingerprint: &Fingerprint,
        reader: Option<&ReadAuthorization>,
    ) -> Result<Option<ProvenanceRecord>, NodeError> {
        let requester = self.authenticate(reader, fingerprint)?;
        let record = match self.records.get(fingerprint)? {
            Some(record) if !record.is_null() => record,
            _ => return Ok(None),
        };
        self.require_read(&record, requester)?;
        Ok(Some(record))
    }

    /// Stored document bytes. Never used to decide a verdict.
    pub fn content(&self, content_ref: &ContentRef) -> Result<Option<Vec<u8>>, NodeError> {
        Ok(self.content.get(content_ref)?)
    }

    /// One page of the audit trail as `reader` may see it.
    ///
    /// Under `SubmitterOnly` only records the authenticated reader is allowed
    /// on are listed, and an anonymous caller sees none. `reader` is signed
    /// for [`LISTING_SCOPE`].
    pub fn audit_page(
        &self,
        offset: u64,
        count: usize,
        reader: Option<&ReadAuthorization>,
    ) -> Result<AuditPage, NodeError> {
        let requester = self.authenticate(reader, &LISTING_SCOPE)?;
        let trail = AuditTrail::new(&self.records, &self.suppression);
        let gate = self.gate();
        match (gate.policy(), requester) {
            (AccessPolicy::PublicRead, _) => Ok(trail.page(offset, count)?),
            (AccessPolicy::SubmitterOnly, Some(who)) => {
                Ok(trail.page_filtered(offset, count, |r| gate.allows(r, who))?)
            }
            (AccessPolicy::SubmitterOnly, None) => Ok(AuditPage {
                records: Vec::new(),
                next_offset: None,
            }),
        }
    }

    /// The whole visible audit trail, filtered as [`Self::audit_page`].
    pub fn audit_all(
        &self,
        reader: Option<&ReadAuthorization>,
    ) -> Result<Vec<ProvenanceRecord>, NodeError> {
        let requester = self.authenticate(reader, &LISTING_SCOPE)?;
        let trail = AuditTrail::new(&self.records, &self.suppression);
        let gate = self.gate();
        match (gate.policy(), requester) {
            (AccessPolicy::PublicRead, _) => Ok(trail.all()?),
            (AccessPolicy::SubmitterOnly, Some(who)) => {
                Ok(trail.all_filtered(|r| gate.allows(r, who))?)
            }
            (AccessPolicy::SubmitterOnly, None) => Ok(Vec::new()),
        }
    }

    pub fn status(&self) -> Result<NodeStatus, NodeError> {
        Ok(NodeStatus {
            records: self.records.record_count()?,
            suppressed: self.suppression.suppressed()?.len() as u64,
            uptime_secs: self.started_at.elapsed_since(Timestamp::now()),
            access_policy: self.config.access.policy,
        })
    }

    // ── Access control ─────────────────────────────────────────────────

    fn gate(&self) -> AccessGate<'_, LmdbRecordStore, LmdbAccessStore> {
        AccessGate::new(&self.records, &self.grants, &self.config.access)
    }

    pub fn grant(&self, change: &SignedAccessChange) -> Result<Ack, NodeError> {
        self.change_access(AccessAction::Grant, change)
    }

    pub fn revoke(&self, change: &SignedAccessChange) -> Result<Ack, NodeError> {
        self.change_access(AccessAction::Revoke, change)
    }

    fn change_access(
        &self,
        action: AccessAction,
        change: &SignedAccessChange,
    ) -> Result<Ack, NodeError> {
        let span = tracing_spans::access_span(action.as_str(), &change.fingerprint.to_hex());
        let _guard = span.enter();
        verify_authorization(
            &self.verifier,
            action,
            &change.fingerprint,
            &change.grantee,
            change.nonce,
            &change.by,
            &change.signature,
        )?;
        let gate = self.gate();
        gate.redeem(&change.fingerprint, &change.by, change.nonce)?;
        let ack = match action {
            AccessAction::Grant => gate.grant(&change.fingerprint, &change.grantee, &change.by)?,
            _ => gate.revoke(&change.fingerprint, &change.grantee, &change.by)?,
        };
        self.count_access_change(action, ack);
        Ok(ack)
    }

    /// Nonce the next signed grant, revoke, hide or unhide of `fingerprint`
    /// must be signed over.
    pub fn authorization_nonce(&self, fingerprint: &Fingerprint) -> Result<u64, NodeError> {
        Ok(self.gate().authorization_nonce(fingerprint)?)
    }

    /// Whether `who` may read and verify `fingerprint`. The answer is itself
    /// a read of the record, so `reader` must be allowed on it.
    pub fn can_access(
        &self,
        fingerprint: &Fingerprint,
        who: &SubmitterAddress,
        reader: Option<&ReadAuthorization>,
    ) -> Result<bool, NodeError> {
        let requester = self.authenticate(reader, fingerprint)?;
        let record = self.existing_record(fingerprint)?;
        self.require_read(&record, requester)?;
        Ok(self.gate().allows(&record, who)?)
    }

    /// Explicit grantees of `fingerprint`, for a reader allowed on it.
    pub fn grantees(
        &self,
        fingerprint: &Fingerprint,
        reader: Option<&ReadAuthorization>,
    ) -> Result<Vec<SubmitterAddress>, NodeError> {
        let requester = self.authenticate(reader, fingerprint)?;
        let record = self.existing_record(fingerprint)?;
        self.require_read(&record, requester)?;
        Ok(self.gate().grants_for(fingerprint)?)
    }

    /// Hide a record from the audit trail. The record itself is untouched.
    pub fn hide(&self, request: &SignedSuppression) -> Result<Ack, NodeError> {
        self.change_visibility(AccessAction::Hide, request)
    }

    pub fn unhide(&self, request: &SignedSuppression) -> Result<Ack, NodeError> {
        self.change_visibility(AccessAction::Unhide, request)
    }

    fn change_visibility(
        &self,
        action: AccessAction,
        request: &SignedSuppression,
    ) -> Result<Ack, NodeError> {
        let span = tracing_spans::access_span(action.as_str(), &request.fingerprint.to_hex());
        let _guard = span.enter();
        verify_authorization(
            &self.verifier,
            action,
            &request.fingerprint,
            &request.by,
            request.nonce,
            &request.by,
            &request.signature,
        )?;
        self.gate()
            .redeem(&request.fingerprint, &request.by, request.nonce)?;
        let changed = match action {
            AccessAction::Hide => self.suppression.suppress(&request.fingerprint)?,
            _ => self.suppression.unsuppress(&request.fingerprint)?,
        };
        let ack = if changed { Ack::Applied } else { Ack::Unchanged };
        tracing::info!(fingerprint = %request.fingerprint, ?ack, "audit visibility changed");
        self.count_access_change(action, ack);
        Ok(ack)
    }

    fn count_access_change(&self, action: AccessAction, ack: Ack) {
        if ack == Ack::Applied {
            self.metrics
                .access_changes
                .with_label_values(&[action.as_str()])
                .inc();
        }
    }
}
