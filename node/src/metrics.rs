//! Prometheus metrics for the DocGuard node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`] that the HTTP `/metrics`
//! endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

use crate::NodeError;

pub struct NodeMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Submissions that reached the binder.
    pub submissions: IntCounter,
    /// Submissions that produced a new record.
    pub records_bound: IntCounter,
    /// Submissions for an already bound fingerprint.
    pub conflicts: IntCounter,
    /// Submissions refused because the signature did not verify.
    pub authenticity_rejections: IntCounter,
    /// Verdicts produced, labelled by outcome.
    pub verdicts: IntCounterVec,
    /// Verifications refused by the access policy.
    pub verify_refusals: IntCounter,
    /// Applied access changes, labelled by action.
    pub access_changes: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Records in the ledger.
    pub record_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall-clock time of a verification, location wait included.
    pub verify_latency_ms: Histogram,
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        let submissions = register_int_counter_with_registry!(
            Opts::new("docguard_submissions_total", "Submissions received"),
            registry
        )?;
        let records_bound = register_int_counter_with_registry!(
            Opts::new("docguard_records_bound_total", "New provenance records"),
            registry
        )?;
        let conflicts = register_int_counter_with_registry!(
            Opts::new(
                "docguard_conflicts_total",
                "Submissions for an already bound fingerprint"
            ),
            registry
        )?;
        let authenticity_rejections = register_int_counter_with_registry!(
            Opts::new(
                "docguard_authenticity_rejections_total",
                "Submissions whose signature failed to verify"
            ),
            registry
        )?;
        let verdicts = register_int_counter_vec_with_registry!(
            Opts::new("docguard_verdicts_total", "Verification verdicts by outcome"),
            &["outcome"],
            registry
        )?;
        let verify_refusals = register_int_counter_with_registry!(
            Opts::new(
                "docguard_verify_refusals_total",
                "Verifications refused by the access policy"
            ),
            registry
        )?;
        let access_changes = register_int_counter_vec_with_registry!(
            Opts::new("docguard_access_changes_total", "Applied access changes"),
            &["action"],
            registry
        )?;
        let record_count = register_int_gauge_with_registry!(
            Opts::new("docguard_record_count", "Records in the ledger"),
            registry
        )?;
        // 1 ms up to ~16 s, enough to cover a full location timeout.
        let verify_latency_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "docguard_verify_latency_ms",
                "Verification latency in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(1.0, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            submissions,
            records_bound,
            conflicts,
            authenticity_rejections,
            verdicts,
            verify_refusals,
            access_changes,
            record_count,
            verify_latency_ms,
        })
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, NodeError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| NodeError::Config(e.to_string()))
    }
}
