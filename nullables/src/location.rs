//! Nullable location source: scripted answers with optional latency.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docguard_geofence::{LocationFix, LocationSource};
use docguard_types::GeoPoint;

/// A location source that always answers with the same fix.
///
/// `calls()` lets tests assert that the orchestrator never asked for a
/// position when it should not have.
pub struct NullLocationSource {
    fix: LocationFix,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl NullLocationSource {
    pub fn new(fix: LocationFix) -> Self {
        Self {
            fix,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn at(point: GeoPoint) -> Self {
        Self::new(LocationFix::position(point))
    }

    pub fn denied() -> Self {
        Self::new(LocationFix::Denied)
    }

    pub fn unavailable() -> Self {
        Self::new(LocationFix::Unavailable)
    }

    /// A source that never answers within any reasonable deadline.
    pub fn hanging() -> Self {
        Self::new(LocationFix::Unavailable).with_delay(Duration::from_secs(24 * 60 * 60))
    }

    /// Wait `delay` (on the tokio clock) before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSource for NullLocationSource {
    async fn current_location(&self, _timeout: Duration) -> LocationFix {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.fix
    }
}
