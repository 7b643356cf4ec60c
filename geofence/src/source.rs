//! Where the verifier's position comes from.
//!
//! A location source may be slow, may be refused by the user and may fail
//! outright. Each of those is a distinct [`LocationFix`] rather than an error,
//! so the orchestrator can report an indeterminate location without
//! conflating it with a failed geofence check.

use std::time::Duration;

use async_trait::async_trait;
use docguard_types::GeoPoint;

/// One answer from a location source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocationFix {
    Position {
        point: GeoPoint,
        /// Reported accuracy radius in metres, when the source knows it.
        accuracy_m: Option<f64>,
    },
    /// The user or platform refused to share a position.
    Denied,
    /// No position could be determined.
    Unavailable,
    /// The source gave up before producing a position.
    TimedOut,
}

impl LocationFix {
    pub fn position(point: GeoPoint) -> Self {
        LocationFix::Position {
            point,
            accuracy_m: None,
        }
    }
}

/// Asynchronous provider of the requester's current position.
///
/// `timeout` is a hint; callers also bound the whole call with their own
/// deadline and drop the future when it passes.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_location(&self, timeout: Duration) -> LocationFix;
}

/// Coordinates supplied by the caller up front (HTTP query, CLI flags).
#[derive(Clone, Copy, Debug)]
pub struct FixedLocation(pub LocationFix);

impl FixedLocation {
    pub fn at(point: GeoPoint, accuracy_m: Option<f64>) -> Self {
        Self(LocationFix::Position { point, accuracy_m })
    }
}

#[async_trait]
impl LocationSource for FixedLocation {
    async fn current_location(&self, _timeout: Duration) -> LocationFix {
        self.0
    }
}

/// A requester that cannot provide a position at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationSource for NoLocation {
    async fn current_location(&self, _timeout: Duration) -> LocationFix {
        LocationFix::Unavailable
    }
}
