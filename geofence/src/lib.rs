//! Geofence evaluation.
//!
//! Decides whether a candidate point lies within a tolerance radius of a
//! reference point using the haversine great-circle distance.
//!
//! The Earth is modelled as a sphere of radius [`EARTH_RADIUS_METERS`]. Against
//! the WGS-84 ellipsoid this under- or over-estimates distances by up to about
//! 0.5 %, i.e. well under a metre at the tens-of-metres radii location locks
//! use. Callers needing survey-grade precision must not rely on this module.
//!
//! All functions are pure and deterministic.

pub mod error;
pub mod source;

use docguard_types::{GeoPoint, LocationConstraint};
use serde::{Deserialize, Serialize};

pub use error::GeofenceError;
pub use source::{FixedLocation, LocationFix, LocationSource, NoLocation};

/// Mean Earth radius used by the spherical model, in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in metres.
///
/// Identical points yield exactly `0.0`. Antipodal points yield `π·R`: the
/// haversine term is clamped to `[0, 1]` so rounding can never produce NaN.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let dlat = (b.lat() - a.lat()).to_radians();
    let dlon = (b.lon() - a.lon()).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Whether `candidate` lies within `radius_meters` of `reference` (inclusive).
pub fn within_radius(
    reference: GeoPoint,
    candidate: GeoPoint,
    radius_meters: f64,
) -> Result<bool, GeofenceError> {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return Err(GeofenceError::InvalidRadius(radius_meters));
    }
    Ok(distance_meters(reference, candidate) <= radius_meters)
}

/// [`within_radius`] over raw coordinates, rejecting out-of-range input.
pub fn within_radius_checked(
    reference_lat: f64,
    reference_lon: f64,
    candidate_lat: f64,
    candidate_lon: f64,
    radius_meters: f64,
) -> Result<bool, GeofenceError> {
    let reference = GeoPoint::new(reference_lat, reference_lon)?;
    let candidate = GeoPoint::new(candidate_lat, candidate_lon)?;
    within_radius(reference, candidate, radius_meters)
}

/// Result of checking one candidate point against a location constraint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeofenceReport {
    pub distance_meters: f64,
    pub radius_meters: f64,
    pub within: bool,
}

/// Evaluate a candidate point against a record's constraint.
///
/// Infallible: a [`LocationConstraint`] always carries a valid radius.
pub fn evaluate(constraint: &LocationConstraint, candidate: GeoPoint) -> GeofenceReport {
    let distance = distance_meters(constraint.reference(), candidate);
    GeofenceReport {
        distance_meters: distance,
        radius_meters: constraint.radius_meters(),
        within: distance <= constraint.radius_meters(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(distance_meters(p(10.0, 10.0), p(10.0, 10.0)), 0.0);
        assert_eq!(distance_meters(p(-89.9, 179.9), p(-89.9, 179.9)), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = distance_meters(p(0.0, 0.0), p(0.0, 1.0));
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_circumference() {
        let d = distance_meters(p(0.0, 0.0), p(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - expected).abs() < 1e-6, "got {d}");
        assert!(distance_meters(p(90.0, 0.0), p(-90.0, 0.0)).is_finite());
    }

    #[test]
    fn symmetric() {
        let a = p(51.5007, -0.1246);
        let b = p(40.6892, -74.0445);
        assert_eq!(distance_meters(a, b), distance_meters(b, a));
    }

    #[test]
    fn dateline_crossing_is_short() {
        let d = distance_meters(p(0.0, 179.9995), p(0.0, -179.9995));
        assert!(d < 200.0, "got {d}");
    }

    #[test]
    fn within_radius_inclusive_boundary() {
        let reference = p(10.0, 10.0);
        let candidate = p(10.0005, 10.0);
        let d = distance_meters(reference, candidate);
        assert!(within_radius(reference, candidate, d).unwrap());
        assert!(within_radius(reference, candidate, d + 1e-6).unwrap());
        assert!(!within_radius(reference, candidate, d - 1e-6).unwrap());
    }

    #[test]
    fn five_km_away_is_outside_100m() {
        let reference = p(10.0, 10.0);
        let far = p(10.045, 10.0);
        let d = distance_meters(reference, far);
        assert!((4_900.0..5_100.0).contains(&d), "got {d}");
        assert!(!within_radius(reference, far, 100.0).unwrap());
    }

    #[test]
    fn bad_radius_rejected() {
        let a = p(0.0, 0.0);
        assert_eq!(within_radius(a, a, 0.0), Err(GeofenceError::InvalidRadius(0.0)));
        assert!(within_radius(a, a, -1.0).is_err());
        assert!(within_radius(a, a, f64::INFINITY).is_err());
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(matches!(
            within_radius_checked(91.0, 0.0, 0.0, 0.0, 10.0),
            Err(GeofenceError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            within_radius_checked(0.0, 0.0, 0.0, f64::NAN, 10.0),
            Err(GeofenceError::InvalidCoordinate(_))
        ));
        assert_eq!(within_radius_checked(0.0, 0.0, 0.0, 0.0, 10.0), Ok(true));
    }

    #[test]
    fn evaluate_reports_distance() {
        let c = LocationConstraint::new(p(10.0, 10.0), 100.0).unwrap();
        let inside = evaluate(&c, p(10.0, 10.0));
        assert!(inside.within);
        assert_eq!(inside.distance_meters, 0.0);
        let outside = evaluate(&c, p(10.045, 10.0));
        assert!(!outside.within);
        assert_eq!(outside.radius_meters, 100.0);
    }
}
