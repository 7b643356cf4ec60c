//! Geographic points and location constraints.
//!
//! Both types validate on construction and on deserialization, so a value in
//! hand is always in range. Distance math lives in `docguard-geofence`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = TypesError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lon)
    }
}

impl GeoPoint {
    /// Build a point, rejecting NaN, infinities and out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, TypesError> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if !lat_ok || !lon_ok {
            return Err(TypesError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A reference point plus tolerance radius gating verification of a record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraint")]
pub struct LocationConstraint {
    reference: GeoPoint,
    radius_meters: f64,
}

#[derive(Deserialize)]
struct RawConstraint {
    reference: GeoPoint,
    radius_meters: f64,
}

impl TryFrom<RawConstraint> for LocationConstraint {
    type Error = TypesError;

    fn try_from(raw: RawConstraint) -> Result<Self, Self::Error> {
        LocationConstraint::new(raw.reference, raw.radius_meters)
    }
}

impl LocationConstraint {
    /// Build a constraint. The radius must be finite and strictly positive.
    pub fn new(reference: GeoPoint, radius_meters: f64) -> Result<Self, TypesError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(TypesError::InvalidRadius(radius_meters));
        }
        Ok(Self {
            reference,
            radius_meters,
        })
    }

    pub fn reference(&self) -> GeoPoint {
        self.reference
    }

    pub fn radius_meters(&self) -> f64 {
        self.radius_meters
    }
}
