use docguard_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeofenceError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] TypesError),

    #[error("invalid radius: {0} (must be finite and greater than zero)")]
    InvalidRadius(f64),
}
