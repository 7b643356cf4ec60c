//! Validation errors raised when constructing core types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    #[error("invalid coordinate: latitude {lat}, longitude {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("invalid radius: {0} (must be finite and greater than zero)")]
    InvalidRadius(f64),

    #[error("invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid submitter address: {0}")]
    InvalidAddress(String),

    #[error("content reference must not be empty")]
    EmptyContentRef,
}
