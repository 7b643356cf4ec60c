//! Fundamental types for DocGuard.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! content fingerprints, submitter addresses, keys and signatures, timestamps,
//! geographic points and location constraints, and the provenance record itself.

pub mod address;
pub mod content;
pub mod error;
pub mod fingerprint;
pub mod geo;
pub mod keys;
pub mod record;
pub mod time;

pub use address::SubmitterAddress;
pub use content::ContentRef;
pub use error::TypesError;
pub use fingerprint::Fingerprint;
pub use geo::{GeoPoint, LocationConstraint};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use record::{AccessGrant, ProvenanceRecord};
pub use time::{Clock, SystemClock, Timestamp};
