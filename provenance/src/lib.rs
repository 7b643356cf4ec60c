//! The provenance binder.
//!
//! Turns an authenticated claim "submitter S holds document with fingerprint F"
//! into a durable ledger record, exactly once per fingerprint. The first
//! accepted record is authoritative; later claims for the same fingerprint are
//! reported as conflicts and never overwrite it.

pub mod binder;
pub mod error;
pub mod request;

pub use binder::{BindOutcome, ProvenanceBinder};
pub use error::{BindError, InputError};
pub use request::BindRequest;
