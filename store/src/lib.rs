//! Abstract storage traits for DocGuard.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The binder, gate and orchestrator depend only on the traits.

pub mod access;
pub mod content;
pub mod error;
pub mod meta;
pub mod record;
pub mod suppression;

pub use access::AccessStore;
pub use content::ContentStore;
pub use error::StoreError;
pub use meta::MetaStore;
pub use record::{InsertOutcome, RecordStore};
pub use suppression::SuppressionStore;
