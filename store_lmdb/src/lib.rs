//! LMDB storage backend for DocGuard.
//!
//! Implements all storage traits from `docguard-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more named databases within a
//! single environment.

pub mod access;
pub mod content;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod meta;
pub mod migration;
pub mod record;
pub mod suppression;

pub use access::LmdbAccessStore;
pub use content::LmdbContentStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use record::LmdbRecordStore;
pub use suppression::LmdbSuppressionStore;
