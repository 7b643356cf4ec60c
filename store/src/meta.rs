//! Ledger-wide settings.

use crate::StoreError;

/// Settings fixed when a ledger is created and checked every time it opens.
pub trait MetaStore {
    /// Current schema version; 0 for a fresh ledger.
    fn schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;

    /// Name of the fingerprint algorithm every record in the ledger uses.
    /// `None` until the ledger has been stamped.
    fn fingerprint_algorithm(&self) -> Result<Option<String>, StoreError>;

    fn set_fingerprint_algorithm(&self, name: &str) -> Result<(), StoreError>;
}
