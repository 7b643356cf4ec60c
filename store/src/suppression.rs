use docguard_types::Fingerprint;

use crate::StoreError;

/// Logical removal of records from audit listings.
///
/// Suppression is presentation only. A suppressed record is still returned by
/// [`crate::RecordStore::get`] and still verifies.
pub trait SuppressionStore {
    /// Returns `false` if the fingerprint was already suppressed.
    fn suppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError>;

    /// Returns `false` if the fingerprint was not suppressed.
    fn unsuppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError>;

    fn is_suppressed(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError>;

    fn suppressed(&self) -> Result<Vec<Fingerprint>, StoreError>;
}
