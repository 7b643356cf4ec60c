//! Access grant storage.

use docguard_types::{AccessGrant, Fingerprint, SubmitterAddress};

use crate::StoreError;

/// Set of `(fingerprint, grantee)` pairs, plus the per-record counter that
/// signed access changes are bound to.
pub trait AccessStore {
    /// Add a grant. Returns `false` if it was already present.
    fn put_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError>;

    /// Remove a grant. Returns `false` if it was not present.
    fn delete_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError>;

    fn has_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError>;

    /// All grantees for a fingerprint, in key order.
    fn grantees(&self, fingerprint: &Fingerprint) -> Result<Vec<SubmitterAddress>, StoreError>;

    /// Nonce the next signed change to this record must carry. Starts at 0.
    fn authorization_nonce(&self, fingerprint: &Fingerprint) -> Result<u64, StoreError>;

    /// Move the nonce from `expected` to `expected + 1`.
    ///
    /// Returns `false` without writing when the stored nonce is not
    /// `expected`; compare and increment are atomic.
    fn advance_nonce(&self, fingerprint: &Fingerprint, expected: u64) -> Result<bool, StoreError>;
}
