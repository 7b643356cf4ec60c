//! Off-ledger storage for document bytes.

use docguard_types::ContentRef;

use crate::StoreError;

/// Stores document bytes and hands back an opaque reference.
///
/// Bytes fetched back are never a trust source: verification always
/// re-fingerprints whatever the caller presents.
pub trait ContentStore {
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError>;

    /// `Ok(None)` when the reference is unknown to this store.
    fn get(&self, content_ref: &ContentRef) -> Result<Option<Vec<u8>>, StoreError>;
}
