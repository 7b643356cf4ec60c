//! Content-addressed LMDB blob store.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use docguard_store::{ContentStore, StoreError};
use docguard_types::{ContentRef, Fingerprint};

use crate::LmdbError;

/// Prefix of references produced by this store.
pub const CONTENT_REF_PREFIX: &str = "b2:";

pub struct LmdbContentStore {
    pub(crate) env: Arc<Env>,
    pub(crate) content_db: Database<Bytes, Bytes>,
}

/// Parse a `b2:<hex>` reference. Foreign references (IPFS CIDs, URLs) yield `None`.
pub fn parse_content_ref(content_ref: &ContentRef) -> Option<Fingerprint> {
    content_ref
        .as_str()
        .strip_prefix(CONTENT_REF_PREFIX)
        .and_then(|hex| Fingerprint::from_hex(hex).ok())
}

impl ContentStore for LmdbContentStore {
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        let key = docguard_crypto::fingerprint(bytes);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.content_db
            .put(&mut wtxn, key.as_bytes(), bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        ContentRef::new(format!("{CONTENT_REF_PREFIX}{}", key.to_hex()))
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get(&self, content_ref: &ContentRef) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(key) = parse_content_ref(content_ref) else {
            return Ok(None);
        };
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .content_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }
}
