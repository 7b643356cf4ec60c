//! LMDB implementation of AccessStore.
//!
//! Grants use composite keys `fingerprint_bytes ++ grantee_bytes` with an
//! empty value, so listing the grantees of one record is a prefix scan.
//! `nonces` maps fingerprint bytes to a big-endian u64.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use docguard_store::{AccessStore, StoreError};
use docguard_types::{AccessGrant, Fingerprint, SubmitterAddress};

use crate::LmdbError;

pub struct LmdbAccessStore {
    pub(crate) env: Arc<Env>,
    pub(crate) grants_db: Database<Bytes, Bytes>,
    pub(crate) nonces_db: Database<Bytes, Bytes>,
}

fn decode_nonce(bytes: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("nonce of {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(arr))
}

fn composite_key(grant: &AccessGrant) -> Vec<u8> {
    let g = grant.grantee.as_str().as_bytes();
    let mut key = Vec::with_capacity(32 + g.len());
    key.extend_from_slice(grant.fingerprint.as_bytes());
    key.extend_from_slice(g);
    key
}

impl AccessStore for LmdbAccessStore {
    fn put_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        let key = composite_key(grant);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self.grants_db.get(&wtxn, &key).map_err(LmdbError::from)?.is_some() {
            return Ok(false);
        }
        self.grants_db
            .put(&mut wtxn, &key, &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn delete_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        let key = composite_key(grant);
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .grants_db
            .delete(&mut wtxn, &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }

    fn has_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .grants_db
            .get(&rtxn, &composite_key(grant))
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn grantees(&self, fingerprint: &Fingerprint) -> Result<Vec<SubmitterAddress>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self
            .grants_db
            .prefix_iter(&rtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?
        {
            let (key, _) = entry.map_err(LmdbError::from)?;
            let raw = std::str::from_utf8(&key[32..])
                .map_err(|e| LmdbError::Corruption(format!("grantee key: {e}")))?;
            let address = SubmitterAddress::parse(raw)
                .map_err(|e| LmdbError::Corruption(format!("grantee key: {e}")))?;
            out.push(address);
        }
        Ok(out)
    }

    fn authorization_nonce(&self, fingerprint: &Fingerprint) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .nonces_db
            .get(&rtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode_nonce(bytes)?),
            None => Ok(0),
        }
    }

    fn advance_nonce(&self, fingerprint: &Fingerprint, expected: u64) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current = match self
            .nonces_db
            .get(&wtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => decode_nonce(bytes)?,
            None => 0,
        };
        if current != expected {
            return Ok(false);
        }
        let next = current
            .checked_add(1)
            .ok_or_else(|| LmdbError::Corruption("nonce exhausted".into()))?;
        self.nonces_db
            .put(&mut wtxn, fingerprint.as_bytes(), &next.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }
}
