use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use docguard_store::{StoreError, SuppressionStore};
use docguard_types::Fingerprint;

use crate::LmdbError;

pub struct LmdbSuppressionStore {
    pub(crate) env: Arc<Env>,
    pub(crate) suppressed_db: Database<Bytes, Bytes>,
}

impl SuppressionStore for LmdbSuppressionStore {
    fn suppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .suppressed_db
            .get(&wtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Ok(false);
        }
        self.suppressed_db
            .put(&mut wtxn, fingerprint.as_bytes(), &[])
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(true)
    }

    fn unsuppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .suppressed_db
            .delete(&mut wtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }

    fn is_suppressed(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .suppressed_db
            .get(&rtxn, fingerprint.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    fn suppressed(&self) -> Result<Vec<Fingerprint>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut out = Vec::new();
        for entry in self.suppressed_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, _) = entry.map_err(LmdbError::from)?;
            let arr: [u8; 32] = key
                .try_into()
                .map_err(|_| LmdbError::Corruption("suppressed key length".to_string()))?;
            out.push(Fingerprint::new(arr));
        }
        Ok(out)
    }
}
