//! LMDB implementation of MetaStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use docguard_store::{MetaStore, StoreError};

use crate::LmdbError;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";
const ALGORITHM_KEY: &[u8] = b"fingerprint_algorithm";

pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbMetaStore {
    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.meta_db.get(&rtxn, key)?.map(<[u8]>::to_vec))
    }

    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        self.meta_db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

impl MetaStore for LmdbMetaStore {
    fn schema_version(&self) -> Result<u32, StoreError> {
        match self.read(SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    LmdbError::Corruption(format!(
                        "schema_version is {} bytes, expected 4",
                        bytes.len()
                    ))
                })?;
                Ok(u32::from_le_bytes(arr))
            }
            None => Ok(0),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        Ok(self.write(SCHEMA_VERSION_KEY, &version.to_le_bytes())?)
    }

    fn fingerprint_algorithm(&self) -> Result<Option<String>, StoreError> {
        self.read(ALGORITHM_KEY)?
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|_| {
                    StoreError::Corruption("fingerprint_algorithm is not UTF-8".into())
                })
            })
            .transpose()
    }

    fn set_fingerprint_algorithm(&self, name: &str) -> Result<(), StoreError> {
        Ok(self.write(ALGORITHM_KEY, name.as_bytes())?)
    }
}
