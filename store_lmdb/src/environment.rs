//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::migration::Migrator;
use crate::{
    LmdbAccessStore, LmdbContentStore, LmdbError, LmdbMetaStore, LmdbRecordStore,
    LmdbSuppressionStore,
};

/// Named databases created in every environment.
pub(crate) const DATABASES: &[&str] = &[
    "records",
    "record_order",
    "grants",
    "nonces",
    "content",
    "suppressed",
    "meta",
];

/// Default number of named databases reserved in the environment.
pub const DEFAULT_MAX_DBS: u32 = 16;

/// Wraps the LMDB environment and all database handles.
///
/// Store handles returned by the accessor methods are cheap to create and
/// share the same environment; they are `Send + Sync`.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) record_order_db: Database<Bytes, Bytes>,
    pub(crate) grants_db: Database<Bytes, Bytes>,
    pub(crate) nonces_db: Database<Bytes, Bytes>,
    pub(crate) content_db: Database<Bytes, Bytes>,
    pub(crate) suppressed_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // never concurrently re-opened with different flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let records_db = env.create_database(&mut wtxn, Some("records"))?;
        let record_order_db = env.create_database(&mut wtxn, Some("record_order"))?;
        let grants_db = env.create_database(&mut wtxn, Some("grants"))?;
        let nonces_db = env.create_database(&mut wtxn, Some("nonces"))?;
        let content_db = env.create_database(&mut wtxn, Some("content"))?;
        let suppressed_db = env.create_database(&mut wtxn, Some("suppressed"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            records_db,
            record_order_db,
            grants_db,
            nonces_db,
            content_db,
            suppressed_db,
            meta_db,
        };

        Migrator::run(&environment.meta_store())?;
        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(environment)
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: Arc::clone(&self.env),
            records_db: self.records_db,
            record_order_db: self.record_order_db,
        }
    }

    pub fn access_store(&self) -> LmdbAccessStore {
        LmdbAccessStore {
            env: Arc::clone(&self.env),
            grants_db: self.grants_db,
            nonces_db: self.nonces_db,
        }
    }

    pub fn content_store(&self) -> LmdbContentStore {
        LmdbContentStore {
            env: Arc::clone(&self.env),
            content_db: self.content_db,
        }
    }

    pub fn suppression_store(&self) -> LmdbSuppressionStore {
        LmdbSuppressionStore {
            env: Arc::clone(&self.env),
            suppressed_db: self.suppressed_db,
        }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }
}
