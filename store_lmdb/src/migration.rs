//! Schema migrations and the fingerprint algorithm stamp.
//!
//! The schema version only moves forward. Each step between two adjacent
//! versions is run in order on open, then the new version is stored.

use docguard_crypto::FINGERPRINT_ALGORITHM;
use docguard_store::MetaStore;

use crate::LmdbError;

/// The schema version that the current code expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

pub struct Migrator;

impl Migrator {
    /// Bring the ledger up to [`CURRENT_SCHEMA_VERSION`], then confirm it was
    /// built with the fingerprint algorithm this build computes.
    ///
    /// A stored version newer than [`CURRENT_SCHEMA_VERSION`] was written by a
    /// newer build and is refused.
    pub fn run(meta: &impl MetaStore) -> Result<(), LmdbError> {
        let current = meta.schema_version()?;

        if current > CURRENT_SCHEMA_VERSION {
            return Err(LmdbError::SchemaTooNew {
                found: current,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }

        if current < CURRENT_SCHEMA_VERSION {
            for version in current..CURRENT_SCHEMA_VERSION {
                tracing::info!(from = version, to = version + 1, "running migration");
                run_migration(meta, version, version + 1)?;
            }
            meta.set_schema_version(CURRENT_SCHEMA_VERSION)?;
            tracing::info!(version = CURRENT_SCHEMA_VERSION, "migration complete");
        } else {
            tracing::debug!(version = current, "ledger schema is up to date");
        }

        check_algorithm(meta)
    }
}

fn run_migration(meta: &impl MetaStore, from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        (0, 1) => Ok(meta.set_fingerprint_algorithm(FINGERPRINT_ALGORITHM)?),
        // `nonces` is created on open; existing records start at nonce 0.
        (1, 2) => Ok(()),
        _ => Err(LmdbError::Heed(format!("unknown migration: {from} -> {to}"))),
    }
}

/// Fingerprints from different algorithms never compare equal, so a ledger
/// stamped with another algorithm would report every document as not found.
fn check_algorithm(meta: &impl MetaStore) -> Result<(), LmdbError> {
    match meta.fingerprint_algorithm()? {
        Some(found) if found == FINGERPRINT_ALGORITHM => Ok(()),
        Some(found) => Err(LmdbError::AlgorithmMismatch {
            found,
            expected: FINGERPRINT_ALGORITHM,
        }),
        None => Err(LmdbError::Corruption(
            "ledger has no fingerprint algorithm stamp".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;

    fn open(path: &std::path::Path) -> Result<LmdbEnvironment, LmdbError> {
        LmdbEnvironment::open(path, 16, 1 << 20)
    }

    #[test]
    fn fresh_environment_is_stamped() {
        let dir = tempfile::tempdir().unwrap();
        let env = open(dir.path()).unwrap();
        let meta = env.meta_store();
        assert_eq!(meta.schema_version().unwrap(), CURRENT_SCHEMA_VERSION);
        assert_eq!(
            meta.fingerprint_algorithm().unwrap().as_deref(),
            Some(FINGERPRINT_ALGORITHM)
        );
    }

    #[test]
    fn reopen_keeps_stamp() {
        let dir = tempfile::tempdir().unwrap();
        drop(open(dir.path()).unwrap());
        assert!(open(dir.path()).is_ok());
    }

    #[test]
    fn newer_schema_refused() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = open(dir.path()).unwrap();
            env.meta_store()
                .set_schema_version(CURRENT_SCHEMA_VERSION + 1)
                .unwrap();
        }
        let err = open(dir.path()).err().unwrap();
        assert!(matches!(err, LmdbError::SchemaTooNew { .. }));
    }

    #[test]
    fn foreign_algorithm_refused() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = open(dir.path()).unwrap();
            env.meta_store().set_fingerprint_algorithm("sha256").unwrap();
        }
        let err = open(dir.path()).err().unwrap();
        assert!(matches!(err, LmdbError::AlgorithmMismatch { ref found, .. } if found == "sha256"));
    }

    #[test]
    fn version_one_ledger_upgrades() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = open(dir.path()).unwrap();
            env.meta_store().set_schema_version(1).unwrap();
        }
        let env = open(dir.path()).unwrap();
        assert_eq!(env.meta_store().schema_version().unwrap(), 2);
    }

    #[test]
    fn unknown_migration_step_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = open(dir.path()).unwrap();
        assert!(run_migration(&env.meta_store(), 7, 8).is_err());
    }
}
