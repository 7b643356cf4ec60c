//! The provenance ledger.

use docguard_types::{Fingerprint, ProvenanceRecord};

use crate::StoreError;

/// Result of an atomic insert-if-absent.
#[derive(Clone, Debug, PartialEq)]
pub enum InsertOutcome {
    /// The record was stored; `sequence` has been assigned.
    Inserted(ProvenanceRecord),
    /// A record for this fingerprint already existed and was left untouched.
    AlreadyExists(ProvenanceRecord),
}

/// Append-only record ledger keyed by fingerprint.
///
/// `insert_if_absent` is the only write and must be atomic: for any number of
/// concurrent calls with the same fingerprint exactly one returns `Inserted`.
pub trait RecordStore {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<ProvenanceRecord>, StoreError>;

    fn insert_if_absent(&self, record: ProvenanceRecord) -> Result<InsertOutcome, StoreError>;

    /// Snapshot of every record, oldest first.
    fn list_all(&self) -> Result<Vec<ProvenanceRecord>, StoreError>;

    fn record_count(&self) -> Result<u64, StoreError>;

    /// Page of records in insertion order.
    fn list_page(&self, offset: u64, limit: usize) -> Result<Vec<ProvenanceRecord>, StoreError> {
        Ok(self
            .list_all()?
            .into_iter()
            .skip(offset as usize)
            .take(limit)
            .collect())
    }

    fn exists(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        Ok(self.get(fingerprint)?.is_some())
    }
}
