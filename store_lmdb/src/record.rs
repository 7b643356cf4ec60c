//! LMDB implementation of RecordStore.
//!
//! `records` maps fingerprint bytes to a bincode record. `record_order` maps
//! the big-endian insertion sequence to the fingerprint, so a forward cursor
//! walk yields the audit trail oldest first, and a page seeks straight to
//! its first sequence.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use docguard_store::{InsertOutcome, RecordStore, StoreError};
use docguard_types::{Fingerprint, ProvenanceRecord};

use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Bytes, Bytes>,
    pub(crate) record_order_db: Database<Bytes, Bytes>,
}

fn decode_sequence(key: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = key
        .try_into()
        .map_err(|_| LmdbError::Corruption(format!("record_order key of {} bytes", key.len())))?;
    Ok(u64::from_be_bytes(arr))
}

impl LmdbRecordStore {
    fn load(&self, rtxn: &RoTxn, fp_bytes: &[u8]) -> Result<Option<ProvenanceRecord>, LmdbError> {
        match self.records_db.get(rtxn, fp_bytes)? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn collect_ordered(
        &self,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ProvenanceRecord>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        // Sequences are contiguous from 1, so offset n starts at key n + 1.
        let start = offset.saturating_add(1).to_be_bytes();
        let mut out = Vec::new();
        for entry in self
            .record_order_db
            .range(&rtxn, &(std::ops::Bound::Included(&start[..]), std::ops::Bound::Unbounded))?
            .take(limit)
        {
            let (key, fp_bytes) = entry?;
            let seq = decode_sequence(key)?;
            let record = self.load(&rtxn, fp_bytes)?.ok_or_else(|| {
                LmdbError::Corruption(format!("record_order entry {seq} has no record"))
            })?;
            out.push(record);
        }
        Ok(out)
    }
}

impl RecordStore for LmdbRecordStore {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<ProvenanceRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.load(&rtxn, fingerprint.as_bytes())?)
    }

    /// Check, sequence assignment and both writes happen inside one LMDB write
    /// transaction. LMDB serialises writers, so two racing inserts of the same
    /// fingerprint cannot both observe absence.
    fn insert_if_absent(&self, mut record: ProvenanceRecord) -> Result<InsertOutcome, StoreError> {
        let key = *record.fingerprint.as_bytes();
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(bytes) = self.records_db.get(&wtxn, &key).map_err(LmdbError::from)? {
            let existing: ProvenanceRecord =
                bincode::deserialize(bytes).map_err(LmdbError::from)?;
            return Ok(InsertOutcome::AlreadyExists(existing));
        }

        let sequence = match self.record_order_db.last(&wtxn).map_err(LmdbError::from)? {
            Some((last_key, _)) => decode_sequence(last_key)? + 1,
            None => 1,
        };
        record.sequence = sequence;

        let value = bincode::serialize(&record).map_err(LmdbError::from)?;
        self.records_db
            .put(&mut wtxn, &key, &value)
            .map_err(LmdbError::from)?;
        self.record_order_db
            .put(&mut wtxn, &sequence.to_be_bytes(), &key)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(fingerprint = %record.fingerprint, sequence, "record stored");
        Ok(InsertOutcome::Inserted(record))
    }

    fn list_all(&self) -> Result<Vec<ProvenanceRecord>, StoreError> {
        Ok(self.collect_ordered(0, usize::MAX)?)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.records_db.len(&rtxn).map_err(LmdbError::from)?)
    }

    fn list_page(&self, offset: u64, limit: usize) -> Result<Vec<ProvenanceRecord>, StoreError> {
        Ok(self.collect_ordered(offset, limit)?)
    }
}
