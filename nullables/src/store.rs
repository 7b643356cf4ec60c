//! Nullable ledger: thread-safe in-memory storage for testing.
//!
//! One struct implements every store trait so a single instance can back the
//! binder, the gate and the orchestrator at once. Failure and corruption can
//! be injected to exercise transport and tamper paths.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use docguard_store::{
    AccessStore, ContentStore, InsertOutcome, RecordStore, StoreError, SuppressionStore,
};
use docguard_types::{AccessGrant, ContentRef, Fingerprint, ProvenanceRecord, SubmitterAddress};

/// An in-memory ledger for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    records: Mutex<Vec<ProvenanceRecord>>,
    grants: Mutex<BTreeSet<(Fingerprint, SubmitterAddress)>>,
    nonces: Mutex<HashMap<Fingerprint, u64>>,
    content: Mutex<HashMap<Fingerprint, Vec<u8>>>,
    suppressed: Mutex<BTreeSet<Fingerprint>>,
    lookup_override: Mutex<Option<ProvenanceRecord>>,
    unavailable: AtomicBool,
    lookups: AtomicUsize,
    inserts: AtomicUsize,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            grants: Mutex::new(BTreeSet::new()),
            nonces: Mutex::new(HashMap::new()),
            content: Mutex::new(HashMap::new()),
            suppressed: Mutex::new(BTreeSet::new()),
            lookup_override: Mutex::new(None),
            unavailable: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Answer every `get` with `record`, whatever was asked for.
    pub fn respond_to_lookups_with(&self, record: ProvenanceRecord) {
        *self.lookup_override.lock().unwrap() = Some(record);
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("null ledger offline".to_string()));
        }
        Ok(())
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for NullLedger {
    fn get(&self, fingerprint: &Fingerprint) -> Result<Option<ProvenanceRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if let Some(forced) = self.lookup_override.lock().unwrap().clone() {
            return Ok(Some(forced));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.fingerprint == *fingerprint)
            .cloned())
    }

    fn insert_if_absent(&self, mut record: ProvenanceRecord) -> Result<InsertOutcome, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.iter().find(|r| r.fingerprint == record.fingerprint) {
            return Ok(InsertOutcome::AlreadyExists(existing.clone()));
        }
        record.sequence = records.len() as u64 + 1;
        records.push(record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    fn list_all(&self) -> Result<Vec<ProvenanceRecord>, StoreError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().clone())
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().len() as u64)
    }
}

impl AccessStore for NullLedger {
    fn put_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .unwrap()
            .insert((grant.fingerprint, grant.grantee.clone())))
    }

    fn delete_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .unwrap()
            .remove(&(grant.fingerprint, grant.grantee.clone())))
    }

    fn has_grant(&self, grant: &AccessGrant) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .unwrap()
            .contains(&(grant.fingerprint, grant.grantee.clone())))
    }

    fn grantees(&self, fingerprint: &Fingerprint) -> Result<Vec<SubmitterAddress>, StoreError> {
        self.check_available()?;
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|(fp, _)| fp == fingerprint)
            .map(|(_, who)| who.clone())
            .collect())
    }

    fn authorization_nonce(&self, fingerprint: &Fingerprint) -> Result<u64, StoreError> {
        self.check_available()?;
        Ok(self
            .nonces
            .lock()
            .unwrap()
            .get(fingerprint)
            .copied()
            .unwrap_or(0))
    }

    fn advance_nonce(&self, fingerprint: &Fingerprint, expected: u64) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut nonces = self.nonces.lock().unwrap();
        let current = nonces.entry(*fingerprint).or_insert(0);
        if *current != expected {
            return Ok(false);
        }
        *current += 1;
        Ok(true)
    }
}

impl ContentStore for NullLedger {
    fn put(&self, bytes: &[u8]) -> Result<ContentRef, StoreError> {
        self.check_available()?;
        let key = docguard_crypto::fingerprint(bytes);
        self.content.lock().unwrap().insert(key, bytes.to_vec());
        ContentRef::new(format!("b2:{}", key.to_hex()))
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get(&self, content_ref: &ContentRef) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_available()?;
        let Some(key) = content_ref
            .as_str()
            .strip_prefix("b2:")
            .and_then(|hex| Fingerprint::from_hex(hex).ok())
        else {
            return Ok(None);
        };
        Ok(self.content.lock().unwrap().get(&key).cloned())
    }
}

impl SuppressionStore for NullLedger {
    fn suppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.suppressed.lock().unwrap().insert(*fingerprint))
    }

    fn unsuppress(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.suppressed.lock().unwrap().remove(fingerprint))
    }

    fn is_suppressed(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.suppressed.lock().unwrap().contains(fingerprint))
    }

    fn suppressed(&self) -> Result<Vec<Fingerprint>, StoreError> {
        self.check_available()?;
        Ok(self.suppressed.lock().unwrap().iter().copied().collect())
    }
}
