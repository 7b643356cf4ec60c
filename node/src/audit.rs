//! The audit trail: every record in insertion order, minus suppressed ones.

use docguard_store::{RecordStore, StoreError, SuppressionStore};
use docguard_types::ProvenanceRecord;
use serde::Serialize;

/// One page of the audit trail.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditPage {
    pub records: Vec<ProvenanceRecord>,
    /// Ledger offset to resume from, or `None` once the ledger is exhausted.
    pub next_offset: Option<u64>,
}

/// Read-only view over the ledger for display.
///
/// Offsets count ledger positions, suppressed records included, so a cursor
/// stays valid when records are hidden or unhidden between pages.
pub struct AuditTrail<'a, R: ?Sized, S: ?Sized> {
    records: &'a R,
    suppression: &'a S,
}

impl<'a, R, S> AuditTrail<'a, R, S>
where
    R: RecordStore + ?Sized,
    S: SuppressionStore + ?Sized,
{
    pub fn new(records: &'a R, suppression: &'a S) -> Self {
        Self {
            records,
            suppression,
        }
    }

    /// Up to `count` visible records starting at ledger position `offset`.
    pub fn page(&self, offset: u64, count: usize) -> Result<AuditPage, StoreError> {
        self.page_filtered(offset, count, |_| Ok::<_, StoreError>(true))
    }

    /// [`Self::page`], keeping only records `keep` accepts. Rejected records
    /// advance the cursor like suppressed ones.
    pub fn page_filtered<E, F>(&self, offset: u64, count: usize, mut keep: F) -> Result<AuditPage, E>
    where
        E: From<StoreError>,
        F: FnMut(&ProvenanceRecord) -> Result<bool, E>,
    {
        let mut visible = Vec::with_capacity(count);
        let mut cursor = offset;

        while visible.len() < count {
            let want = count - visible.len();
            let batch = self.records.list_page(cursor, want)?;
            let fetched = batch.len();
            for record in batch {
                cursor += 1;
                if self.suppression.is_suppressed(&record.fingerprint)? {
                    continue;
                }
                if keep(&record)? {
                    visible.push(record);
                }
            }
            if fetched < want {
                return Ok(AuditPage {
                    records: visible,
                    next_offset: None,
                });
            }
        }

        Ok(AuditPage {
            records: visible,
            next_offset: Some(cursor),
        })
    }

    /// Snapshot of the whole visible trail, oldest first.
    pub fn all(&self) -> Result<Vec<ProvenanceRecord>, StoreError> {
        self.all_filtered(|_| Ok::<_, StoreError>(true))
    }

    pub fn all_filtered<E, F>(&self, mut keep: F) -> Result<Vec<ProvenanceRecord>, E>
    where
        E: From<StoreError>,
        F: FnMut(&ProvenanceRecord) -> Result<bool, E>,
    {
        let mut out = Vec::new();
        for record in self.records.list_all()? {
            if !self.suppression.is_suppressed(&record.fingerprint)? && keep(&record)? {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_crypto::{fingerprint, IdentityProvider, LocalIdentity, FINGERPRINT_ALGORITHM};
    use docguard_nullables::NullLedger;
    use docguard_types::{ContentRef, Timestamp};

    fn seed(ledger: &NullLedger, n: usize) -> Vec<ProvenanceRecord> {
        let id = LocalIdentity::from_seed(&[9; 32]);
        (0..n)
            .map(|i| {
                let fp = fingerprint(format!("doc-{i}").as_bytes());
                let record = ProvenanceRecord {
                    fingerprint: fp,
                    algorithm: FINGERPRINT_ALGORITHM.to_string(),
                    submitter: id.address().clone(),
                    signature: id.sign_fingerprint(&fp, id.address()).unwrap(),
                    timestamp: Timestamp::new(i as u64),
                    content_ref: ContentRef::new(format!("ref-{i}")).unwrap(),
                    location: None,
                    sequence: 0,
                };
                match ledger.insert_if_absent(record).unwrap() {
                    docguard_store::InsertOutcome::Inserted(r) => r,
                    other => panic!("unexpected {other:?}"),
                }
            })
            .collect()
    }

    #[test]
    fn pages_walk_the_ledger_in_order() {
        let ledger = NullLedger::new();
        let records = seed(&ledger, 5);
        let trail = AuditTrail::new(&ledger, &ledger);

        let first = trail.page(0, 2).unwrap();
        assert_eq!(first.records, records[..2]);
        assert_eq!(first.next_offset, Some(2));

        let last = trail.page(4, 2).unwrap();
        assert_eq!(last.records, records[4..]);
        assert_eq!(last.next_offset, None);
    }

    #[test]
    fn suppressed_records_are_skipped_but_pages_stay_full() {
        let ledger = NullLedger::new();
        let records = seed(&ledger, 5);
        ledger.suppress(&records[1].fingerprint).unwrap();

        let trail = AuditTrail::new(&ledger, &ledger);
        let page = trail.page(0, 2).unwrap();
        assert_eq!(page.records, vec![records[0].clone(), records[2].clone()]);
        assert_eq!(page.next_offset, Some(3));

        assert_eq!(trail.all().unwrap().len(), 4);
        // Still resolvable directly.
        assert!(RecordStore::get(&ledger, &records[1].fingerprint).unwrap().is_some());
    }

    #[test]
    fn filter_skips_records_without_shrinking_pages() {
        let ledger = NullLedger::new();
        let records = seed(&ledger, 6);
        let trail = AuditTrail::new(&ledger, &ledger);
        let even = |r: &ProvenanceRecord| Ok::<_, StoreError>(r.sequence % 2 == 0);

        let page = trail.page_filtered(0, 2, even).unwrap();
        assert_eq!(page.records, vec![records[1].clone(), records[3].clone()]);
        assert_eq!(page.next_offset, Some(4));
        assert_eq!(trail.all_filtered(even).unwrap().len(), 3);
        assert!(trail
            .all_filtered(|_| Ok::<_, StoreError>(false))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn empty_ledger_has_no_next_page() {
        let ledger = NullLedger::new();
        let page = AuditTrail::new(&ledger, &ledger).page(0, 10).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.next_offset, None);
    }
}
