//! Claim validation, authentication and the single ledger write.

use docguard_crypto::{fingerprint, SignatureVerifier, FINGERPRINT_ALGORITHM};
use docguard_store::{ContentStore, InsertOutcome, RecordStore};
use docguard_types::{
    Clock, Fingerprint, LocationConstraint, ProvenanceRecord, Signature, SubmitterAddress,
};

use crate::{BindError, BindRequest, InputError};

/// Result of a well-formed, authenticated bind.
#[derive(Clone, Debug, PartialEq)]
pub enum BindOutcome {
    /// A new record was written.
    Bound(ProvenanceRecord),
    /// A record already existed for this fingerprint and was left unchanged.
    Conflict { existing: ProvenanceRecord },
}

impl BindOutcome {
    /// The authoritative record for the fingerprint, new or pre-existing.
    pub fn record(&self) -> &ProvenanceRecord {
        match self {
            BindOutcome::Bound(record) => record,
            BindOutcome::Conflict { existing } => existing,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, BindOutcome::Bound(_))
    }

    /// A conflict with a record the same submitter created earlier.
    pub fn is_own_prior_submission(&self, submitter: &SubmitterAddress) -> bool {
        match self {
            BindOutcome::Conflict { existing } => &existing.submitter == submitter,
            BindOutcome::Bound(_) => false,
        }
    }
}

/// Binds fingerprints to submitters.
///
/// Holds no state of its own; concurrent binds of the same fingerprint are
/// arbitrated by the ledger's atomic `insert_if_absent`.
pub struct ProvenanceBinder<'a, L: ?Sized, V: ?Sized, C: ?Sized> {
    ledger: &'a L,
    verifier: &'a V,
    clock: &'a C,
}

impl<'a, L, V, C> ProvenanceBinder<'a, L, V, C>
where
    L: RecordStore + ?Sized,
    V: SignatureVerifier + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(ledger: &'a L, verifier: &'a V, clock: &'a C) -> Self {
        Self {
            ledger,
            verifier,
            clock,
        }
    }

    /// Validate, authenticate and record a claim.
    ///
    /// The ledger is touched at most once, and only after the signature has
    /// been verified.
    pub fn bind(&self, request: BindRequest) -> Result<BindOutcome, BindError> {
        validate_claim(&request.fingerprint, &request.submitter)?;
        self.authenticate(&request.fingerprint, &request.signature, &request.submitter)?;
        self.commit(request)
    }

    /// Fingerprint `bytes`, store them, and bind the result.
    ///
    /// The claim is authenticated before anything is written to the content
    /// store.
    pub fn submit<S: ContentStore + ?Sized>(
        &self,
        bytes: &[u8],
        content: &S,
        submitter: SubmitterAddress,
        signature: Signature,
        location: Option<LocationConstraint>,
    ) -> Result<BindOutcome, BindError> {
        let fp = fingerprint(bytes);
        validate_claim(&fp, &submitter)?;
        self.authenticate(&fp, &signature, &submitter)?;
        let content_ref = content.put(bytes)?;
        self.commit(BindRequest {
            fingerprint: fp,
            signature,
            submitter,
            content_ref,
            location,
        })
    }

    fn authenticate(
        &self,
        fp: &Fingerprint,
        signature: &Signature,
        submitter: &SubmitterAddress,
    ) -> Result<(), BindError> {
        if self
            .verifier
            .verify_signature(&fp.signing_message(), signature, submitter)
        {
            return Ok(());
        }
        tracing::warn!(
            fingerprint = %fp,
            submitter = %submitter.short(),
            "signature rejected; claim not bound"
        );
        Err(BindError::Authenticity {
            submitter: submitter.clone(),
        })
    }

    fn commit(&self, request: BindRequest) -> Result<BindOutcome, BindError> {
        let record = ProvenanceRecord {
            fingerprint: request.fingerprint,
            algorithm: FINGERPRINT_ALGORITHM.to_string(),
            submitter: request.submitter,
            signature: request.signature,
            timestamp: self.clock.now(),
            content_ref: request.content_ref,
            location: request.location,
            sequence: 0,
        };

        match self.ledger.insert_if_absent(record)? {
            InsertOutcome::Inserted(record) => {
                tracing::info!(
                    fingerprint = %record.fingerprint,
                    submitter = %record.submitter.short(),
                    sequence = record.sequence,
                    gated = record.is_location_gated(),
                    "fingerprint bound"
                );
                Ok(BindOutcome::Bound(record))
            }
            InsertOutcome::AlreadyExists(existing) => {
                tracing::info!(
                    fingerprint = %existing.fingerprint,
                    owner = %existing.submitter.short(),
                    "fingerprint already bound"
                );
                Ok(BindOutcome::Conflict { existing })
            }
        }
    }
}

fn validate_claim(fp: &Fingerprint, submitter: &SubmitterAddress) -> Result<(), InputError> {
    if fp.is_zero() {
        return Err(InputError::ZeroFingerprint);
    }
    if submitter.is_null() {
        return Err(InputError::NullSubmitter);
    }
    Ok(())
}
