use docguard_store::StoreError;
use docguard_types::{SubmitterAddress, TypesError};
use thiserror::Error;

/// A claim that is malformed before any cryptography is attempted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    #[error(transparent)]
    Malformed(#[from] TypesError),

    #[error("submitter is the null address")]
    NullSubmitter,

    #[error("fingerprint is all zeroes")]
    ZeroFingerprint,
}

#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error("signature does not prove that {submitter} signed this fingerprint")]
    Authenticity { submitter: SubmitterAddress },

    #[error("ledger error: {0}")]
    Transport(#[from] StoreError),
}
