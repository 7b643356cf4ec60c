use docguard_store::StoreError;
use docguard_types::{Fingerprint, SubmitterAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("no record for fingerprint {0}")]
    RecordNotFound(Fingerprint),

    #[error("{by} may not change access to {fingerprint}")]
    Unauthorized {
        fingerprint: Fingerprint,
        by: SubmitterAddress,
    },

    /// The signature is wrong, or was made for an older nonce or outside
    /// the read window.
    #[error("authorization from {by} rejected: {reason}")]
    BadAuthorization {
        by: SubmitterAddress,
        reason: &'static str,
    },

    #[error("ledger error: {0}")]
    Transport(#[from] StoreError),
}
