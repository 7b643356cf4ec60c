use docguard_access::AccessError;
use docguard_store::StoreError;
use docguard_types::{Fingerprint, SubmitterAddress};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(
        "requester {} may not verify {fingerprint}",
        .requester.as_ref().map_or("<anonymous>", |r| r.as_str())
    )]
    Unauthorized {
        fingerprint: Fingerprint,
        requester: Option<SubmitterAddress>,
    },

    #[error("ledger error: {0}")]
    Transport(#[from] StoreError),
}

impl From<AccessError> for VerifyError {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Transport(store) => VerifyError::Transport(store),
            other => VerifyError::Transport(StoreError::Backend(other.to_string())),
        }
    }
}
