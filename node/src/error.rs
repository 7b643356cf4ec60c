use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("bind error: {0}")]
    Bind(#[from] docguard_provenance::BindError),

    #[error("access error: {0}")]
    Access(#[from] docguard_access::AccessError),

    #[error("verification error: {0}")]
    Verify(#[from] docguard_verification::VerifyError),

    #[error("store error: {0}")]
    Store(#[from] docguard_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] docguard_store_lmdb::LmdbError),

    #[error("invalid input: {0}")]
    Input(#[from] docguard_types::TypesError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("ledger failed integrity check: {0}")]
    Integrity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
