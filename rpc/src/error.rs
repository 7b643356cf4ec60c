//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use docguard_access::AccessError;
use docguard_node::NodeError;
use docguard_provenance::BindError;
use docguard_store::StoreError;
use docguard_types::TypesError;
use docguard_verification::VerifyError;

use crate::ApiResponse;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A signature did not prove who the caller claims to be.
    #[error("authentication failed: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::NotFound(_) => StatusCode::NOT_FOUND,
            RpcError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            RpcError::Forbidden(_) => StatusCode::FORBIDDEN,
            RpcError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<StoreError> for RpcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => RpcError::Unavailable(msg),
            StoreError::NotFound(key) => RpcError::NotFound(key),
            other => RpcError::Server(other.to_string()),
        }
    }
}

impl From<TypesError> for RpcError {
    fn from(e: TypesError) -> Self {
        RpcError::InvalidRequest(e.to_string())
    }
}

impl From<NodeError> for RpcError {
    fn from(e: NodeError) -> Self {
        match e {
            NodeError::Bind(BindError::Input(input)) => RpcError::InvalidRequest(input.to_string()),
            NodeError::Bind(e @ BindError::Authenticity { .. }) => {
                RpcError::Unauthenticated(e.to_string())
            }
            NodeError::Bind(BindError::Transport(store)) => store.into(),
            NodeError::Access(e @ AccessError::RecordNotFound(_)) => {
                RpcError::NotFound(e.to_string())
            }
            NodeError::Access(e @ AccessError::Unauthorized { .. }) => {
                RpcError::Forbidden(e.to_string())
            }
            NodeError::Access(e @ AccessError::BadAuthorization { .. }) => {
                RpcError::Unauthenticated(e.to_string())
            }
            NodeError::Access(AccessError::Transport(store)) => store.into(),
            NodeError::Verify(e @ VerifyError::Unauthorized { .. }) => {
                RpcError::Forbidden(e.to_string())
            }
            NodeError::Verify(VerifyError::Transport(store)) => store.into(),
            NodeError::Store(store) => store.into(),
            NodeError::Input(e) => e.into(),
            other => RpcError::Server(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_types::Fingerprint;

    #[test]
    fn node_errors_map_to_status_codes() {
        let missing: RpcError =
            NodeError::Access(AccessError::RecordNotFound(Fingerprint::new([1; 32]))).into();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let offline: RpcError = NodeError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(offline.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bad_radius: RpcError = NodeError::Input(TypesError::InvalidRadius(0.0)).into();
        assert_eq!(bad_radius.status(), StatusCode::BAD_REQUEST);

        let refused: RpcError = NodeError::Verify(VerifyError::Unauthorized {
            fingerprint: Fingerprint::new([2; 32]),
            requester: None,
        })
        .into();
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    }
}
