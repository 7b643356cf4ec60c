//! Axum-based HTTP server.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::Method;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;

use docguard_node::tracing_spans::rpc_span;
use docguard_node::DocGuardNode;

use crate::error::RpcError;
use crate::handlers;

/// Largest document accepted for submission or verification.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// State shared by every handler.
#[derive(Clone)]
pub struct RpcState {
    pub node: Arc<DocGuardNode>,
}

impl RpcState {
    pub fn new(node: Arc<DocGuardNode>) -> Self {
        Self { node }
    }
}

/// Every route, with CORS open to browser front ends.
pub fn build_router(state: RpcState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/records", post(handlers::submit))
        .route("/records/:fingerprint", get(handlers::get_record))
        .route("/records/:fingerprint/content", get(handlers::get_content))
        .route("/records/:fingerprint/nonce", get(handlers::nonce))
        .route("/records/:fingerprint/hide", post(handlers::hide))
        .route("/records/:fingerprint/unhide", post(handlers::unhide))
        .route("/verify", post(handlers::verify))
        .route("/audit", get(handlers::audit))
        .route("/access/grant", post(handlers::grant))
        .route("/access/revoke", post(handlers::revoke))
        .route("/access/:fingerprint", get(handlers::grantees))
        .route("/access/:fingerprint/:address", get(handlers::check_access))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn(trace_request))
        .layer(cors)
        .with_state(state)
}

async fn trace_request(request: Request, next: Next) -> Response {
    let span = rpc_span(request.uri().path());
    let method = request.method().clone();
    async move {
        let response = next.run(request).await;
        tracing::debug!(%method, status = response.status().as_u16(), "request handled");
        response
    }
    .instrument(span)
    .await
}

/// The HTTP server, configured with a bind address and shared state.
pub struct RpcServer {
    pub addr: String,
    pub state: RpcState,
}

impl RpcServer {
    pub fn new(addr: impl Into<String>, node: Arc<DocGuardNode>) -> Self {
        Self {
            addr: addr.into(),
            state: RpcState::new(node),
        }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        tracing::info!(addr = %self.addr, "HTTP server listening");
        axum::serve(listener, build_router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
