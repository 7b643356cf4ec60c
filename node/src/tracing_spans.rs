//! Pre-built [`tracing::Span`] constructors for common DocGuard operations.
//!
//! Using consistent span names and field sets across the codebase makes it
//! easy to filter and correlate traces for one document.

use tracing::{info_span, Span};

/// Span covering one submission, from fingerprinting to the ledger write.
pub fn submit_span(submitter: &str) -> Span {
    info_span!("submit", submitter = %submitter)
}

/// Span covering one verification request.
pub fn verify_span(requester: Option<&str>) -> Span {
    info_span!("verify", requester = requester.unwrap_or("<anonymous>"))
}

/// Span covering a grant, revoke, hide or unhide request.
pub fn access_span(action: &str, fingerprint: &str) -> Span {
    info_span!("access", action = %action, fingerprint = %fingerprint)
}

/// Span covering a single request handled by the HTTP server.
pub fn rpc_span(route: &str) -> Span {
    info_span!("rpc", route = %route)
}
