//! HTTP/JSON server for the DocGuard node.
//!
//! Provides endpoints for:
//! - Document submission (raw bytes in, provenance record out)
//! - Verification (raw bytes plus the requester's position in, verdict out)
//! - Record lookup and the paginated audit trail
//! - Signed grant, revoke, hide and unhide requests
//! - Node status and Prometheus metrics
//!
//! Every JSON response uses the `{"status": "success", "data": ...}` /
//! `{"status": "error", "error": ...}` envelope.

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod response;
pub mod server;

pub use error::RpcError;
pub use response::ApiResponse;
pub use server::{build_router, RpcServer, RpcState};
