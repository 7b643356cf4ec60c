//! DocGuard service node.
//!
//! The node owns the LMDB environment and wires the core engines together:
//! - Submissions flow through the provenance binder
//! - Verifications flow through the orchestrator
//! - Grant, revoke and hide requests are authenticated then passed to the gate
//! - The audit trail is served from the ledger with suppressed records hidden
//!
//! Transports (HTTP, CLI) talk to [`DocGuardNode`] and nothing below it.

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod requests;
pub mod shutdown;
pub mod tracing_spans;

pub use audit::{AuditPage, AuditTrail};
pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::{DocGuardNode, NodeStatus};
pub use requests::{SignedAccessChange, SignedSuppression};
pub use shutdown::ShutdownController;
