//! Nullable infrastructure for deterministic testing.
//! All external collaborators (clock, ledger, location source, identity
//! provider) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod identity;
pub mod location;
pub mod store;

pub use clock::NullClock;
pub use identity::NullSignatureVerifier;
pub use location::NullLocationSource;
pub use store::NullLedger;
