//! Access control gate.
//!
//! Decides who may read or verify a record and lets a record's owner (or a
//! configured delegated authority) grant and revoke that right. Decisions
//! are made against the recorded submitter, never against whoever is asking,
//! and a requester only counts once their signature proves the address.

pub mod error;
pub mod gate;
pub mod policy;
pub mod read;

pub use error::AccessError;
pub use gate::{authorization_message, verify_authorization, AccessGate, Ack};
pub use policy::{AccessAction, AccessConfig, AccessPolicy};
pub use read::{ReadAuthorization, LISTING_SCOPE, READ_AUTHORIZATION_WINDOW_SECS};
