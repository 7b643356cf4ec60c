//! Signed requests for privileged operations.
//!
//! The signature is over
//! [`authorization_message`](docguard_access::authorization_message), so a
//! transport can forward these without being trusted to vouch for `by`.
//! `nonce` is the record's authorization nonce at signing time; each accepted
//! change moves it on, so a request is good for one use.

use docguard_types::{Fingerprint, Signature, SubmitterAddress};
use serde::{Deserialize, Serialize};

/// Grant or revoke `grantee`'s right to read and verify `fingerprint`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedAccessChange {
    pub fingerprint: Fingerprint,
    pub grantee: SubmitterAddress,
    pub by: SubmitterAddress,
    pub nonce: u64,
    pub signature: Signature,
}

/// Hide or unhide `fingerprint` in audit listings. `by` signs with itself as
/// the subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedSuppression {
    pub fingerprint: Fingerprint,
    pub by: SubmitterAddress,
    pub nonce: u64,
    pub signature: Signature,
}
