//! Signed read requests.
//!
//! Under [`AccessPolicy::SubmitterOnly`](crate::AccessPolicy) a reader has
//! to prove they hold the key behind the address they claim. The proof is a
//! signature over the fingerprint being read and the time it was made.

use docguard_crypto::{IdentityError, IdentityProvider, SignatureVerifier};
use docguard_types::{Fingerprint, Signature, SubmitterAddress, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{authorization_message, AccessAction, AccessError};

/// How far `issued_at` may sit from the checking clock, either way.
pub const READ_AUTHORIZATION_WINDOW_SECS: u64 = 300;

/// Scope signed for reads that span records, such as the audit trail.
pub const LISTING_SCOPE: Fingerprint = Fingerprint::ZERO;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAuthorization {
    pub requester: SubmitterAddress,
    pub issued_at: Timestamp,
    pub signature: Signature,
}

impl ReadAuthorization {
    pub fn message(
        scope: &Fingerprint,
        requester: &SubmitterAddress,
        issued_at: Timestamp,
    ) -> Vec<u8> {
        authorization_message(AccessAction::Read, scope, requester, issued_at.as_secs())
    }

    /// Sign a read of `scope` as the identity's own account.
    pub fn sign<I: IdentityProvider + ?Sized>(
        identity: &I,
        scope: &Fingerprint,
        issued_at: Timestamp,
    ) -> Result<Self, IdentityError> {
        let requester = identity.request_account();
        let signature = identity.sign(&Self::message(scope, &requester, issued_at), &requester)?;
        Ok(Self {
            requester,
            issued_at,
            signature,
        })
    }

    /// The requester, once the signature covers `scope` and was made within
    /// the window around `now`.
    pub fn authenticate<V: SignatureVerifier + ?Sized>(
        &self,
        verifier: &V,
        scope: &Fingerprint,
        now: Timestamp,
    ) -> Result<&SubmitterAddress, AccessError> {
        let skew = self
            .issued_at
            .elapsed_since(now)
            .max(now.elapsed_since(self.issued_at));
        if skew > READ_AUTHORIZATION_WINDOW_SECS {
            return Err(AccessError::BadAuthorization {
                by: self.requester.clone(),
                reason: "read authorization expired",
            });
        }
        let message = Self::message(scope, &self.requester, self.issued_at);
        if !verifier.verify_signature(&message, &self.signature, &self.requester) {
            return Err(AccessError::BadAuthorization {
                by: self.requester.clone(),
                reason: "bad signature",
            });
        }
        Ok(&self.requester)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_crypto::{fingerprint, Ed25519Verifier, LocalIdentity};

    fn now() -> Timestamp {
        Timestamp::new(1_800_000_000)
    }

    #[test]
    fn signed_read_names_its_signer() {
        let reader = LocalIdentity::from_seed(&[4; 32]);
        let fp = fingerprint(b"lease");
        let auth = ReadAuthorization::sign(&reader, &fp, now()).unwrap();
        assert_eq!(
            auth.authenticate(&Ed25519Verifier, &fp, now()).unwrap(),
            reader.address()
        );
    }

    #[test]
    fn claimed_address_without_its_key_is_refused() {
        let reader = LocalIdentity::from_seed(&[4; 32]);
        let owner = LocalIdentity::from_seed(&[1; 32]);
        let fp = fingerprint(b"lease");
        let mut auth = ReadAuthorization::sign(&reader, &fp, now()).unwrap();
        auth.requester = owner.address().clone();
        assert!(matches!(
            auth.authenticate(&Ed25519Verifier, &fp, now()),
            Err(AccessError::BadAuthorization { reason: "bad signature", .. })
        ));
    }

    #[test]
    fn read_is_scoped_to_one_fingerprint() {
        let reader = LocalIdentity::from_seed(&[4; 32]);
        let auth = ReadAuthorization::sign(&reader, &fingerprint(b"lease"), now()).unwrap();
        assert!(auth
            .authenticate(&Ed25519Verifier, &fingerprint(b"will"), now())
            .is_err());
        assert!(auth
            .authenticate(&Ed25519Verifier, &LISTING_SCOPE, now())
            .is_err());
    }

    #[test]
    fn window_applies_both_ways() {
        let reader = LocalIdentity::from_seed(&[4; 32]);
        let fp = fingerprint(b"lease");
        let auth = ReadAuthorization::sign(&reader, &fp, now()).unwrap();
        let late = Timestamp::new(now().as_secs() + READ_AUTHORIZATION_WINDOW_SECS + 1);
        let early = Timestamp::new(now().as_secs() - READ_AUTHORIZATION_WINDOW_SECS - 1);
        let edge = Timestamp::new(now().as_secs() + READ_AUTHORIZATION_WINDOW_SECS);

        assert!(auth.authenticate(&Ed25519Verifier, &fp, edge).is_ok());
        assert!(matches!(
            auth.authenticate(&Ed25519Verifier, &fp, late),
            Err(AccessError::BadAuthorization { reason: "read authorization expired", .. })
        ));
        assert!(auth.authenticate(&Ed25519Verifier, &fp, early).is_err());
        assert!(auth.authenticate(&Ed25519Verifier, &fp, Timestamp::EPOCH).is_err());
    }
}
