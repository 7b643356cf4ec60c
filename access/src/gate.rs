use docguard_crypto::SignatureVerifier;
use docguard_store::{AccessStore, RecordStore};
use docguard_types::{AccessGrant, Fingerprint, ProvenanceRecord, Signature, SubmitterAddress};
use serde::{Deserialize, Serialize};

use crate::{AccessAction, AccessConfig, AccessError, AccessPolicy};

const AUTHORIZATION_DOMAIN: &[u8] = b"docguard-access:";

/// Acknowledgement of an idempotent write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    /// State changed.
    Applied,
    /// State already matched the request.
    Unchanged,
}

/// Bytes `by` signs to authorize `action` on `fingerprint` for `subject`.
///
/// `nonce` is the record's current authorization nonce for changes, and the
/// issue time in seconds for reads. A change signature is spent once the
/// nonce moves on.
pub fn authorization_message(
    action: AccessAction,
    fingerprint: &Fingerprint,
    subject: &SubmitterAddress,
    nonce: u64,
) -> Vec<u8> {
    let mut msg = AUTHORIZATION_DOMAIN.to_vec();
    msg.extend_from_slice(action.as_str().as_bytes());
    msg.push(b':');
    msg.extend_from_slice(fingerprint.to_hex().as_bytes());
    msg.push(b':');
    msg.extend_from_slice(subject.as_str().as_bytes());
    msg.push(b':');
    msg.extend_from_slice(nonce.to_string().as_bytes());
    msg
}

pub struct AccessGate<'a, R: ?Sized, A: ?Sized> {
    records: &'a R,
    grants: &'a A,
    config: &'a AccessConfig,
}

impl<'a, R, A> AccessGate<'a, R, A>
where
    R: RecordStore + ?Sized,
    A: AccessStore + ?Sized,
{
    pub fn new(records: &'a R, grants: &'a A, config: &'a AccessConfig) -> Self {
        Self {
            records,
            grants,
            config,
        }
    }

    pub fn policy(&self) -> AccessPolicy {
        self.config.policy
    }

    /// Let `grantee` read and verify `fingerprint`. Only the recorded
    /// submitter or a delegated authority may do this.
    pub fn grant(
        &self,
        fingerprint: &Fingerprint,
        grantee: &SubmitterAddress,
        by: &SubmitterAddress,
    ) -> Result<Ack, AccessError> {
        let record = self.lookup(fingerprint)?;
        self.require_authority(&record, by)?;
        let grant = AccessGrant {
            fingerprint: *fingerprint,
            grantee: grantee.clone(),
        };
        let ack = if self.grants.put_grant(&grant)? {
            Ack::Applied
        } else {
            Ack::Unchanged
        };
        tracing::info!(
            fingerprint = %fingerprint,
            grantee = %grantee.short(),
            by = %by.short(),
            ?ack,
            "access granted"
        );
        Ok(ack)
    }

    pub fn revoke(
        &self,
        fingerprint: &Fingerprint,
        grantee: &SubmitterAddress,
        by: &SubmitterAddress,
    ) -> Result<Ack, AccessError> {
        let record = self.lookup(fingerprint)?;
        self.require_authority(&record, by)?;
        let grant = AccessGrant {
            fingerprint: *fingerprint,
            grantee: grantee.clone(),
        };
        let ack = if self.grants.delete_grant(&grant)? {
            Ack::Applied
        } else {
            Ack::Unchanged
        };
        tracing::info!(
            fingerprint = %fingerprint,
            grantee = %grantee.short(),
            by = %by.short(),
            ?ack,
            "access revoked"
        );
        Ok(ack)
    }

    /// Whether `who` may read and verify `fingerprint`. Never writes.
    pub fn can_access(
        &self,
        fingerprint: &Fingerprint,
        who: &SubmitterAddress,
    ) -> Result<bool, AccessError> {
        let record = self.lookup(fingerprint)?;
        self.allows(&record, who)
    }

    /// [`Self::can_access`] for a record already in hand.
    pub fn allows(
        &self,
        record: &ProvenanceRecord,
        who: &SubmitterAddress,
    ) -> Result<bool, AccessError> {
        if self.config.policy == AccessPolicy::PublicRead || self.is_authority(record, who) {
            return Ok(true);
        }
        let grant = AccessGrant {
            fingerprint: record.fingerprint,
            grantee: who.clone(),
        };
        Ok(self.grants.has_grant(&grant)?)
    }

    pub fn grants_for(&self, fingerprint: &Fingerprint) -> Result<Vec<SubmitterAddress>, AccessError> {
        Ok(self.grants.grantees(fingerprint)?)
    }

    /// The recorded submitter or a delegated authority.
    pub fn is_authority(&self, record: &ProvenanceRecord, who: &SubmitterAddress) -> bool {
        &record.submitter == who || self.config.is_delegated_authority(who)
    }

    /// Nonce the next signed change to `fingerprint` must carry.
    pub fn authorization_nonce(&self, fingerprint: &Fingerprint) -> Result<u64, AccessError> {
        self.lookup(fingerprint)?;
        Ok(self.grants.authorization_nonce(fingerprint)?)
    }

    /// Check that `by` administers `fingerprint`, then spend `nonce`.
    ///
    /// The signature over `nonce` must already be verified. A nonce that is
    /// not the current one was spent by an earlier change.
    pub fn redeem(
        &self,
        fingerprint: &Fingerprint,
        by: &SubmitterAddress,
        nonce: u64,
    ) -> Result<ProvenanceRecord, AccessError> {
        let record = self.authorize(fingerprint, by)?;
        if !self.grants.advance_nonce(fingerprint, nonce)? {
            tracing::warn!(
                fingerprint = %fingerprint,
                by = %by.short(),
                nonce,
                "stale authorization refused"
            );
            return Err(AccessError::BadAuthorization {
                by: by.clone(),
                reason: "stale nonce",
            });
        }
        Ok(record)
    }

    /// Look up a record and check that `by` administers it.
    pub fn authorize(
        &self,
        fingerprint: &Fingerprint,
        by: &SubmitterAddress,
    ) -> Result<ProvenanceRecord, AccessError> {
        let record = self.lookup(fingerprint)?;
        self.require_authority(&record, by)?;
        Ok(record)
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Result<ProvenanceRecord, AccessError> {
        match self.records.get(fingerprint)? {
            Some(record) if !record.is_null() => Ok(record),
            _ => Err(AccessError::RecordNotFound(*fingerprint)),
        }
    }

    fn require_authority(
        &self,
        record: &ProvenanceRecord,
        by: &SubmitterAddress,
    ) -> Result<(), AccessError> {
        if self.is_authority(record, by) {
            return Ok(());
        }
        tracing::warn!(
            fingerprint = %record.fingerprint,
            by = %by.short(),
            "unauthorized access change refused"
        );
        Err(AccessError::Unauthorized {
            fingerprint: record.fingerprint,
            by: by.clone(),
        })
    }
}

/// Check that `by` really signed the authorization for `action` at `nonce`.
pub fn verify_authorization<V: SignatureVerifier + ?Sized>(
    verifier: &V,
    action: AccessAction,
    fingerprint: &Fingerprint,
    subject: &SubmitterAddress,
    nonce: u64,
    by: &SubmitterAddress,
    signature: &Signature,
) -> Result<(), AccessError> {
    let message = authorization_message(action, fingerprint, subject, nonce);
    if verifier.verify_signature(&message, signature, by) {
        Ok(())
    } else {
        Err(AccessError::BadAuthorization {
            by: by.clone(),
            reason: "bad signature",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_crypto::{
        fingerprint, sign_message, Ed25519Verifier, LocalIdentity, FINGERPRINT_ALGORITHM,
    };
    use docguard_nullables::NullLedger;
    use docguard_types::{ContentRef, Timestamp};

    struct Fixture {
        ledger: NullLedger,
        owner: LocalIdentity,
        fp: Fingerprint,
    }

    fn fixture() -> Fixture {
        let ledger = NullLedger::new();
        let owner = LocalIdentity::from_seed(&[1; 32]);
        let fp = fingerprint(b"medical report");
        ledger
            .insert_if_absent(ProvenanceRecord {
                fingerprint: fp,
                algorithm: FINGERPRINT_ALGORITHM.to_string(),
                submitter: owner.address().clone(),
                signature: Signature([0; 64]),
                timestamp: Timestamp::new(1),
                content_ref: ContentRef::new("bafy").unwrap(),
                location: None,
                sequence: 0,
            })
            .unwrap();
        Fixture { ledger, owner, fp }
    }

    fn someone(seed: u8) -> SubmitterAddress {
        LocalIdentity::from_seed(&[seed; 32]).address().clone()
    }

    #[test]
    fn grant_is_idempotent() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let grantee = someone(9);
        let owner = f.owner.address();

        assert!(!gate.can_access(&f.fp, &grantee).unwrap());
        assert_eq!(gate.grant(&f.fp, &grantee, owner).unwrap(), Ack::Applied);
        assert_eq!(gate.grant(&f.fp, &grantee, owner).unwrap(), Ack::Unchanged);
        assert!(gate.can_access(&f.fp, &grantee).unwrap());
        assert_eq!(gate.grants_for(&f.fp).unwrap(), vec![grantee.clone()]);

        assert_eq!(gate.revoke(&f.fp, &grantee, owner).unwrap(), Ack::Applied);
        assert_eq!(gate.revoke(&f.fp, &grantee, owner).unwrap(), Ack::Unchanged);
        assert!(!gate.can_access(&f.fp, &grantee).unwrap());
    }

    #[test]
    fn stranger_cannot_grant() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let stranger = someone(7);

        let err = gate.grant(&f.fp, &stranger, &stranger).unwrap_err();
        assert!(matches!(err, AccessError::Unauthorized { .. }));
        assert!(!gate.can_access(&f.fp, &stranger).unwrap());
        assert!(gate.grants_for(&f.fp).unwrap().is_empty());
    }

    #[test]
    fn delegated_authority_may_administer() {
        let f = fixture();
        let authority = someone(5);
        let config = AccessConfig {
            policy: AccessPolicy::SubmitterOnly,
            delegated_authorities: vec![authority.clone()],
        };
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let grantee = someone(6);
        assert_eq!(gate.grant(&f.fp, &grantee, &authority).unwrap(), Ack::Applied);
        assert!(gate.can_access(&f.fp, &authority).unwrap());
    }

    #[test]
    fn submitter_always_has_access() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        assert!(gate.can_access(&f.fp, f.owner.address()).unwrap());
    }

    #[test]
    fn public_read_opens_reads_only() {
        let f = fixture();
        let config = AccessConfig {
            policy: AccessPolicy::PublicRead,
            delegated_authorities: Vec::new(),
        };
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let stranger = someone(7);
        assert!(gate.can_access(&f.fp, &stranger).unwrap());
        assert!(gate.grant(&f.fp, &stranger, &stranger).is_err());
    }

    #[test]
    fn unknown_fingerprint() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let missing = fingerprint(b"never submitted");
        assert!(matches!(
            gate.grant(&missing, &someone(2), f.owner.address()),
            Err(AccessError::RecordNotFound(_))
        ));
        assert!(matches!(
            gate.can_access(&missing, f.owner.address()),
            Err(AccessError::RecordNotFound(_))
        ));
    }

    #[test]
    fn authorization_signature_checked() {
        let f = fixture();
        let grantee = someone(3);
        let msg = authorization_message(AccessAction::Grant, &f.fp, &grantee, 0);
        let sig = sign_message(&msg, &f.owner.keypair().private);
        let check = |action, nonce| {
            verify_authorization(
                &Ed25519Verifier,
                action,
                &f.fp,
                &grantee,
                nonce,
                f.owner.address(),
                &sig,
            )
        };

        assert!(check(AccessAction::Grant, 0).is_ok());
        // Same signature cannot be reused for a revoke or a later nonce.
        assert!(matches!(
            check(AccessAction::Revoke, 0),
            Err(AccessError::BadAuthorization { .. })
        ));
        assert!(matches!(
            check(AccessAction::Grant, 1),
            Err(AccessError::BadAuthorization { .. })
        ));
    }

    #[test]
    fn nonce_spent_once() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);
        let owner = f.owner.address();

        assert_eq!(gate.authorization_nonce(&f.fp).unwrap(), 0);
        gate.redeem(&f.fp, owner, 0).unwrap();
        assert_eq!(gate.authorization_nonce(&f.fp).unwrap(), 1);
        assert!(matches!(
            gate.redeem(&f.fp, owner, 0),
            Err(AccessError::BadAuthorization { reason: "stale nonce", .. })
        ));
        gate.redeem(&f.fp, owner, 1).unwrap();
    }

    #[test]
    fn stranger_cannot_spend_nonce() {
        let f = fixture();
        let config = AccessConfig::default();
        let gate = AccessGate::new(&f.ledger, &f.ledger, &config);

        assert!(matches!(
            gate.redeem(&f.fp, &someone(7), 0),
            Err(AccessError::Unauthorized { .. })
        ));
        assert_eq!(gate.authorization_nonce(&f.fp).unwrap(), 0);
    }
}
