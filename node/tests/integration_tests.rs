//! End-to-end tests through the node against a real LMDB environment:
//! submission → persistence → verification, access control and audit.

use docguard_access::{
    authorization_message, AccessAction, AccessConfig, AccessError, AccessPolicy, Ack,
    ReadAuthorization, LISTING_SCOPE, READ_AUTHORIZATION_WINDOW_SECS,
};
use docguard_crypto::{fingerprint, IdentityProvider, LocalIdentity};
use docguard_geofence::{FixedLocation, LocationFix};
use docguard_node::{DocGuardNode, NodeConfig, NodeError, SignedAccessChange, SignedSuppression};
use docguard_nullables::NullLocationSource;
use docguard_provenance::{BindError, BindOutcome};
use docguard_types::{GeoPoint, LocationConstraint, Signature, SubmitterAddress, Timestamp};
use docguard_verification::{IndeterminateReason, LocationStatus, VerificationOutcome, VerifyError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config_in(dir: &tempfile::TempDir, policy: AccessPolicy) -> NodeConfig {
    NodeConfig {
        data_dir: dir.path().join("ledger"),
        map_size_mb: 16,
        access: AccessConfig {
            policy,
            delegated_authorities: Vec::new(),
        },
        ..NodeConfig::default()
    }
}

fn open(policy: AccessPolicy) -> (tempfile::TempDir, DocGuardNode) {
    let dir = tempfile::tempdir().expect("temp dir");
    let node = DocGuardNode::open(config_in(&dir, policy)).expect("open node");
    (dir, node)
}

fn identity(seed: u8) -> LocalIdentity {
    LocalIdentity::from_seed(&[seed; 32])
}

fn submit(
    node: &DocGuardNode,
    who: &LocalIdentity,
    doc: &[u8],
    location: Option<LocationConstraint>,
) -> BindOutcome {
    let fp = fingerprint(doc);
    let sig = who.sign_fingerprint(&fp, who.address()).unwrap();
    node.submit(doc, who.address().clone(), sig, location)
        .expect("submit")
}

fn ten_ten() -> LocationConstraint {
    LocationConstraint::new(GeoPoint::new(10.0, 10.0).unwrap(), 100.0).unwrap()
}

/// A change signed over the record's current nonce.
fn access_change(
    node: &DocGuardNode,
    action: AccessAction,
    signer: &LocalIdentity,
    doc: &[u8],
    grantee: &SubmitterAddress,
) -> SignedAccessChange {
    let fp = fingerprint(doc);
    let nonce = node.authorization_nonce(&fp).unwrap();
    let message = authorization_message(action, &fp, grantee, nonce);
    SignedAccessChange {
        fingerprint: fp,
        grantee: grantee.clone(),
        by: signer.address().clone(),
        nonce,
        signature: signer.sign(&message, signer.address()).unwrap(),
    }
}

fn suppression(
    node: &DocGuardNode,
    action: AccessAction,
    signer: &LocalIdentity,
    doc: &[u8],
) -> SignedSuppression {
    let fp = fingerprint(doc);
    let nonce = node.authorization_nonce(&fp).unwrap();
    let message = authorization_message(action, &fp, signer.address(), nonce);
    SignedSuppression {
        fingerprint: fp,
        by: signer.address().clone(),
        nonce,
        signature: signer.sign(&message, signer.address()).unwrap(),
    }
}

fn read_of(who: &LocalIdentity, doc: &[u8]) -> ReadAuthorization {
    ReadAuthorization::sign(who, &fingerprint(doc), Timestamp::now()).unwrap()
}

fn listing_read(who: &LocalIdentity) -> ReadAuthorization {
    ReadAuthorization::sign(who, &LISTING_SCOPE, Timestamp::now()).unwrap()
}

// ---------------------------------------------------------------------------
// 1. Submission and verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitted_bytes_verify_and_altered_bytes_do_not() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let x = identity(1);

    let bound = submit(&node, &x, b"A", None);
    assert!(bound.is_bound());
    assert_eq!(bound.record().fingerprint, fingerprint(b"A"));

    let source = NullLocationSource::denied();
    let verdict = node.verify(b"A", None, &source).await.unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::VerifiedNoLocationRequired);
    assert_eq!(verdict.record.as_ref(), Some(bound.record()));

    let verdict = node.verify(b"B", None, &source).await.unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::NotFound);
    assert!(verdict.record.is_none());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn geofenced_record_checks_the_requester_position() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let x = identity(1);
    submit(&node, &x, b"A", Some(ten_ten()));

    let here = FixedLocation::at(GeoPoint::new(10.0, 10.0).unwrap(), Some(5.0));
    let verdict = node.verify(b"A", None, &here).await.unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::Verified);
    assert_eq!(verdict.location_verified(), Some(true));

    let away = FixedLocation::at(GeoPoint::new(10.045, 10.0).unwrap(), None);
    let verdict = node.verify(b"A", None, &away).await.unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::VerifiedLocationFailed);
    let d = verdict.distance_meters.unwrap();
    assert!((d - 5000.0).abs() < 10.0, "distance {d}");

    let denied = NullLocationSource::denied();
    let verdict = node.verify(b"A", None, &denied).await.unwrap();
    assert_eq!(
        verdict.outcome,
        VerificationOutcome::VerifiedLocationIndeterminate
    );
    assert_eq!(
        verdict.location,
        LocationStatus::Indeterminate(IndeterminateReason::Denied)
    );
    assert!(verdict.record.is_some());
}

#[test]
fn synchronous_verification_uses_the_supplied_fix() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    submit(&node, &identity(1), b"A", Some(ten_ten()));
    let fp = fingerprint(b"A");

    let fix = LocationFix::position(GeoPoint::new(10.0, 10.0).unwrap());
    let verdict = node.verify_fingerprint(fp, None, Some(fix)).unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::Verified);

    let verdict = node.verify_fingerprint(fp, None, None).unwrap();
    assert_eq!(
        verdict.location,
        LocationStatus::Indeterminate(IndeterminateReason::NotProvided)
    );
}

#[test]
fn second_submitter_gets_a_conflict_and_the_first_record_survives() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let x = identity(1);
    let y = identity(2);

    let first = submit(&node, &x, b"A", None);
    let second = submit(&node, &y, b"A", None);

    match &second {
        BindOutcome::Conflict { existing } => assert_eq!(existing, first.record()),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(!second.is_own_prior_submission(y.address()));

    let stored = node.record(&fingerprint(b"A"), None).unwrap().unwrap();
    assert_eq!(stored.submitter, *x.address());
    assert_eq!(node.metrics().conflicts.get(), 1);
    assert_eq!(node.metrics().records_bound.get(), 1);
}

#[test]
fn forged_signature_is_rejected_and_nothing_is_stored() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let x = identity(1);
    let y = identity(2);
    let fp = fingerprint(b"A");
    // Signed by Y but claimed for X.
    let sig = y.sign_fingerprint(&fp, y.address()).unwrap();

    let err = node
        .submit(b"A", x.address().clone(), sig, None)
        .unwrap_err();
    assert!(matches!(err, NodeError::Bind(BindError::Authenticity { .. })));
    assert!(node.record(&fp, None).unwrap().is_none());
    assert_eq!(node.audit_all(None).unwrap().len(), 0);
    assert_eq!(node.metrics().authenticity_rejections.get(), 1);
}

#[test]
fn submitted_content_is_retrievable_by_reference() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let bound = submit(&node, &identity(1), b"scanned deed", None);
    let bytes = node.content(&bound.record().content_ref).unwrap();
    assert_eq!(bytes.as_deref(), Some(&b"scanned deed"[..]));
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let x = identity(1);
    {
        let node = DocGuardNode::open(config_in(&dir, AccessPolicy::PublicRead)).unwrap();
        submit(&node, &x, b"A", None);
    }
    let node = DocGuardNode::open(config_in(&dir, AccessPolicy::PublicRead)).unwrap();
    assert_eq!(node.metrics().record_count.get(), 1);
    let verdict = node.verify_fingerprint(fingerprint(b"A"), None, None).unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::VerifiedNoLocationRequired);
}

// ---------------------------------------------------------------------------
// 2. Access control
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restrictive_policy_gates_verification_on_grants() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let reader = identity(2);
    submit(&node, &owner, b"A", None);
    let source = NullLocationSource::denied();
    let fp = fingerprint(b"A");

    let err = node
        .verify(b"A", Some(&read_of(&reader, b"A")), &source)
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Verify(VerifyError::Unauthorized { .. })));

    let grant = access_change(&node, AccessAction::Grant, &owner, b"A", reader.address());
    assert_eq!(node.grant(&grant).unwrap(), Ack::Applied);
    let again = access_change(&node, AccessAction::Grant, &owner, b"A", reader.address());
    assert_eq!(node.grant(&again).unwrap(), Ack::Unchanged);
    let owner_read = read_of(&owner, b"A");
    assert!(node
        .can_access(&fp, reader.address(), Some(&owner_read))
        .unwrap());
    assert_eq!(
        node.grantees(&fp, Some(&owner_read)).unwrap(),
        vec![reader.address().clone()]
    );

    let verdict = node
        .verify(b"A", Some(&read_of(&reader, b"A")), &source)
        .await
        .unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::VerifiedNoLocationRequired);

    let revoke = access_change(&node, AccessAction::Revoke, &owner, b"A", reader.address());
    assert_eq!(node.revoke(&revoke).unwrap(), Ack::Applied);
    assert!(!node
        .can_access(&fp, reader.address(), Some(&owner_read))
        .unwrap());
    assert_eq!(node.metrics().verify_refusals.get(), 1);
}

#[test]
fn anonymous_and_unproven_readers_are_refused() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let stranger = identity(4);
    submit(&node, &owner, b"A", None);
    let fp = fingerprint(b"A");

    let err = node.record(&fp, None).unwrap_err();
    assert!(matches!(err, NodeError::Verify(VerifyError::Unauthorized { .. })));
    let err = node.verify_fingerprint(fp, None, None).unwrap_err();
    assert!(matches!(err, NodeError::Verify(VerifyError::Unauthorized { .. })));

    // Claiming the owner's address without the owner's key.
    let mut forged = read_of(&stranger, b"A");
    forged.requester = owner.address().clone();
    let err = node.record(&fp, Some(&forged)).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Access(AccessError::BadAuthorization { .. })
    ));

    // A read signed for another document does not carry over.
    let elsewhere = read_of(&owner, b"B");
    assert!(node.record(&fp, Some(&elsewhere)).is_err());

    let stale = ReadAuthorization::sign(
        &owner,
        &fp,
        Timestamp::new(Timestamp::now().as_secs() - READ_AUTHORIZATION_WINDOW_SECS - 60),
    )
    .unwrap();
    assert!(matches!(
        node.record(&fp, Some(&stale)),
        Err(NodeError::Access(AccessError::BadAuthorization { .. }))
    ));

    let err = node.grantees(&fp, None).unwrap_err();
    assert!(matches!(err, NodeError::Verify(VerifyError::Unauthorized { .. })));
    let err = node
        .grantees(&fp, Some(&read_of(&stranger, b"A")))
        .unwrap_err();
    assert!(matches!(err, NodeError::Verify(VerifyError::Unauthorized { .. })));
    assert!(node
        .can_access(&fp, stranger.address(), None)
        .is_err());

    let record = node.record(&fp, Some(&read_of(&owner, b"A"))).unwrap();
    assert_eq!(record.unwrap().submitter, *owner.address());
}

#[test]
fn audit_trail_lists_only_what_the_reader_may_see() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let alice = identity(1);
    let bob = identity(2);
    submit(&node, &alice, b"alice one", None);
    submit(&node, &bob, b"bob one", None);
    submit(&node, &alice, b"alice two", None);

    let anonymous = node.audit_page(0, 10, None).unwrap();
    assert!(anonymous.records.is_empty());
    assert_eq!(anonymous.next_offset, None);
    assert!(node.audit_all(None).unwrap().is_empty());

    let fps = |records: Vec<docguard_types::ProvenanceRecord>| -> Vec<_> {
        records.into_iter().map(|r| r.fingerprint).collect()
    };
    let page = node.audit_page(0, 10, Some(&listing_read(&alice))).unwrap();
    assert_eq!(
        fps(page.records),
        vec![fingerprint(b"alice one"), fingerprint(b"alice two")]
    );

    let grant = access_change(&node, AccessAction::Grant, &alice, b"alice two", bob.address());
    node.grant(&grant).unwrap();
    assert_eq!(
        fps(node.audit_all(Some(&listing_read(&bob))).unwrap()),
        vec![fingerprint(b"bob one"), fingerprint(b"alice two")]
    );

    // A read signed for one record is not a listing read.
    assert!(node
        .audit_page(0, 10, Some(&read_of(&alice, b"alice one")))
        .is_err());
}

#[test]
fn revoked_grant_cannot_be_replayed() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let reader = identity(2);
    submit(&node, &owner, b"A", None);
    let fp = fingerprint(b"A");

    let grant = access_change(&node, AccessAction::Grant, &owner, b"A", reader.address());
    assert_eq!(node.grant(&grant).unwrap(), Ack::Applied);
    let revoke = access_change(&node, AccessAction::Revoke, &owner, b"A", reader.address());
    assert_eq!(node.revoke(&revoke).unwrap(), Ack::Applied);

    let err = node.grant(&grant).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Access(AccessError::BadAuthorization { reason: "stale nonce", .. })
    ));
    assert!(node.revoke(&revoke).is_err());
    assert!(node.record(&fp, Some(&read_of(&reader, b"A"))).is_err());
    assert_eq!(node.authorization_nonce(&fp).unwrap(), 2);
}

#[test]
fn only_the_owner_may_grant() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let intruder = identity(3);
    submit(&node, &owner, b"A", None);

    let change = access_change(&node, AccessAction::Grant, &intruder, b"A", intruder.address());
    let err = node.grant(&change).unwrap_err();
    assert!(matches!(err, NodeError::Access(AccessError::Unauthorized { .. })));
    assert!(!node
        .can_access(&fingerprint(b"A"), intruder.address(), Some(&read_of(&owner, b"A")))
        .unwrap());
    // The refused change did not use up the owner's nonce.
    assert_eq!(node.authorization_nonce(&fingerprint(b"A")).unwrap(), 0);
}

#[test]
fn grant_with_a_bad_authorization_signature_is_refused() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let reader = identity(2);
    submit(&node, &owner, b"A", None);

    let mut change = access_change(&node, AccessAction::Grant, &owner, b"A", reader.address());
    change.signature = Signature([0; 64]);
    let err = node.grant(&change).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Access(AccessError::BadAuthorization { .. })
    ));
    assert!(!node
        .can_access(&fingerprint(b"A"), reader.address(), Some(&read_of(&owner, b"A")))
        .unwrap());
}

#[test]
fn access_check_on_unknown_fingerprint_is_an_error() {
    let (_dir, node) = open(AccessPolicy::SubmitterOnly);
    let owner = identity(1);
    let err = node
        .can_access(&fingerprint(b"never"), owner.address(), Some(&read_of(&owner, b"never")))
        .unwrap_err();
    assert!(matches!(err, NodeError::Access(AccessError::RecordNotFound(_))));
}

// ---------------------------------------------------------------------------
// 3. Audit trail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hidden_records_leave_the_audit_trail_but_still_verify() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let owner = identity(1);
    for doc in [&b"one"[..], b"two", b"three"] {
        submit(&node, &owner, doc, None);
    }

    let page = node.audit_page(0, 10, None).unwrap();
    assert_eq!(page.records.len(), 3);
    assert_eq!(page.records[0].fingerprint, fingerprint(b"one"));
    assert_eq!(page.next_offset, None);

    let hide = suppression(&node, AccessAction::Hide, &owner, b"two");
    assert_eq!(node.hide(&hide).unwrap(), Ack::Applied);
    let hide_again = suppression(&node, AccessAction::Hide, &owner, b"two");
    assert_eq!(node.hide(&hide_again).unwrap(), Ack::Unchanged);

    let visible: Vec<_> = node
        .audit_all(None)
        .unwrap()
        .into_iter()
        .map(|r| r.fingerprint)
        .collect();
    assert_eq!(visible, vec![fingerprint(b"one"), fingerprint(b"three")]);

    let verdict = node
        .verify(b"two", None, &NullLocationSource::denied())
        .await
        .unwrap();
    assert_eq!(verdict.outcome, VerificationOutcome::VerifiedNoLocationRequired);

    let unhide = suppression(&node, AccessAction::Unhide, &owner, b"two");
    assert_eq!(node.unhide(&unhide).unwrap(), Ack::Applied);
    assert_eq!(node.audit_all(None).unwrap().len(), 3);
    assert_eq!(node.status().unwrap().suppressed, 0);

    // The spent hide cannot put the record back out of sight.
    assert!(matches!(
        node.hide(&hide),
        Err(NodeError::Access(AccessError::BadAuthorization { .. }))
    ));
    assert_eq!(node.audit_all(None).unwrap().len(), 3);
}

#[test]
fn strangers_cannot_hide_records() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    submit(&node, &identity(1), b"one", None);
    let err = node
        .hide(&suppression(&node, AccessAction::Hide, &identity(2), b"one"))
        .unwrap_err();
    assert!(matches!(err, NodeError::Access(AccessError::Unauthorized { .. })));
    assert_eq!(node.audit_all(None).unwrap().len(), 1);
}

#[test]
fn concurrent_submissions_of_the_same_bytes_bind_once() {
    let (_dir, node) = open(AccessPolicy::PublicRead);
    let node = std::sync::Arc::new(node);
    let handles: Vec<_> = (1..=8u8)
        .map(|seed| {
            let node = node.clone();
            std::thread::spawn(move || submit(&node, &identity(seed), b"contested", None))
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|o| o.is_bound()).count(), 1);
    assert_eq!(node.status().unwrap().records, 1);
}
