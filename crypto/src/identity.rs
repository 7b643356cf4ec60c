//! Identity provider seam.
//!
//! The binder never reimplements signature checking: it calls a
//! [`SignatureVerifier`]. Signing happens on the submitter's side through an
//! [`IdentityProvider`] (a wallet in production, [`LocalIdentity`] in the CLI
//! and in tests).

use docguard_types::{Fingerprint, KeyPair, PrivateKey, Signature, SubmitterAddress};
use thiserror::Error;

use crate::{derive_address, keypair_from_private, public_key_of, sign_message, verify_signature};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("account {0} is not managed by this identity provider")]
    UnknownAccount(String),

    #[error("signing request was rejected: {0}")]
    Rejected(String),
}

/// Verification primitive exposed by the identity provider.
pub trait SignatureVerifier {
    /// Whether `signature` over `message` was produced by the key behind `address`.
    fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        address: &SubmitterAddress,
    ) -> bool;
}

/// Account access and signing, as offered by a wallet.
pub trait IdentityProvider {
    /// The account this provider signs for.
    fn request_account(&self) -> SubmitterAddress;

    /// Sign `message` as `address`.
    fn sign(&self, message: &[u8], address: &SubmitterAddress) -> Result<Signature, IdentityError>;

    /// Sign the canonical claim message for a fingerprint.
    fn sign_fingerprint(
        &self,
        fingerprint: &Fingerprint,
        address: &SubmitterAddress,
    ) -> Result<Signature, IdentityError> {
        self.sign(&fingerprint.signing_message(), address)
    }
}

/// Ed25519 verification against the public key encoded in the address.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify_signature(
        &self,
        message: &[u8],
        signature: &Signature,
        address: &SubmitterAddress,
    ) -> bool {
        match public_key_of(address) {
            Some(pk) => verify_signature(message, signature, &pk),
            None => false,
        }
    }
}

/// An identity backed by a single in-process key pair.
pub struct LocalIdentity {
    keypair: KeyPair,
    address: SubmitterAddress,
}

impl LocalIdentity {
    pub fn new(keypair: KeyPair) -> Self {
        let address = derive_address(&keypair.public);
        Self { keypair, address }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(keypair_from_private(PrivateKey(*seed)))
    }

    pub fn generate() -> std::io::Result<Self> {
        Ok(Self::new(crate::generate_keypair()?))
    }

    pub fn address(&self) -> &SubmitterAddress {
        &self.address
    }

    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

impl IdentityProvider for LocalIdentity {
    fn request_account(&self) -> SubmitterAddress {
        self.address.clone()
    }

    fn sign(&self, message: &[u8], address: &SubmitterAddress) -> Result<Signature, IdentityError> {
        if address != &self.address {
            return Err(IdentityError::UnknownAccount(address.to_string()));
        }
        Ok(sign_message(message, &self.keypair.private))
    }
}
