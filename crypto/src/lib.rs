//! Cryptographic primitives for DocGuard.
//!
//! - **Blake2b-256** content fingerprints (the fingerprint engine)
//! - **Ed25519** for signing and signature verification
//! - Address derivation with `dgv_` prefix and base32 encoding
//! - A local identity provider that signs on behalf of one key pair

pub mod address;
pub mod fingerprint;
pub mod hash;
pub mod identity;
pub mod keys;
pub mod sign;

pub use address::{decode_address, derive_address, public_key_of, validate_address};
pub use fingerprint::{
    fingerprint, fingerprint_file, fingerprint_many, fingerprint_reader, FINGERPRINT_ALGORITHM,
};
pub use hash::{blake2b_256, blake2b_256_multi};
pub use identity::{Ed25519Verifier, IdentityError, IdentityProvider, LocalIdentity, SignatureVerifier};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
