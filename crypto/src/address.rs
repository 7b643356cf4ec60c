//! Binding between a public key and its `dgv_` address.
//!
//! [`SubmitterAddress`] lays the bytes out as text. This module supplies the
//! checksum, the first five bytes of Blake2b-256 over the key, and refuses
//! any address that is not exactly what the key derives to.

use docguard_types::{PublicKey, SubmitterAddress};

use crate::blake2b_256;

const CHECKSUM_BYTES: usize = SubmitterAddress::CHECKSUM_BYTES;

fn checksum(public_key: &[u8; 32]) -> [u8; CHECKSUM_BYTES] {
    let digest = blake2b_256(public_key);
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&digest[..CHECKSUM_BYTES]);
    out
}

/// The address a submitter with this key signs as.
pub fn derive_address(public_key: &PublicKey) -> SubmitterAddress {
    let key = public_key.as_bytes();
    SubmitterAddress::encode(key, &checksum(key))
}

/// Public key behind an address.
///
/// `None` when the checksum is wrong or the padding bits are set: only the
/// derived form of a key names that key.
pub fn public_key_of(address: &SubmitterAddress) -> Option<PublicKey> {
    let (key, _) = address.key_and_checksum();
    let candidate = PublicKey(key);
    (derive_address(&candidate) == *address).then_some(candidate)
}

/// Public key bytes of an address string, if it is well formed and checks out.
pub fn decode_address(address: &str) -> Option<[u8; 32]> {
    let address = SubmitterAddress::parse(address).ok()?;
    public_key_of(&address).map(|key| *key.as_bytes())
}

pub fn validate_address(address: &str) -> bool {
    decode_address(address).is_some()
}
