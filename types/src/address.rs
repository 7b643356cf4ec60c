//! Submitter address type with `dgv_` prefix.
//!
//! Layout after the prefix: the 32-byte public key as 52 base32 characters
//! (four zero padding bits at the end), then a 5-byte checksum as 8 more.
//! The alphabet leaves out `0`, `2`, `l` and `v`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// A submitter's public address, always prefixed with `dgv_`.
///
/// This type owns the text layout. The checksum itself is Blake2b and is
/// computed and checked in `docguard_crypto`, so `parse` only checks shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubmitterAddress(String);

impl SubmitterAddress {
    /// The standard prefix for all DocGuard addresses.
    pub const PREFIX: &'static str = "dgv_";
    /// Characters after the prefix: 52 for the public key, 8 for the checksum.
    pub const ENCODED_LEN: usize = 60;
    /// Characters used by the public-key portion of the encoding.
    pub const PUBKEY_CHARS: usize = 52;
    pub const CHECKSUM_BYTES: usize = 5;

    /// Parse an address string, checking prefix, length and alphabet.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let Some(encoded) = s.strip_prefix(Self::PREFIX) else {
            return Err(TypesError::InvalidAddress(format!("missing {} prefix", Self::PREFIX)));
        };
        if encoded.len() != Self::ENCODED_LEN {
            return Err(TypesError::InvalidAddress(format!(
                "expected {} characters after prefix, got {}",
                Self::ENCODED_LEN,
                encoded.len()
            )));
        }
        if let Some(bad) = encoded.chars().find(|&c| symbol_value(c).is_none()) {
            return Err(TypesError::InvalidAddress(format!("invalid character '{bad}'")));
        }
        Ok(Self(s))
    }

    /// Lay out a public key and its checksum as an address. Any pair of
    /// inputs gives a well-formed address; whether the checksum is right is
    /// the caller's concern.
    pub fn encode(public_key: &[u8; 32], checksum: &[u8; Self::CHECKSUM_BYTES]) -> Self {
        let mut s = String::with_capacity(Self::PREFIX.len() + Self::ENCODED_LEN);
        s.push_str(Self::PREFIX);
        push_symbols(&mut s, public_key);
        push_symbols(&mut s, checksum);
        Self(s)
    }

    /// The public key and checksum this address carries.
    ///
    /// Padding bits are dropped, so two addresses that differ only there
    /// decode alike; compare against [`Self::encode`] to insist on one form.
    pub fn key_and_checksum(&self) -> ([u8; 32], [u8; Self::CHECKSUM_BYTES]) {
        let body = &self.0[Self::PREFIX.len()..];
        let (key, checksum) = body.split_at(Self::PUBKEY_CHARS);
        (read_symbols(key), read_symbols(checksum))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the null address (all-zero public key).
    ///
    /// Ledgers use the null address as the sentinel for "nothing recorded";
    /// a record carrying it must be treated as absent.
    pub fn is_null(&self) -> bool {
        self.key_and_checksum().0 == [0u8; 32]
    }

    /// Shortened form for display, e.g. `dgv_3abc...wxyz`.
    pub fn short(&self) -> String {
        let s = &self.0;
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    }
}

/// 5-bit value of an alphabet character.
fn symbol_value(c: char) -> Option<u8> {
    let c = u8::try_from(c).ok()?;
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Append `bytes` as base32, most significant bit first, zero padded.
fn push_symbols(out: &mut String, bytes: &[u8]) {
    let mut pending: u16 = 0;
    let mut bits = 0u32;
    for &byte in bytes {
        pending = (pending << 8) | u16::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(char::from(ALPHABET[usize::from((pending >> bits) & 0x1f)]));
        }
        pending &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(char::from(ALPHABET[usize::from((pending << (5 - bits)) & 0x1f)]));
    }
}

/// Inverse of [`push_symbols`] for text `parse` already accepted.
fn read_symbols<const N: usize>(text: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let mut filled = 0;
    let mut pending: u16 = 0;
    let mut bits = 0u32;
    for c in text.chars() {
        pending = (pending << 5) | u16::from(symbol_value(c).unwrap_or(0));
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if filled < N {
                out[filled] = (pending >> bits) as u8;
                filled += 1;
            }
            pending &= (1 << bits) - 1;
        }
    }
    out
}

impl fmt::Display for SubmitterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmitterAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SubmitterAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<SubmitterAddress> for String {
    fn from(a: SubmitterAddress) -> Self {
        a.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(body_char: char) -> String {
        format!("dgv_{}{}", body_char.to_string().repeat(52), "3".repeat(8))
    }

    #[test]
    fn parse_accepts_well_formed() {
        let a = SubmitterAddress::parse(sample('k')).unwrap();
        assert_eq!(a.as_str().len(), 64);
        assert!(!a.is_null());
    }

    #[test]
    fn null_address_detected() {
        let a = SubmitterAddress::parse(sample('1')).unwrap();
        assert!(a.is_null());
    }

    #[test]
    fn wrong_prefix_rejected() {
        let raw = sample('k').replacen("dgv_", "xyz_", 1);
        assert!(SubmitterAddress::parse(raw).is_err());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(SubmitterAddress::parse("dgv_short").is_err());
        assert!(SubmitterAddress::parse("dgv_").is_err());
    }

    #[test]
    fn ambiguous_characters_rejected() {
        // '0', '2', 'l' and 'v' are not in the alphabet.
        for bad in ['0', '2', 'l', 'v'] {
            assert!(SubmitterAddress::parse(sample(bad)).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let json = format!("\"{}\"", sample('k'));
        let a: SubmitterAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), json);
        assert!(serde_json::from_str::<SubmitterAddress>("\"nope\"").is_err());
    }

    #[test]
    fn encoding_is_fixed_width() {
        let a = SubmitterAddress::encode(&[0xff; 32], &[0xff; 5]);
        assert_eq!(a.as_str().len(), 64);
        assert!(SubmitterAddress::parse(a.as_str()).is_ok());
        assert_eq!(&a.as_str()[4..56], "z".repeat(51) + "i");

        let null = SubmitterAddress::encode(&[0; 32], &[0; 5]);
        assert_eq!(null.as_str(), sample('1').replace('3', "1"));
        assert!(null.is_null());
    }

    #[test]
    fn padding_bits_do_not_reach_the_key() {
        // 'k' is 18: its low four bits fall in the padding.
        let a = SubmitterAddress::parse(sample('k')).unwrap();
        let (key, _) = a.key_and_checksum();
        let canonical = SubmitterAddress::encode(&key, &a.key_and_checksum().1);
        assert_ne!(canonical, a);
        assert_eq!(canonical.key_and_checksum(), a.key_and_checksum());
    }

    #[test]
    fn short_form() {
        let a = SubmitterAddress::parse(sample('k')).unwrap();
        assert_eq!(a.short(), "dgv_kkkk...3333");
    }
}
