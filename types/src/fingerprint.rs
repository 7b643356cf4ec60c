//! Content fingerprint type.
//!
//! A fingerprint is the 32-byte digest of a file's raw bytes. It is never
//! trusted as an input on its own: verification always recomputes it from the
//! candidate bytes and only then consults the ledger.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Domain separator prepended to the hex fingerprint before signing.
pub const SIGNING_DOMAIN: &[u8] = b"docguard-fingerprint:";

/// A 32-byte content fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// The all-zero fingerprint, used as a "nothing here" sentinel.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex fingerprint. Accepts an optional `0x` prefix and either case.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        if trimmed.len() != 64 {
            return Err(TypesError::InvalidFingerprint(format!(
                "expected 64 hex characters, got {}",
                trimmed.len()
            )));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut out)
            .map_err(|e| TypesError::InvalidFingerprint(e.to_string()))?;
        Ok(Self(out))
    }

    /// The exact bytes a submitter signs to claim this fingerprint.
    ///
    /// Both the signing side and the binder must use this message; changing it
    /// invalidates every existing signature.
    pub fn signing_message(&self) -> Vec<u8> {
        let hex = self.to_hex();
        let mut msg = Vec::with_capacity(SIGNING_DOMAIN.len() + hex.len());
        msg.extend_from_slice(SIGNING_DOMAIN);
        msg.extend_from_slice(hex.as_bytes());
        msg
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}
