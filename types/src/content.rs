//! Reference to where a file's bytes are retrievably stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// An opaque content-location reference (an IPFS CID, a `b2:<hex>` key in the
/// local content store, a URL...).
///
/// The core never derives trust from the referenced bytes; it only records the
/// reference so a verifier can fetch the original later.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentRef(String);

impl ContentRef {
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypesError::EmptyContentRef);
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentRef {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentRef> for String {
    fn from(c: ContentRef) -> Self {
        c.0
    }
}
