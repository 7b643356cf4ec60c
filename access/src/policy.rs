use serde::{Deserialize, Serialize};
use std::fmt;

use docguard_types::SubmitterAddress;

/// Who may read and verify a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// The submitter, delegated authorities and explicit grantees only.
    #[default]
    SubmitterOnly,
    /// Anyone. Grant and revoke stay restricted.
    PublicRead,
}

/// Gate configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub policy: AccessPolicy,
    /// Addresses allowed to administer access for every record.
    #[serde(default)]
    pub delegated_authorities: Vec<SubmitterAddress>,
}

impl AccessConfig {
    pub fn is_delegated_authority(&self, who: &SubmitterAddress) -> bool {
        self.delegated_authorities.iter().any(|a| a == who)
    }
}

/// Operations a caller signs for. `Read` proves who is asking; the rest
/// are owner-only changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    Read,
    Grant,
    Revoke,
    Hide,
    Unhide,
}

impl AccessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Read => "read",
            AccessAction::Grant => "grant",
            AccessAction::Revoke => "revoke",
            AccessAction::Hide => "hide",
            AccessAction::Unhide => "unhide",
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
