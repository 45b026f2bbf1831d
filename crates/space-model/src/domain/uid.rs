use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Unique identifier of a resource claim.
///
/// The uid is the only key used for claim locking, backing namespace labeling
/// and CDI spec naming. It is stable for the claim lifetime and never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimUid(String);

impl ClaimUid {
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClaimUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClaimUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClaimUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ClaimUid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClaimUid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
