use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Timestamp layout used for allocated version ids.
pub const VERSION_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Identifier of a version, unique within its container.
///
/// Ids are allocated by the repository from its clock as a UTC timestamp
/// (`YYYYMMDDHHMMSS`); when two versions of one container land on the same
/// second the later one carries a `-N` suffix. Parsed ids only need to be
/// non-empty ASCII alphanumerics, `-`, `_` or `.`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId(String);

impl VersionId {
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        let valid = !value.is_empty()
            && value.len() <= 128
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(TypeError::InvalidVersionId { value });
        }
        Ok(Self(value))
    }

    /// Id derived from an allocation instant.
    pub fn from_timestamp(at: DateTime<Utc>) -> Self {
        Self(at.format(VERSION_ID_FORMAT).to_string())
    }

    /// The same id disambiguated with a numeric suffix.
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({})", self.0)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for VersionId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VersionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for VersionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Lifecycle state of a version.
///
/// A version is born [`Draft`](VersionState::Draft) and may move to
/// [`Published`](VersionState::Published) exactly once. There is no way back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    #[default]
    Draft,
    Published,
}

impl VersionState {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }

    /// Apply the Draft → Published transition.
    pub fn publish(&mut self) -> Result<(), TypeError> {
        match self {
            Self::Draft => {
                *self = Self::Published;
                Ok(())
            }
            Self::Published => Err(TypeError::AlreadyPublished),
        }
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => f.write_str("draft"),
            Self::Published => f.write_str("published"),
        }
    }
}
