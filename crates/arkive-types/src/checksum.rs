use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest checksum string accepted, in bytes.
pub const MAX_CHECKSUM_LEN: usize = 256;

/// Content hash identifying a blob.
///
/// The checksum is the blob's primary identity and the key objects use to
/// reference it. The repository treats it as opaque: any digest algorithm
/// works as long as its textual form sticks to ASCII alphanumerics plus
/// `-`, `_` and `:` (so `sha256:ab12…` is accepted as well as bare hex).
/// Case is preserved and significant.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Validate and wrap a checksum string.
    pub fn new(value: impl Into<String>) -> Result<Self, TypeError> {
        let value = value.into();
        validate(&value)?;
        Ok(Self(value))
    }

    /// Compute the checksum of raw content (BLAKE3, lowercase hex).
    pub fn compute(data: &[u8]) -> Self {
        Self(hex::encode(blake3::hash(data).as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display (first 12 characters).
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

fn validate(value: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidChecksum {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("checksum must not be empty"));
    }
    if value.len() > MAX_CHECKSUM_LEN {
        return Err(invalid("checksum is too long"));
    }
    if let Some(ch) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')))
    {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", self.short())
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Checksum {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Checksum {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Checksum {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Checksum> for String {
    fn from(checksum: Checksum) -> Self {
        checksum.0
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Checksum {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Checksum {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Checksum {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEADBEEF: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

    #[test]
    fn accepts_hex_digest() {
        let c = Checksum::new(DEADBEEF).unwrap();
        assert_eq!(c.as_str(), DEADBEEF);
        assert_eq!(c, DEADBEEF);
    }

    #[test]
    fn accepts_algorithm_prefix() {
        assert!(Checksum::new("sha256:abcdef0123").is_ok());
        assert!(Checksum::new("blake3-ABCDEF").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Checksum::new(""),
            Err(TypeError::InvalidChecksum { .. })
        ));
    }

    #[test]
    fn rejects_path_characters() {
        assert!(Checksum::new("../etc/passwd").is_err());
        assert!(Checksum::new("abc def").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let long = "a".repeat(MAX_CHECKSUM_LEN + 1);
        assert!(Checksum::new(long).is_err());
    }

    #[test]
    fn compute_is_deterministic_hex() {
        let a = Checksum::compute(b"hello world");
        let b = Checksum::compute(b"hello world");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, Checksum::compute(b"hello world!"));
    }

    #[test]
    fn short_form() {
        let c = Checksum::new(DEADBEEF).unwrap();
        assert_eq!(c.short(), "deadbeefdead");
        assert_eq!(Checksum::new("abc").unwrap().short(), "abc");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let c = Checksum::new(DEADBEEF).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{DEADBEEF}\""));
        let parsed: Checksum = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn serde_rejects_invalid() {
        let parsed: Result<Checksum, _> = serde_json::from_str("\"not valid!\"");
        assert!(parsed.is_err());
    }
}
