//! Validated names for containers and objects.
//!
//! Container names:
//! - Must be non-empty and at most [`MAX_CONTAINER_NAME_LEN`] bytes
//! - Must not contain `/` or control characters
//! - Must not be `.` or `..`
//!
//! Object keys are path-like:
//! - Must be non-empty and at most [`MAX_OBJECT_KEY_LEN`] bytes
//! - Must not contain control characters
//! - Must not start with `/`
//! - Segments between slashes must be non-empty and must not be `.` or `..`

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

pub const MAX_CONTAINER_NAME_LEN: usize = 255;
pub const MAX_OBJECT_KEY_LEN: usize = 1024;

/// Name of a container, the top-level namespace.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_container_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_container_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidContainerName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("container name must not be empty".into()));
    }
    if name.len() > MAX_CONTAINER_NAME_LEN {
        return Err(invalid(format!(
            "longer than {MAX_CONTAINER_NAME_LEN} bytes"
        )));
    }
    if name == "." || name == ".." {
        return Err(invalid("must not be '.' or '..'".into()));
    }
    if let Some(ch) = name.chars().find(|c| *c == '/' || c.is_control()) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}

/// Key of an object within a version: an opaque, path-like string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        validate_object_key(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment of the key (`"a/b/c.txt"` → `"c.txt"`).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

fn validate_object_key(key: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidObjectKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("object key must not be empty".into()));
    }
    if key.len() > MAX_OBJECT_KEY_LEN {
        return Err(invalid(format!("longer than {MAX_OBJECT_KEY_LEN} bytes")));
    }
    if let Some(ch) = key.chars().find(|c| c.is_control()) {
        return Err(invalid(format!("contains control character: {ch:?}")));
    }
    if key.starts_with('/') {
        return Err(invalid("must not start with '/'".into()));
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return Err(invalid("path segments must not be empty".into()));
        }
        if segment == "." || segment == ".." {
            return Err(invalid(format!("segment must not be {segment:?}")));
        }
    }
    Ok(())
}

macro_rules! string_newtype_impls {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "({:?})"), self.0)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = TypeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = TypeError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_newtype_impls!(ContainerName);
string_newtype_impls!(ObjectKey);
