use std::fmt;

use arkive_types::{Checksum, TypeError};

/// Kind of entity a lookup failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    Container,
    Version,
    Object,
    Blob,
    /// An object reached through a published version (the reader's view).
    PublishedObject,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Container => "container",
            Self::Version => "version",
            Self::Object => "object",
            Self::Blob => "blob",
            Self::PublishedObject => "published object",
        };
        f.write_str(name)
    }
}

/// Errors from metadata repository operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// A named entity does not resolve.
    #[error("{entity} not found: {name}")]
    NotFound { entity: Entity, name: String },

    /// A unique name is already taken.
    #[error("{entity} already exists: {name}")]
    AlreadyExists { entity: Entity, name: String },

    /// The version has already made its one-way transition.
    #[error("version already published: {name}")]
    AlreadyPublished { name: String },

    /// An object tried to reference a blob that was never created.
    #[error("blob {0} does not exist; create the blob before referencing it")]
    DanglingBlob(Checksum),

    /// A name or checksum failed validation.
    #[error("invalid input: {0}")]
    Invalid(#[from] TypeError),

    /// Reading or writing the snapshot file failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Anything else: poisoned locks, corrupt state.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl MetadataError {
    pub(crate) fn not_found(entity: Entity, name: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            name: name.to_string(),
        }
    }

    pub(crate) fn already_exists(entity: Entity, name: impl fmt::Display) -> Self {
        Self::AlreadyExists {
            entity,
            name: name.to_string(),
        }
    }

    /// Whether this is the distinguished "missing resource" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a referential-integrity failure (blob must be created first).
    pub fn is_dangling_blob(&self) -> bool {
        matches!(self, Self::DanglingBlob(_))
    }
}

/// Result alias for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;
