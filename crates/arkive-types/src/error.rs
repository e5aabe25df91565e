use thiserror::Error;

/// Errors produced by type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid checksum {value:?}: {reason}")]
    InvalidChecksum { value: String, reason: String },

    #[error("invalid container name {name:?}: {reason}")]
    InvalidContainerName { name: String, reason: String },

    #[error("invalid object key {key:?}: {reason}")]
    InvalidObjectKey { key: String, reason: String },

    #[error("invalid version id {value:?}")]
    InvalidVersionId { value: String },

    #[error("version is already published")]
    AlreadyPublished,
}
