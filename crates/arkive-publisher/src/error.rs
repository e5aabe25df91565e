use arkive_metadata::MetadataError;
use thiserror::Error;

/// Errors surfaced to whatever presents published content.
///
/// Only two outcomes matter to a reader: the resource is missing, or
/// something went wrong on our side.
#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(#[source] MetadataError),

    #[error("resolver error: {0}")]
    Resolver(String),
}

impl From<MetadataError> for PublisherError {
    fn from(err: MetadataError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Internal(err)
        }
    }
}

impl PublisherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

pub type PublisherResult<T> = Result<T, PublisherError>;
