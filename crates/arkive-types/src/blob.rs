use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;

/// Metadata row for a content-addressed blob.
///
/// The bytes themselves live in an external byte store; this record only
/// carries what the archive needs to describe them. Rows are shared: any
/// number of objects, across containers and versions, may point at one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    pub checksum: Checksum,
    pub size: u64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

impl BlobRecord {
    pub fn new(
        checksum: Checksum,
        size: u64,
        mime_type: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            checksum,
            size,
            mime_type: mime_type.into(),
            created_at,
        }
    }
}
