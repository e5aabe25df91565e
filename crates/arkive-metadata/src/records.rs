use arkive_types::{ContainerName, VersionId, VersionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A container as seen by management callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub name: ContainerName,
    pub created_at: DateTime<Utc>,
}

/// A version and its lifecycle stamps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: VersionId,
    pub state: VersionState,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }
}

/// One window of a published version's object listing, with the total it
/// was cut from. Both halves come from the same consistent read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectWindow {
    pub total: u64,
    pub keys: Vec<arkive_types::ObjectKey>,
}
