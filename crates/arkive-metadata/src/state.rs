//! The catalog tables and the rules that mutate them.
//!
//! [`CatalogState`] is plain data: containers own versions, versions own an
//! object table, and blobs sit in a separate global table keyed by checksum.
//! Every mutating method checks all of its preconditions before touching
//! anything, so a failed call leaves the state exactly as it was.

use std::collections::BTreeMap;

use arkive_types::{BlobRecord, Checksum, Clock, ContainerName, ObjectKey, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Entity, MetadataError, MetadataResult};
use crate::records::{ContainerRecord, ObjectWindow, VersionRecord};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct CatalogState {
    containers: BTreeMap<ContainerName, ContainerRow>,
    blobs: BTreeMap<Checksum, BlobRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ContainerRow {
    created_at: DateTime<Utc>,
    /// Creation order; backs every version listing.
    versions: Vec<VersionRow>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct VersionRow {
    record: VersionRecord,
    objects: BTreeMap<ObjectKey, Checksum>,
}

fn version_path(container: &ContainerName, version: &VersionId) -> String {
    format!("{container}/{version}")
}

fn object_path(container: &ContainerName, version: &VersionId, key: &ObjectKey) -> String {
    format!("{container}/{version}/{key}")
}

impl ContainerRow {
    fn version(&self, id: &VersionId) -> Option<&VersionRow> {
        self.versions.iter().find(|v| &v.record.id == id)
    }

    fn version_mut(&mut self, id: &VersionId) -> Option<&mut VersionRow> {
        self.versions.iter_mut().find(|v| &v.record.id == id)
    }
}

impl CatalogState {
    fn container(&self, name: &ContainerName) -> MetadataResult<&ContainerRow> {
        self.containers
            .get(name)
            .ok_or_else(|| MetadataError::not_found(Entity::Container, name))
    }

    fn version(&self, container: &ContainerName, id: &VersionId) -> MetadataResult<&VersionRow> {
        self.container(container)?
            .version(id)
            .ok_or_else(|| MetadataError::not_found(Entity::Version, version_path(container, id)))
    }

    fn version_mut(
        &mut self,
        container: &ContainerName,
        id: &VersionId,
    ) -> MetadataResult<&mut VersionRow> {
        self.containers
            .get_mut(container)
            .ok_or_else(|| MetadataError::not_found(Entity::Container, container))?
            .version_mut(id)
            .ok_or_else(|| MetadataError::not_found(Entity::Version, version_path(container, id)))
    }

    // ---- Containers ----

    pub(crate) fn create_container(
        &mut self,
        name: &ContainerName,
        clock: &dyn Clock,
    ) -> MetadataResult<()> {
        if self.containers.contains_key(name) {
            return Err(MetadataError::already_exists(Entity::Container, name));
        }
        self.containers.insert(
            name.clone(),
            ContainerRow {
                created_at: clock.now(),
                versions: Vec::new(),
            },
        );
        Ok(())
    }

    pub(crate) fn list_containers(&self) -> Vec<ContainerName> {
        self.containers.keys().cloned().collect()
    }

    pub(crate) fn get_container(&self, name: &ContainerName) -> MetadataResult<ContainerRecord> {
        let row = self.container(name)?;
        Ok(ContainerRecord {
            name: name.clone(),
            created_at: row.created_at,
        })
    }

    /// Remove a container with all of its versions and objects. Blobs stay.
    /// Returns the number of versions removed alongside it.
    pub(crate) fn delete_container(&mut self, name: &ContainerName) -> MetadataResult<usize> {
        self.containers
            .remove(name)
            .map(|row| row.versions.len())
            .ok_or_else(|| MetadataError::not_found(Entity::Container, name))
    }

    // ---- Versions ----

    /// Allocate a new Draft version. The id comes from the clock; a clash
    /// with an existing id in the same container gets a `-N` suffix.
    pub(crate) fn create_version(
        &mut self,
        container: &ContainerName,
        clock: &dyn Clock,
    ) -> MetadataResult<VersionId> {
        let row = self
            .containers
            .get_mut(container)
            .ok_or_else(|| MetadataError::not_found(Entity::Container, container))?;

        let now = clock.now();
        let base = VersionId::from_timestamp(now);
        let mut id = base.clone();
        let mut suffix = 0u32;
        while row.version(&id).is_some() {
            suffix += 1;
            id = base.with_suffix(suffix);
        }

        row.versions.push(VersionRow {
            record: VersionRecord {
                id: id.clone(),
                state: Default::default(),
                created_at: now,
                published_at: None,
            },
            objects: BTreeMap::new(),
        });
        Ok(id)
    }

    pub(crate) fn get_version(
        &self,
        container: &ContainerName,
        id: &VersionId,
    ) -> MetadataResult<VersionRecord> {
        Ok(self.version(container, id)?.record.clone())
    }

    pub(crate) fn list_all_versions(
        &self,
        container: &ContainerName,
    ) -> MetadataResult<Vec<VersionId>> {
        Ok(self
            .container(container)?
            .versions
            .iter()
            .map(|v| v.record.id.clone())
            .collect())
    }

    pub(crate) fn list_published_versions(
        &self,
        container: &ContainerName,
    ) -> MetadataResult<Vec<VersionId>> {
        Ok(self
            .container(container)?
            .versions
            .iter()
            .filter(|v| v.record.is_published())
            .map(|v| v.record.id.clone())
            .collect())
    }

    pub(crate) fn mark_version_published(
        &mut self,
        container: &ContainerName,
        id: &VersionId,
        clock: &dyn Clock,
    ) -> MetadataResult<()> {
        let row = self.version_mut(container, id)?;
        row.record
            .state
            .publish()
            .map_err(|_| MetadataError::AlreadyPublished {
                name: version_path(container, id),
            })?;
        row.record.published_at = Some(clock.now());
        Ok(())
    }

    // ---- Objects ----

    pub(crate) fn create_object(
        &mut self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<()> {
        let blob_known = self.blobs.contains_key(checksum);
        let row = self.version_mut(container, version)?;
        if row.objects.contains_key(key) {
            return Err(MetadataError::already_exists(
                Entity::Object,
                object_path(container, version, key),
            ));
        }
        if !blob_known {
            return Err(MetadataError::DanglingBlob(checksum.clone()));
        }
        row.objects.insert(key.clone(), checksum.clone());
        Ok(())
    }

    /// Point an existing object at another blob. Returns the checksum it
    /// referenced before.
    pub(crate) fn remap_object(
        &mut self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<Checksum> {
        let blob_known = self.blobs.contains_key(checksum);
        let row = self.version_mut(container, version)?;
        let slot = row.objects.get_mut(key).ok_or_else(|| {
            MetadataError::not_found(Entity::Object, object_path(container, version, key))
        })?;
        if !blob_known {
            return Err(MetadataError::not_found(Entity::Blob, checksum));
        }
        Ok(std::mem::replace(slot, checksum.clone()))
    }

    pub(crate) fn delete_object(
        &mut self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<Checksum> {
        self.version_mut(container, version)?
            .objects
            .remove(key)
            .ok_or_else(|| {
                MetadataError::not_found(Entity::Object, object_path(container, version, key))
            })
    }

    pub(crate) fn list_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<Vec<ObjectKey>> {
        Ok(window(&self.version(container, version)?.objects, offset, limit))
    }

    pub(crate) fn count_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<u64> {
        Ok(self.version(container, version)?.objects.len() as u64)
    }

    /// Window over a version's objects, only if that version is published.
    pub(crate) fn list_published_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<ObjectWindow> {
        let row = self.version(container, version)?;
        if !row.record.is_published() {
            return Err(MetadataError::not_found(
                Entity::Version,
                version_path(container, version),
            ));
        }
        Ok(ObjectWindow {
            total: row.objects.len() as u64,
            keys: window(&row.objects, offset, limit),
        })
    }

    /// The reader's resolution path: container, version, published state and
    /// key are checked together and any miss is the same `NotFound`.
    pub(crate) fn get_blob_key_by_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<Checksum> {
        self.containers
            .get(container)
            .and_then(|c| c.version(version))
            .filter(|v| v.record.is_published())
            .and_then(|v| v.objects.get(key))
            .cloned()
            .ok_or_else(|| {
                MetadataError::not_found(
                    Entity::PublishedObject,
                    object_path(container, version, key),
                )
            })
    }

    // ---- Blobs ----

    /// Insert-if-absent. Returns `true` when a new row was written; an
    /// existing row is left exactly as its first writer stored it.
    pub(crate) fn create_blob(
        &mut self,
        checksum: &Checksum,
        size: u64,
        mime_type: &str,
        clock: &dyn Clock,
    ) -> bool {
        if self.blobs.contains_key(checksum) {
            return false;
        }
        self.blobs.insert(
            checksum.clone(),
            BlobRecord::new(checksum.clone(), size, mime_type, clock.now()),
        );
        true
    }

    pub(crate) fn has_blob(&self, checksum: &Checksum) -> bool {
        self.blobs.contains_key(checksum)
    }

    pub(crate) fn get_blob(&self, checksum: &Checksum) -> Option<BlobRecord> {
        self.blobs.get(checksum).cloned()
    }

    pub(crate) fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    /// Objects whose checksum has no blob row. Always empty for state built
    /// through this module; used to vet snapshots loaded from disk.
    pub(crate) fn dangling_references(&self) -> Vec<String> {
        let mut dangling = Vec::new();
        for (container, row) in &self.containers {
            for version in &row.versions {
                for (key, checksum) in &version.objects {
                    if !self.blobs.contains_key(checksum) {
                        dangling.push(object_path(container, &version.record.id, key));
                    }
                }
            }
        }
        dangling
    }
}

fn window(objects: &BTreeMap<ObjectKey, Checksum>, offset: u64, limit: u64) -> Vec<ObjectKey> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    objects.keys().skip(offset).take(limit).cloned().collect()
}
