use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use arkive_types::{BlobRecord, Checksum, Clock, ContainerName, ObjectKey, SystemClock, VersionId};
use tracing::{debug, info};

use crate::error::{MetadataError, MetadataResult};
use crate::records::{ContainerRecord, ObjectWindow, VersionRecord};
use crate::snapshot::SnapshotFile;
use crate::state::CatalogState;
use crate::traits::MetadataRepository;

/// Transactional metadata store.
///
/// The catalog sits behind a single `RwLock`. Reads share the lock and see a
/// consistent catalog; writes hold it exclusively, which serializes publish
/// against every object mutation and makes blob creation a true
/// insert-if-absent.
///
/// With a snapshot file attached ([`MetadataStore::open`]) each write takes
/// an exclusive file lock, reloads the latest snapshot, applies the change to
/// that copy, persists it, and only then swaps it in. A failed write
/// (including a failed disk write) never becomes visible, and handles in
/// other processes never overwrite each other's commits. Reads serve the
/// catalog as of this handle's last write or [`MetadataStore::refresh`].
pub struct MetadataStore {
    state: RwLock<CatalogState>,
    clock: Arc<dyn Clock>,
    snapshot: Option<SnapshotFile>,
}

impl MetadataStore {
    /// In-memory store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// In-memory store on an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(CatalogState::default()),
            clock,
            snapshot: None,
        }
    }

    /// Store persisted to a JSON snapshot at `path`, loading it if present.
    pub fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> MetadataResult<Self> {
        let snapshot = SnapshotFile::new(path);
        let state = snapshot.load()?.unwrap_or_default();
        info!(path = %snapshot.path().display(), "opened metadata store");
        Ok(Self {
            state: RwLock::new(state),
            clock,
            snapshot: Some(snapshot),
        })
    }

    /// Path of the backing snapshot, if any.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_ref().map(SnapshotFile::path)
    }

    /// Pick up commits made through other handles on the same snapshot.
    /// A no-op for in-memory stores.
    pub fn refresh(&self) -> MetadataResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        let mut guard = self.write_state()?;
        let _lock = snapshot.lock()?;
        *guard = snapshot.load()?.unwrap_or_default();
        debug!(path = %snapshot.path().display(), "catalog refreshed");
        Ok(())
    }

    /// Look up a blob row. Management and diagnostics only; readers reach
    /// blobs through [`MetadataRepository::get_blob_key_by_object`].
    pub fn get_blob(&self, checksum: &Checksum) -> MetadataResult<Option<BlobRecord>> {
        Ok(self.read_state()?.get_blob(checksum))
    }

    /// Number of distinct blobs recorded.
    pub fn blob_count(&self) -> MetadataResult<usize> {
        Ok(self.read_state()?.blob_count())
    }

    /// Container details including its creation stamp.
    pub fn get_container(&self, name: &ContainerName) -> MetadataResult<ContainerRecord> {
        self.read_state()?.get_container(name)
    }

    fn read_state(&self) -> MetadataResult<RwLockReadGuard<'_, CatalogState>> {
        self.state
            .read()
            .map_err(|e| MetadataError::Unexpected(format!("lock poisoned: {e}")))
    }

    fn write_state(&self) -> MetadataResult<RwLockWriteGuard<'_, CatalogState>> {
        self.state
            .write()
            .map_err(|e| MetadataError::Unexpected(format!("lock poisoned: {e}")))
    }

    /// Run `f` as one write transaction.
    fn transact<T>(
        &self,
        f: impl FnOnce(&mut CatalogState, &dyn Clock) -> MetadataResult<T>,
    ) -> MetadataResult<T> {
        let mut guard = self.write_state()?;
        let clock = self.clock.as_ref();
        match &self.snapshot {
            // State methods validate before mutating, so in place is atomic.
            None => f(&mut *guard, clock),
            Some(snapshot) => {
                let _lock = snapshot.lock()?;
                // Other handles may have committed since this one last synced.
                let mut staged = snapshot.load()?.unwrap_or_default();
                *guard = staged.clone();
                let out = f(&mut staged, clock)?;
                snapshot.save(&staged)?;
                *guard = staged;
                Ok(out)
            }
        }
    }
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataRepository for MetadataStore {
    fn create_container(&self, name: &ContainerName) -> MetadataResult<()> {
        self.transact(|state, clock| state.create_container(name, clock))?;
        debug!(container = %name, "container created");
        Ok(())
    }

    fn list_containers(&self) -> MetadataResult<Vec<ContainerName>> {
        Ok(self.read_state()?.list_containers())
    }

    fn delete_container(&self, name: &ContainerName) -> MetadataResult<()> {
        let versions = self.transact(|state, _| state.delete_container(name))?;
        info!(container = %name, versions, "container deleted");
        Ok(())
    }

    fn create_version(&self, container: &ContainerName) -> MetadataResult<VersionId> {
        let id = self.transact(|state, clock| state.create_version(container, clock))?;
        debug!(%container, version = %id, "draft version created");
        Ok(id)
    }

    fn get_version(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<VersionRecord> {
        self.read_state()?.get_version(container, version)
    }

    fn list_all_versions(&self, container: &ContainerName) -> MetadataResult<Vec<VersionId>> {
        self.read_state()?.list_all_versions(container)
    }

    fn list_published_versions(
        &self,
        container: &ContainerName,
    ) -> MetadataResult<Vec<VersionId>> {
        self.read_state()?.list_published_versions(container)
    }

    fn mark_version_published(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<()> {
        self.transact(|state, clock| state.mark_version_published(container, version, clock))?;
        info!(%container, %version, "version published");
        Ok(())
    }

    fn create_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<()> {
        self.transact(|state, _| state.create_object(container, version, key, checksum))?;
        debug!(%container, %version, %key, checksum = %checksum.short(), "object created");
        Ok(())
    }

    fn remap_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<()> {
        let previous =
            self.transact(|state, _| state.remap_object(container, version, key, checksum))?;
        debug!(
            %container,
            %version,
            %key,
            from = %previous.short(),
            to = %checksum.short(),
            "object remapped"
        );
        Ok(())
    }

    fn delete_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<()> {
        self.transact(|state, _| state.delete_object(container, version, key))?;
        debug!(%container, %version, %key, "object deleted");
        Ok(())
    }

    fn list_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<Vec<ObjectKey>> {
        self.read_state()?.list_objects(container, version, offset, limit)
    }

    fn count_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<u64> {
        self.read_state()?.count_objects(container, version)
    }

    fn list_published_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<ObjectWindow> {
        self.read_state()?
            .list_published_objects(container, version, offset, limit)
    }

    fn get_blob_key_by_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<Checksum> {
        self.read_state()?
            .get_blob_key_by_object(container, version, key)
    }

    fn create_blob(&self, checksum: &Checksum, size: u64, mime_type: &str) -> MetadataResult<()> {
        // Fast path for content we already know; the transaction re-checks.
        if self.read_state()?.has_blob(checksum) {
            return Ok(());
        }
        let inserted = self.transact(|state, clock| {
            Ok(state.create_blob(checksum, size, mime_type, clock))
        })?;
        if inserted {
            debug!(checksum = %checksum.short(), size, mime_type, "blob recorded");
        }
        Ok(())
    }
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("snapshot", &self.snapshot_path())
            .finish_non_exhaustive()
    }
}
