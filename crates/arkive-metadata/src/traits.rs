use arkive_types::{Checksum, ContainerName, ObjectKey, VersionId};

use crate::error::MetadataResult;
use crate::records::{ObjectWindow, VersionRecord};

/// The metadata repository: one consistent API over containers, versions,
/// objects and blobs.
///
/// Implementations must satisfy these invariants:
/// - Every operation is atomic: it either fully applies or leaves no trace.
/// - Version state only moves Draft → Published, once.
/// - Every object references an existing blob.
/// - Reader-facing lookups ([`get_blob_key_by_object`],
///   [`list_published_versions`], [`list_published_objects`]) only ever
///   expose published versions, judged from a single consistent read.
/// - A blob checksum maps to exactly one row no matter how many callers race
///   to create it.
///
/// [`get_blob_key_by_object`]: MetadataRepository::get_blob_key_by_object
/// [`list_published_versions`]: MetadataRepository::list_published_versions
/// [`list_published_objects`]: MetadataRepository::list_published_objects
pub trait MetadataRepository: Send + Sync {
    // ---- Container registry ----

    /// Create an empty container. Fails with `AlreadyExists` if the name is taken.
    fn create_container(&self, name: &ContainerName) -> MetadataResult<()>;

    /// All container names, sorted.
    fn list_containers(&self) -> MetadataResult<Vec<ContainerName>>;

    /// Delete a container together with its versions and objects.
    /// Referenced blobs are left alone.
    fn delete_container(&self, name: &ContainerName) -> MetadataResult<()>;

    // ---- Versions ----

    /// Allocate a new Draft version and return its id.
    fn create_version(&self, container: &ContainerName) -> MetadataResult<VersionId>;

    /// Management view of one version, whatever its state.
    fn get_version(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<VersionRecord>;

    /// Every version id, in creation order.
    fn list_all_versions(&self, container: &ContainerName) -> MetadataResult<Vec<VersionId>>;

    /// Published version ids only, in creation order.
    fn list_published_versions(&self, container: &ContainerName)
        -> MetadataResult<Vec<VersionId>>;

    /// Draft → Published. Publishing twice fails with `AlreadyPublished`.
    fn mark_version_published(
        &self,
        container: &ContainerName,
        version: &VersionId,
    ) -> MetadataResult<()>;

    // ---- Objects ----

    /// Map `key` to an existing blob. An existing key is `AlreadyExists`;
    /// an unknown checksum is `DanglingBlob`.
    fn create_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<()>;

    /// Swap the blob an existing object points at.
    fn remap_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
        checksum: &Checksum,
    ) -> MetadataResult<()>;

    /// Remove an object mapping. The blob stays.
    fn delete_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<()>;

    /// Keys in ascending order, `limit` of them starting at `offset`.
    /// An offset past the end yields an empty list.
    fn list_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<Vec<ObjectKey>>;

    /// Number of objects in a version.
    fn count_objects(&self, container: &ContainerName, version: &VersionId)
        -> MetadataResult<u64>;

    /// Like [`list_objects`](MetadataRepository::list_objects) plus the total,
    /// but `NotFound` unless the version is published.
    fn list_published_objects(
        &self,
        container: &ContainerName,
        version: &VersionId,
        offset: u64,
        limit: u64,
    ) -> MetadataResult<ObjectWindow>;

    /// Resolve an object of a published version to its blob checksum.
    ///
    /// `NotFound` unless the container exists, the version exists and is
    /// published, and the key exists in it.
    fn get_blob_key_by_object(
        &self,
        container: &ContainerName,
        version: &VersionId,
        key: &ObjectKey,
    ) -> MetadataResult<Checksum>;

    // ---- Blobs ----

    /// Record a blob if its checksum is new. Creating a known checksum is a
    /// successful no-op; the first writer's size and media type are kept,
    /// exactly as given.
    fn create_blob(&self, checksum: &Checksum, size: u64, mime_type: &str) -> MetadataResult<()>;
}
