//! JSON snapshot persistence for the catalog.
//!
//! The whole catalog is written as one document. Writes go to a temporary
//! file in the target directory which is then renamed over the snapshot, so
//! a reader of the file sees either the old catalog or the new one.
//!
//! Writers from any process serialize on an exclusive lock over a sidecar
//! `<snapshot>.lock` file and must reload the snapshot while holding it.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs4::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{MetadataError, MetadataResult};
use crate::state::CatalogState;

/// Snapshot layout written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    catalog: &'a CatalogState,
}

#[derive(Deserialize)]
struct SnapshotDocument {
    format_version: u32,
    catalog: CatalogState,
}

/// Exclusive hold on a snapshot across processes. Released on drop.
#[derive(Debug)]
pub(crate) struct SnapshotLock {
    _file: File,
}

#[derive(Debug, Clone)]
pub(crate) struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Block until this caller is the only writer of the snapshot.
    pub(crate) fn lock(&self) -> MetadataResult<SnapshotLock> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(self.lock_path())?;
        file.lock_exclusive()?;
        Ok(SnapshotLock { _file: file })
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Load the catalog, or `None` if no snapshot has been written yet.
    pub(crate) fn load(&self) -> MetadataResult<Option<CatalogState>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document: SnapshotDocument = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                MetadataError::Serialization(format!("{}: {e}", self.path.display()))
            })?;

        if document.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(MetadataError::Serialization(format!(
                "{}: unsupported snapshot format version {}",
                self.path.display(),
                document.format_version
            )));
        }

        let dangling = document.catalog.dangling_references();
        if !dangling.is_empty() {
            return Err(MetadataError::Unexpected(format!(
                "{}: objects reference missing blobs: {}",
                self.path.display(),
                dangling.join(", ")
            )));
        }

        Ok(Some(document.catalog))
    }

    /// Atomically replace the snapshot with `catalog`.
    pub(crate) fn save(&self, catalog: &CatalogState) -> MetadataResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(
                &mut writer,
                &SnapshotRef {
                    format_version: SNAPSHOT_FORMAT_VERSION,
                    catalog,
                },
            )
            .map_err(|e| MetadataError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::trace!(path = %self.path.display(), "catalog snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkive_types::{Checksum, ContainerName, ManualClock, ObjectKey};
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 2, 1, 2, 3).unwrap())
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("catalog.json"));
        assert!(snapshot.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("catalog.json"));
        let clock = clock();

        let docs = ContainerName::new("docs").unwrap();
        let sum = Checksum::new("deadbeef").unwrap();
        let mut state = CatalogState::default();
        state.create_container(&docs, &clock).unwrap();
        let v = state.create_version(&docs, &clock).unwrap();
        state.create_blob(&sum, 15, "text/plain", &clock);
        state
            .create_object(&docs, &v, &ObjectKey::new("report.txt").unwrap(), &sum)
            .unwrap();

        snapshot.save(&state).unwrap();
        let loaded = snapshot.load().unwrap().expect("snapshot should exist");
        assert_eq!(loaded.list_containers(), vec![docs.clone()]);
        assert_eq!(loaded.list_all_versions(&docs).unwrap(), vec![v.clone()]);
        assert_eq!(loaded.count_objects(&docs, &v).unwrap(), 1);
        assert_eq!(loaded.get_blob(&sum).unwrap().size, 15);
    }

    #[test]
    fn lock_uses_sidecar_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("catalog.json"));
        let lock = snapshot.lock().unwrap();
        assert!(dir.path().join("catalog.json.lock").exists());
        assert!(!dir.path().join("catalog.json").exists());
        drop(lock);
        // Released on drop, so it can be taken again.
        drop(snapshot.lock().unwrap());
    }

    #[test]
    fn rejects_unknown_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"format_version": 99, "catalog": {"containers": {}, "blobs": {}}}"#,
        )
        .unwrap();
        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, MetadataError::Serialization(_)));
    }

    #[test]
    fn rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SnapshotFile::new(&path).load().is_err());
    }

    #[test]
    fn rejects_dangling_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
                "format_version": 1,
                "catalog": {
                    "containers": {
                        "docs": {
                            "created_at": "2024-01-02T01:02:03Z",
                            "versions": [{
                                "record": {
                                    "id": "20240102010203",
                                    "state": "published",
                                    "created_at": "2024-01-02T01:02:03Z",
                                    "published_at": null
                                },
                                "objects": {"a.txt": "missing"}
                            }]
                        }
                    },
                    "blobs": {}
                }
            }"#,
        )
        .unwrap();
        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, MetadataError::Unexpected(_)));
    }
}
