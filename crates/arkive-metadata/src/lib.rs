//! Metadata repository for arkive.
//!
//! Tracks which containers exist, which versions they hold and whether each
//! version is published, which objects each version maps, and which
//! content-addressed blobs those objects point at. Blob bytes live elsewhere;
//! this crate only decides what is visible and what resolves.
//!
//! # Components
//!
//! - **Container registry**: top-level namespaces.
//! - **Version state machine**: Draft → Published, once; publishing is what
//!   makes a version's objects visible to readers.
//! - **Object catalog**: `(container, version, key)` → blob checksum.
//! - **Blob ledger**: deduplicated blob rows keyed by checksum.
//!
//! All of it is exposed through the [`MetadataRepository`] trait and
//! implemented by [`MetadataStore`].
//!
//! # Design Rules
//!
//! 1. Every operation is a single transaction; failures leave no trace.
//! 2. Reader lookups evaluate container, version, published state and key
//!    against one consistent read.
//! 3. Blob creation is insert-if-absent; the first writer's metadata wins.
//! 4. Objects may only reference existing blobs; blobs are never deleted here.
//! 5. Time comes from an injected [`Clock`](arkive_types::Clock), never the
//!    system clock directly.

pub mod error;
pub mod records;
mod snapshot;
mod state;
pub mod store;
pub mod traits;

pub use error::{Entity, MetadataError, MetadataResult};
pub use records::{ContainerRecord, ObjectWindow, VersionRecord};
pub use snapshot::SNAPSHOT_FORMAT_VERSION;
pub use store::MetadataStore;
pub use traits::MetadataRepository;
