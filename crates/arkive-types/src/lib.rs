//! Foundation types for arkive.
//!
//! arkive is a versioned, content-addressed archive: containers hold
//! versions, versions hold objects, and every object points at a blob by its
//! checksum. This crate carries the vocabulary shared by the metadata
//! repository, the publisher, and the CLI.
//!
//! # Key Types
//!
//! - [`Checksum`]: content hash identifying a blob (the CAS key)
//! - [`ContainerName`] / [`ObjectKey`]: validated names
//! - [`VersionId`] / [`VersionState`]: version identity and its one-way state machine
//! - [`BlobRecord`]: size and media type stored against a checksum
//! - [`Clock`]: injectable time source used for version ids and audit stamps
//! - [`Page`]: one window of a paginated listing

pub mod blob;
pub mod checksum;
pub mod clock;
pub mod error;
pub mod names;
pub mod page;
pub mod version;

pub use blob::BlobRecord;
pub use checksum::Checksum;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TypeError;
pub use names::{ContainerName, ObjectKey};
pub use page::{page_offset, parse_page, total_pages, Page};
pub use version::{VersionId, VersionState};
