//! Read-only publisher for arkive.
//!
//! The publisher is the only consumer the metadata repository has on the
//! reading side. It lists containers, pages through published versions and
//! their objects, and turns an object into a fetchable address through a
//! [`BlobUrlResolver`]. Drafts are never visible here.
//!
//! Errors collapse to two outcomes: [`PublisherError::NotFound`] for anything
//! that does not resolve, and an opaque internal failure for the rest.

pub mod config;
pub mod error;
pub mod publisher;
pub mod resolver;

pub use config::{ConfigError, PublisherConfig};
pub use error::{PublisherError, PublisherResult};
pub use publisher::Publisher;
pub use resolver::{BlobUrlResolver, PrefixUrlResolver};

// Page parsing lives with the page type; re-exported for callers that only
// depend on the publisher.
pub use arkive_types::{parse_page, Page};
