use std::str::FromStr;
use std::sync::Arc;

use arkive_metadata::MetadataRepository;
use arkive_types::{page_offset, total_pages, ContainerName, ObjectKey, Page, VersionId};
use tracing::debug;

use crate::config::PublisherConfig;
use crate::error::{PublisherError, PublisherResult};
use crate::resolver::BlobUrlResolver;

/// Read-only view of the archive for external readers.
///
/// Only published versions are ever listed or resolved. Names arrive as raw
/// strings from the outside world; a string that is not even a valid name
/// cannot exist, so it is reported as [`PublisherError::NotFound`].
pub struct Publisher<R: MetadataRepository> {
    repo: Arc<R>,
    resolver: Arc<dyn BlobUrlResolver>,
    config: PublisherConfig,
}

fn parse<T: FromStr>(raw: &str) -> PublisherResult<T> {
    raw.parse().map_err(|_| PublisherError::NotFound)
}

impl<R: MetadataRepository> Publisher<R> {
    pub fn new(repo: Arc<R>, resolver: Arc<dyn BlobUrlResolver>, config: PublisherConfig) -> Self {
        Self {
            repo,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Every container name.
    pub fn list_containers(&self) -> PublisherResult<Vec<ContainerName>> {
        Ok(self.repo.list_containers()?)
    }

    /// One page of a container's published versions, in creation order.
    pub fn list_published_versions_by_page(
        &self,
        container: &str,
        page: u64,
    ) -> PublisherResult<Page<VersionId>> {
        let container = parse::<ContainerName>(container)?;
        let page_size = self.config.versions_per_page;

        let versions = self.repo.list_published_versions(&container)?;
        let total = total_pages(versions.len() as u64, page_size);
        let offset = usize::try_from(page_offset(page, page_size)).unwrap_or(usize::MAX);
        let take = usize::try_from(page_size).unwrap_or(usize::MAX);
        let items: Vec<VersionId> = versions.into_iter().skip(offset).take(take).collect();

        debug!(%container, page, total_pages = total, items = items.len(), "listed versions");
        Ok(Page {
            number: page.max(1),
            total_pages: total,
            items,
        })
    }

    /// One page of a published version's object keys, in key order.
    pub fn list_objects_by_page(
        &self,
        container: &str,
        version: &str,
        page: u64,
    ) -> PublisherResult<Page<ObjectKey>> {
        let container = parse::<ContainerName>(container)?;
        let version = parse::<VersionId>(version)?;
        let page_size = self.config.objects_per_page;

        let window = self.repo.list_published_objects(
            &container,
            &version,
            page_offset(page, page_size),
            page_size,
        )?;
        let total = total_pages(window.total, page_size);

        debug!(
            %container,
            %version,
            page,
            total_pages = total,
            items = window.keys.len(),
            "listed objects"
        );
        Ok(Page {
            number: page.max(1),
            total_pages: total,
            items: window.keys,
        })
    }

    /// Checksum of a published object.
    pub fn resolve_object(
        &self,
        container: &str,
        version: &str,
        key: &str,
    ) -> PublisherResult<arkive_types::Checksum> {
        let container = parse::<ContainerName>(container)?;
        let version = parse::<VersionId>(version)?;
        let key = parse::<ObjectKey>(key)?;
        Ok(self
            .repo
            .get_blob_key_by_object(&container, &version, &key)?)
    }

    /// Fetchable address of a published object's content.
    pub fn get_object_url(
        &self,
        container: &str,
        version: &str,
        key: &str,
    ) -> PublisherResult<String> {
        let checksum = self.resolve_object(container, version, key)?;
        self.resolver
            .blob_url(&checksum)
            .map_err(PublisherError::Resolver)
    }
}

impl<R: MetadataRepository> std::fmt::Debug for Publisher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
