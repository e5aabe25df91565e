use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use arkive_metadata::{MetadataError, MetadataRepository, MetadataStore};
use arkive_publisher::{parse_page, PrefixUrlResolver, Publisher, PublisherConfig, PublisherError};
use arkive_types::{Checksum, ContainerName, ObjectKey, SystemClock, VersionId};
use colored::Colorize;

use crate::cli::*;

const OCTET_STREAM: &str = "application/octet-stream";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = Arc::new(
        MetadataStore::open(&cli.store, Arc::new(SystemClock))
            .with_context(|| format!("opening {}", cli.store.display()))?,
    );

    match cli.command {
        Command::Container(cmd) => cmd_container(&store, cmd),
        Command::Version(cmd) => cmd_version(&store, cmd),
        Command::Blob(cmd) => cmd_blob(&store, cmd),
        Command::Object(cmd) => cmd_object(&store, cmd),
        Command::Browse(cmd) => cmd_browse(publisher(store, cli.config.as_deref(), None)?, cmd),
        Command::Resolve(args) => cmd_resolve(store, cli.config.as_deref(), args),
    }
}

/// Whether an error chain bottoms out in a "missing resource" signal.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<MetadataError>()
            .is_some_and(MetadataError::is_not_found)
            || cause
                .downcast_ref::<PublisherError>()
                .is_some_and(PublisherError::is_not_found)
    })
}

fn publisher(
    store: Arc<MetadataStore>,
    config: Option<&Path>,
    base: Option<String>,
) -> anyhow::Result<Publisher<MetadataStore>> {
    let config = match config {
        Some(path) => PublisherConfig::from_file(path)?,
        None => PublisherConfig::default(),
    };
    let resolver = PrefixUrlResolver::new(base.unwrap_or_default());
    Ok(Publisher::new(store, Arc::new(resolver), config))
}

fn cmd_container(store: &MetadataStore, cmd: ContainerCommand) -> anyhow::Result<()> {
    match cmd {
        ContainerCommand::Create { name } => {
            let name = ContainerName::new(name)?;
            store.create_container(&name)?;
            println!("{} Created container {}", "✓".green().bold(), name.as_str().bold());
        }
        ContainerCommand::List => {
            for name in store.list_containers()? {
                println!("{name}");
            }
        }
        ContainerCommand::Delete { name } => {
            let name = ContainerName::new(name)?;
            store.delete_container(&name)?;
            println!("{} Deleted container {}", "✓".green().bold(), name.as_str().bold());
        }
    }
    Ok(())
}

fn cmd_version(store: &MetadataStore, cmd: VersionCommand) -> anyhow::Result<()> {
    match cmd {
        VersionCommand::Create { container } => {
            let container = ContainerName::new(container)?;
            let id = store.create_version(&container)?;
            println!(
                "{} Created draft version {} in {}",
                "✓".green().bold(),
                id.as_str().yellow(),
                container.as_str().bold()
            );
        }
        VersionCommand::List { container, all } => {
            let container = ContainerName::new(container)?;
            let ids = if all {
                store.list_all_versions(&container)?
            } else {
                store.list_published_versions(&container)?
            };
            for id in ids {
                if all {
                    let record = store.get_version(&container, &id)?;
                    println!("{}  {}", id, record.state);
                } else {
                    println!("{id}");
                }
            }
        }
        VersionCommand::Show { container, version } => {
            let container = ContainerName::new(container)?;
            let version = VersionId::new(version)?;
            let record = store.get_version(&container, &version)?;
            let objects = store.count_objects(&container, &version)?;
            println!("Version:   {}", record.id.as_str().yellow());
            println!("State:     {}", record.state);
            println!("Created:   {}", record.created_at.to_rfc3339());
            if let Some(at) = record.published_at {
                println!("Published: {}", at.to_rfc3339());
            }
            println!("Objects:   {objects}");
        }
        VersionCommand::Publish { container, version } => {
            let container = ContainerName::new(container)?;
            let version = VersionId::new(version)?;
            store.mark_version_published(&container, &version)?;
            println!(
                "{} Published {}/{}",
                "✓".green().bold(),
                container.as_str().bold(),
                version.as_str().yellow()
            );
        }
    }
    Ok(())
}

fn cmd_blob(store: &MetadataStore, cmd: BlobCommand) -> anyhow::Result<()> {
    match cmd {
        BlobCommand::Add {
            checksum,
            size,
            mime,
        } => {
            let checksum = Checksum::new(checksum)?;
            store.create_blob(&checksum, size, mime.as_deref().unwrap_or(OCTET_STREAM))?;
            println!("{} Recorded blob {}", "✓".green().bold(), checksum.as_str().cyan());
        }
        BlobCommand::Ingest { file, mime } => {
            let checksum = ingest(store, &file, mime.as_deref())?;
            println!("{checksum}");
        }
        BlobCommand::Show { checksum } => {
            let checksum = Checksum::new(checksum)?;
            let blob = store.get_blob(&checksum)?.ok_or_else(|| {
                MetadataError::NotFound {
                    entity: arkive_metadata::Entity::Blob,
                    name: checksum.to_string(),
                }
            })?;
            println!("Checksum: {}", blob.checksum.as_str().cyan());
            println!("Size:     {}", blob.size);
            println!("Type:     {}", blob.mime_type);
            println!("Created:  {}", blob.created_at.to_rfc3339());
        }
    }
    Ok(())
}

fn cmd_object(store: &MetadataStore, cmd: ObjectCommand) -> anyhow::Result<()> {
    match cmd {
        ObjectCommand::Create(args) => {
            let (container, version, key, checksum) = object_ref(args)?;
            store.create_object(&container, &version, &key, &checksum)?;
            print_mapping(&key, &checksum);
        }
        ObjectCommand::Remap(args) => {
            let (container, version, key, checksum) = object_ref(args)?;
            store.remap_object(&container, &version, &key, &checksum)?;
            print_mapping(&key, &checksum);
        }
        ObjectCommand::Put {
            container,
            version,
            key,
            file,
            mime,
        } => {
            let container = ContainerName::new(container)?;
            let version = VersionId::new(version)?;
            let key = ObjectKey::new(key)?;
            let checksum = ingest(store, &file, mime.as_deref())?;
            store.create_object(&container, &version, &key, &checksum)?;
            print_mapping(&key, &checksum);
        }
        ObjectCommand::Delete {
            container,
            version,
            key,
        } => {
            let container = ContainerName::new(container)?;
            let version = VersionId::new(version)?;
            let key = ObjectKey::new(key)?;
            store.delete_object(&container, &version, &key)?;
            println!("{} Deleted {}", "✓".green().bold(), key.as_str().bold());
        }
        ObjectCommand::List {
            container,
            version,
            offset,
            limit,
        } => {
            let container = ContainerName::new(container)?;
            let version = VersionId::new(version)?;
            for key in store.list_objects(&container, &version, offset, limit)? {
                println!("{key}");
            }
        }
    }
    Ok(())
}

fn cmd_browse(publisher: Publisher<MetadataStore>, cmd: BrowseCommand) -> anyhow::Result<()> {
    match cmd {
        BrowseCommand::Containers => {
            for name in publisher.list_containers()? {
                println!("{name}/");
            }
        }
        BrowseCommand::Versions { container, page } => {
            let page = publisher.list_published_versions_by_page(&container, parse_page(&page))?;
            for id in &page.items {
                println!("{id}/");
            }
            print_page_footer(page.number, page.total_pages);
        }
        BrowseCommand::Objects {
            container,
            version,
            page,
        } => {
            let page = publisher.list_objects_by_page(&container, &version, parse_page(&page))?;
            for key in &page.items {
                println!("{key}");
            }
            print_page_footer(page.number, page.total_pages);
        }
    }
    Ok(())
}

fn print_mapping(key: &ObjectKey, checksum: &Checksum) {
    println!(
        "{} {} → {}",
        "✓".green().bold(),
        key.as_str().bold(),
        checksum.short().cyan()
    );
}

fn print_page_footer(number: u64, total: u64) {
    println!("{}", format!("page {number} of {total}").dimmed());
}

fn cmd_resolve(
    store: Arc<MetadataStore>,
    config: Option<&Path>,
    args: ResolveArgs,
) -> anyhow::Result<()> {
    match args.base {
        Some(base) => {
            let publisher = publisher(store, config, Some(base))?;
            println!("{}", publisher.get_object_url(&args.container, &args.version, &args.key)?);
        }
        None => {
            let publisher = publisher(store, config, None)?;
            println!("{}", publisher.resolve_object(&args.container, &args.version, &args.key)?);
        }
    }
    Ok(())
}

fn object_ref(
    args: ObjectRefArgs,
) -> anyhow::Result<(ContainerName, VersionId, ObjectKey, Checksum)> {
    Ok((
        ContainerName::new(args.container)?,
        VersionId::new(args.version)?,
        ObjectKey::new(args.key)?,
        Checksum::new(args.checksum)?,
    ))
}

/// Hash a local file and record it as a blob.
fn ingest(store: &MetadataStore, file: &Path, mime: Option<&str>) -> anyhow::Result<Checksum> {
    let data = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let checksum = Checksum::compute(&data);
    let mime = mime.unwrap_or_else(|| guess_mime(file));
    store.create_blob(&checksum, data.len() as u64, mime)?;
    tracing::debug!(file = %file.display(), checksum = %checksum.short(), mime, "ingested");
    Ok(checksum)
}

fn guess_mime(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("txt") | Some("md") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("gz") | Some("tgz") => "application/gzip",
        Some("tar") => "application/x-tar",
        Some("zip") => "application/zip",
        _ => OCTET_STREAM,
    }
}
