use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arkive",
    about = "arkive: versioned, content-addressed archive metadata",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Metadata snapshot file
    #[arg(long, global = true, env = "ARKIVE_STORE", default_value = "arkive.json")]
    pub store: PathBuf,

    /// Publisher configuration (TOML)
    #[arg(long, global = true, env = "ARKIVE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, list, or delete containers
    #[command(subcommand)]
    Container(ContainerCommand),
    /// Create, list, show, or publish versions
    #[command(subcommand)]
    Version(VersionCommand),
    /// Record blob metadata
    #[command(subcommand)]
    Blob(BlobCommand),
    /// Map keys to blobs within a version
    #[command(subcommand)]
    Object(ObjectCommand),
    /// Browse published content the way readers see it
    #[command(subcommand)]
    Browse(BrowseCommand),
    /// Resolve a published object to its checksum or URL
    Resolve(ResolveArgs),
}

#[derive(Subcommand)]
pub enum ContainerCommand {
    Create { name: String },
    List,
    /// Delete a container with all of its versions and objects
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum VersionCommand {
    /// Allocate a new draft version
    Create { container: String },
    List {
        container: String,
        /// Include drafts
        #[arg(long)]
        all: bool,
    },
    Show { container: String, version: String },
    /// Make a draft version visible to readers
    Publish { container: String, version: String },
}

#[derive(Subcommand)]
pub enum BlobCommand {
    /// Record a blob by checksum
    Add {
        checksum: String,
        size: u64,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Hash a local file and record it as a blob
    Ingest {
        file: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    Show { checksum: String },
}

#[derive(Subcommand)]
pub enum ObjectCommand {
    Create(ObjectRefArgs),
    /// Point an existing object at another blob
    Remap(ObjectRefArgs),
    /// Ingest a local file and map it under `key`
    Put {
        container: String,
        version: String,
        key: String,
        file: PathBuf,
        #[arg(long)]
        mime: Option<String>,
    },
    Delete {
        container: String,
        version: String,
        key: String,
    },
    List {
        container: String,
        version: String,
        #[arg(long, default_value = "0")]
        offset: u64,
        #[arg(long, default_value = "100")]
        limit: u64,
    },
}

#[derive(Args)]
pub struct ObjectRefArgs {
    pub container: String,
    pub version: String,
    pub key: String,
    pub checksum: String,
}

#[derive(Subcommand)]
pub enum BrowseCommand {
    Containers,
    Versions {
        container: String,
        /// Page number; anything unparseable means page 1
        #[arg(long, default_value = "1")]
        page: String,
    },
    Objects {
        container: String,
        version: String,
        #[arg(long, default_value = "1")]
        page: String,
    },
}

#[derive(Args)]
pub struct ResolveArgs {
    pub container: String,
    pub version: String,
    pub key: String,
    /// Print `{base}/{checksum}` instead of the bare checksum
    #[arg(long, env = "ARKIVE_BLOB_BASE_URL")]
    pub base: Option<String>,
}
