//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Storyweb - curate entity clusters and the links between them.
#[derive(Debug, Parser)]
#[command(name = "storyweb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STORYWEB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured path
    #[arg(short, long, global = true, env = "STORYWEB_DATABASE")]
    pub database: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the database and write a default config file
    Init,

    /// Ingest a JSON lines file of extracted articles
    Import(ImportArgs),

    /// List source sites
    Sites,

    /// List tags across articles
    Tags(TagsArgs),

    /// Show an identity and its cluster, optionally relabelling it
    Tag(TagArgs),

    /// Merge the clusters of two identities
    Merge(MergeArgs),

    /// Detach an identity from its cluster
    Split(IdArgs),

    /// Identities with the same fingerprint in other clusters
    Candidates(IdArgs),

    /// Members of the cluster containing an identity
    Members(IdArgs),

    /// Link two clusters
    Link(LinkArgs),

    /// List links
    Links(LinksArgs),

    /// List the enabled link types
    Linktypes,
}

/// Arguments for the import command.
#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON lines file, one article per line
    pub file: PathBuf,

    /// Merge identities sharing a fingerprint while ingesting
    #[arg(long)]
    pub auto_merge: bool,
}

/// Arguments for the tags command.
#[derive(Debug, Parser)]
pub struct TagsArgs {
    /// Only tags from this site (repeatable)
    #[arg(short, long = "site")]
    pub sites: Vec<String>,

    /// Case-insensitive substring of the tag text
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Results to skip
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Only tags co-occurring in articles with this identity's cluster
    #[arg(long)]
    pub coref: Option<String>,

    /// With --coref: only clusters already linked to it
    #[arg(long, requires = "coref", conflicts_with = "unlinked")]
    pub linked: bool,

    /// With --coref: only clusters not yet linked to it
    #[arg(long, requires = "coref")]
    pub unlinked: bool,
}

impl TagsArgs {
    /// Link filter for the co-occurrence query
    pub fn coref_linked(&self) -> Option<bool> {
        match (self.linked, self.unlinked) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the tag command.
#[derive(Debug, Parser)]
pub struct TagArgs {
    /// Identity ID
    pub id: String,

    /// New display label
    #[arg(short, long)]
    pub label: Option<String>,

    /// New category (PERSON, ORG, GPE)
    #[arg(long)]
    pub category: Option<String>,

    /// Curator name recorded with the change
    #[arg(short, long, env = "STORYWEB_USER")]
    pub user: Option<String>,
}

/// Arguments for the merge command.
#[derive(Debug, Parser)]
pub struct MergeArgs {
    /// First identity ID
    pub a: String,

    /// Second identity ID
    pub b: String,
}

/// A single identity argument.
#[derive(Debug, Parser)]
pub struct IdArgs {
    /// Identity ID
    pub id: String,
}

/// Arguments for the link command.
#[derive(Debug, Parser)]
pub struct LinkArgs {
    /// Source identity or cluster ID
    pub source: String,

    /// Target identity or cluster ID
    pub target: String,

    /// Link type (see `storyweb linktypes`)
    #[arg(short = 't', long = "type", default_value = "UNSPECIFIED")]
    pub link_type: String,

    /// Curator name recorded with the link
    #[arg(short, long, env = "STORYWEB_USER")]
    pub user: Option<String>,
}

/// Arguments for the links command.
#[derive(Debug, Parser)]
pub struct LinksArgs {
    /// Only links touching these identities' clusters (all links if empty)
    pub ids: Vec<String>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
