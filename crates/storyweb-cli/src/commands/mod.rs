//! Command implementations.
//!
//! Every command returns the text to print so `main` owns stdout.

pub mod cluster;
pub mod identity;
pub mod import;
pub mod init;
pub mod link;
pub mod listing;

pub use self::cluster::{execute_merge, execute_split};
pub use self::identity::{execute_candidates, execute_members, execute_tag};
pub use self::import::execute_import;
pub use self::init::execute_init;
pub use self::link::{execute_link, execute_links, execute_linktypes};
pub use self::listing::{execute_sites, execute_tags};

use crate::cli::Command;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::path::Path;
use storyweb_domain::IdentityId;
use storyweb_store::SqliteStore;

/// Open the database at `path`, creating its directory if needed.
pub fn open_store(path: &Path, config: &Config) -> Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let store = SqliteStore::open(path, config.database.busy_timeout())?
        .with_link_vocabulary(config.links.vocabulary()?);
    Ok(store)
}

/// Run one command against an open store.
pub fn execute(
    command: Command,
    store: SqliteStore,
    config: &Config,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<String> {
    let mut store = store;
    match command {
        Command::Init => execute_init(config, config_path, formatter),
        Command::Import(args) => execute_import(args, store, config, formatter),
        Command::Sites => execute_sites(&store, formatter),
        Command::Tags(args) => execute_tags(args, &store, config, formatter),
        Command::Tag(args) => execute_tag(args, &mut store, formatter),
        Command::Merge(args) => execute_merge(args, &mut store, formatter),
        Command::Split(args) => execute_split(args, &mut store, formatter),
        Command::Candidates(args) => execute_candidates(args, &store, formatter),
        Command::Members(args) => execute_members(args, &store, formatter),
        Command::Link(args) => execute_link(args, &mut store, formatter),
        Command::Links(args) => execute_links(args, &store, formatter),
        Command::Linktypes => execute_linktypes(&store, formatter),
    }
}

/// Parse an identity or cluster ID argument.
pub(crate) fn parse_id(id: &str) -> Result<IdentityId> {
    IdentityId::from_string(id.trim())
        .map_err(|e| CliError::InvalidInput(format!("Invalid ID '{}': {}", id, e)))
}
