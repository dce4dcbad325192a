//! Sites and tags listing commands.

use super::parse_id;
use crate::cli::TagsArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use storyweb_domain::traits::{ArticleStore, TagQuery};
use storyweb_store::SqliteStore;

/// Execute the sites command.
pub fn execute_sites(store: &SqliteStore, formatter: &Formatter) -> Result<String> {
    let sites = store.list_sites()?;
    formatter.format_sites(&sites)
}

/// Execute the tags command.
pub fn execute_tags(
    args: TagsArgs,
    store: &SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let coref_linked = args.coref_linked();
    let coref = args.coref.as_deref().map(parse_id).transpose()?;
    let query = TagQuery {
        sites: args.sites,
        text: args.query,
        limit: Some(args.limit.unwrap_or(config.query.limit)),
        offset: Some(args.offset),
        coref,
        coref_linked,
    };
    let tags = store.list_tags(&query)?;
    formatter.format_tags(&tags)
}
