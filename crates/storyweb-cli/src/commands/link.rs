//! Link commands.

use super::parse_id;
use crate::cli::{LinkArgs, LinksArgs};
use crate::error::Result;
use crate::output::Formatter;
use storyweb_domain::traits::{ClusterGraph, LinkGraph};
use storyweb_domain::{ClusterId, Link, LinkType};
use storyweb_store::SqliteStore;

/// Execute the link command.
pub fn execute_link(args: LinkArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<String> {
    let source = parse_id(&args.source)?;
    let target = parse_id(&args.target)?;
    let link_type = args.link_type.parse::<LinkType>()?;

    let link = store.create_link(source, target, link_type, args.user.as_deref())?;
    let labelled = label_links(store, vec![link])?;
    formatter.format_links(&labelled)
}

/// Execute the links command.
pub fn execute_links(args: LinksArgs, store: &SqliteStore, formatter: &Formatter) -> Result<String> {
    let ids = args
        .ids
        .iter()
        .map(|id| parse_id(id))
        .collect::<Result<Vec<_>>>()?;
    let links = store.list_links(&ids)?;
    let labelled = label_links(store, links)?;
    formatter.format_links(&labelled)
}

/// Execute the linktypes command.
pub fn execute_linktypes(store: &SqliteStore, formatter: &Formatter) -> Result<String> {
    formatter.format_link_types(store.link_types())
}

fn label_links(store: &SqliteStore, links: Vec<Link>) -> Result<Vec<(Link, String, String)>> {
    links
        .into_iter()
        .map(|link| {
            let source = cluster_label(store, link.source)?;
            let target = cluster_label(store, link.target)?;
            Ok((link, source, target))
        })
        .collect()
}

fn cluster_label(store: &SqliteStore, cluster: ClusterId) -> Result<String> {
    Ok(store
        .represent(cluster)?
        .map(|r| r.label)
        .unwrap_or_else(|| cluster.to_string()))
}
