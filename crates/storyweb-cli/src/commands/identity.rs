//! Identity inspection and relabelling commands.

use super::parse_id;
use crate::cli::{IdArgs, TagArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use storyweb_domain::traits::{ClusterGraph, IdentityStore};
use storyweb_domain::Category;
use storyweb_store::{SqliteStore, StoreError};

/// Recorded as `user` when a relabel names no curator
const DEFAULT_CURATOR: &str = "curator";

/// Execute the tag command.
///
/// With `--label` or `--category` the identity is relabelled first and the
/// curator recorded as its `user`, which makes the new label the cluster's
/// representative.
pub fn execute_tag(args: TagArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<String> {
    let id = parse_id(&args.id)?;

    if args.label.is_some() || args.category.is_some() {
        let identity = store
            .get_identity(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let label = match args.label.as_deref().map(str::trim) {
            Some("") => return Err(CliError::InvalidInput("Label must not be empty".to_string())),
            Some(label) => label.to_string(),
            None => identity.label.clone(),
        };
        let category = match args.category.as_deref() {
            Some(category) => category.parse::<Category>()?,
            None => identity.category,
        };

        let user = args
            .user
            .as_deref()
            .or(identity.user.as_deref())
            .unwrap_or(DEFAULT_CURATOR);
        store.upsert_identity(&identity.ref_id, &identity.key, &label, category, Some(user))?;
    }

    let resolution = store.resolve(id)?;
    formatter.format_resolution(&resolution)
}

/// Execute the candidates command.
pub fn execute_candidates(args: IdArgs, store: &SqliteStore, formatter: &Formatter) -> Result<String> {
    let id = parse_id(&args.id)?;
    let candidates = store.merge_candidates(id)?;
    formatter.format_identities(&candidates)
}

/// Execute the members command.
pub fn execute_members(args: IdArgs, store: &SqliteStore, formatter: &Formatter) -> Result<String> {
    let id = parse_id(&args.id)?;
    let root = store.find(id)?;
    let members = store.members(root)?;
    let representative = store.represent(root)?;
    formatter.format_cluster(representative.as_ref(), &members)
}
