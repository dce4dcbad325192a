//! Merge and split commands.

use super::parse_id;
use crate::cli::{IdArgs, MergeArgs};
use crate::error::Result;
use crate::output::Formatter;
use storyweb_domain::traits::ClusterGraph;
use storyweb_store::SqliteStore;

/// Execute the merge command.
pub fn execute_merge(args: MergeArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<String> {
    let a = parse_id(&args.a)?;
    let b = parse_id(&args.b)?;
    let root = store.merge(a, b)?;
    formatter.format_outcome("Merged into cluster", root)
}

/// Execute the split command.
pub fn execute_split(args: IdArgs, store: &mut SqliteStore, formatter: &Formatter) -> Result<String> {
    let id = parse_id(&args.id)?;
    let root = store.split(id)?;
    formatter.format_outcome("Split into cluster", root)
}
