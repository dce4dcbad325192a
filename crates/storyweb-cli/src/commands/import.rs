//! Import command implementation.

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use storyweb_extractor::Ingestor;
use storyweb_store::SqliteStore;

/// Execute the import command.
pub fn execute_import(
    args: ImportArgs,
    store: SqliteStore,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    if !args.file.is_file() {
        return Err(CliError::InvalidInput(format!(
            "No such file: {}",
            args.file.display()
        )));
    }

    let mut ingest = config.ingest.clone();
    if args.auto_merge {
        ingest.auto_merge_by_key = true;
    }

    let mut ingestor = Ingestor::new(store, ingest);
    let report = ingestor.ingest_file(&args.file)?;
    formatter.format_report(&report)
}
