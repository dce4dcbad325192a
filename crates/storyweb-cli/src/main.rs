//! Storyweb CLI - curate entity clusters extracted from news articles.

use anyhow::Context;
use clap::Parser;
use storyweb_cli::commands;
use storyweb_cli::{Cli, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays pipeable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database.path = database;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let formatter = Formatter::new(format, !cli.no_color && config.settings.color);

    let store = commands::open_store(&config.database.path, &config).with_context(|| {
        format!("Failed to open database {}", config.database.path.display())
    })?;

    let output = commands::execute(cli.command, store, &config, cli.config.as_deref(), &formatter)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
