//! Init command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the init command.
///
/// The database schema is created when the store is opened; this writes the
/// config file unless one already exists.
pub fn execute_init(config: &Config, config_path: Option<&Path>, formatter: &Formatter) -> Result<String> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => Config::path()?,
    };

    let mut lines = vec![formatter.success(&format!(
        "Database ready at {}",
        config.database.path.display()
    ))];

    if path.exists() {
        lines.push(formatter.info(&format!("Keeping existing config at {}", path.display())));
    } else {
        let written = config.save(Some(path.as_path()))?;
        lines.push(formatter.success(&format!("Wrote config to {}", written.display())));
    }

    Ok(lines.join("\n"))
}
