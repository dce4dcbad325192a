//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storyweb_domain::{LinkType, LinkVocabulary};
use storyweb_extractor::ExtractorConfig;

/// CLI configuration.
///
/// Every section may be omitted; missing sections and fields take their
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Ingestion settings
    #[serde(default)]
    pub ingest: ExtractorConfig,

    /// Link vocabulary
    #[serde(default)]
    pub links: LinksConfig,

    /// Listing defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// How long a writer waits for the database lock
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// Link type vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Enabled link type names
    #[serde(default = "default_link_types")]
    pub types: Vec<String>,
}

/// Listing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Page size for tag listings
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the default config file and database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".storyweb"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path` (or the default path), or use defaults
    /// if the file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config = Self::from_toml_str(&contents)?;
            tracing::debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path` (or the default path).
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.ingest.validate()?;
        self.links.vocabulary()?;
        self.query.validate()?;
        Ok(())
    }
}

impl DatabaseConfig {
    /// Busy timeout as a duration.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Validate the database settings.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(CliError::Config("database.path must not be empty".into()));
        }
        Ok(())
    }
}

impl LinksConfig {
    /// The enabled link types.
    pub fn vocabulary(&self) -> Result<LinkVocabulary> {
        LinkVocabulary::from_names(&self.types)
            .map_err(|e| CliError::Config(format!("links.types: {}", e)))
    }
}

impl QueryConfig {
    /// Validate the listing defaults.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(CliError::Config("query.limit must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            types: default_link_types(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_database_path() -> PathBuf {
    Config::home()
        .map(|home| home.join("storyweb.db"))
        .unwrap_or_else(|_| PathBuf::from("storyweb.db"))
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

fn default_link_types() -> Vec<String> {
    LinkType::ALL.iter().map(|t| t.as_str().to_string()).collect()
}

fn default_limit() -> usize {
    storyweb_store::DEFAULT_TAG_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.busy_timeout(), Duration::from_secs(5));
        assert_eq!(config.links.vocabulary().unwrap().all().len(), LinkType::ALL.len());
        assert_eq!(config.query.limit, 100);
        assert!(config.settings.color);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [database]
            path = "/tmp/news.db"

            [links]
            types = ["family", "OPPONENT"]
            "#,
        )
        .unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/news.db"));
        assert_eq!(config.database.busy_timeout_ms, 5000);
        assert_eq!(
            config.links.vocabulary().unwrap().all(),
            &[LinkType::Family, LinkType::Opponent]
        );
        assert_eq!(config.ingest.languages, vec!["eng".to_string()]);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        assert!(Config::from_toml_str("[links]\ntypes = [\"ENEMY\"]").is_err());
        assert!(Config::from_toml_str("[links]\ntypes = []").is_err());
        assert!(Config::from_toml_str("[query]\nlimit = 0").is_err());
        assert!(Config::from_toml_str("[ingest]\ncategories = [\"DATE\"]").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.ingest.auto_merge_by_key = true;
        config.query.limit = 25;
        config.save(Some(path.as_path())).unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert!(loaded.ingest.auto_merge_by_key);
        assert_eq!(loaded.query.limit, 25);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(loaded.query.limit, 100);
    }
}
