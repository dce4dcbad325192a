//! Configuration for ingestion

use crate::ExtractorError;
use serde::{Deserialize, Serialize};
use storyweb_domain::Category;

/// Configuration for the Ingestor
///
/// # Examples
///
/// ```
/// use storyweb_extractor::ExtractorConfig;
///
/// let config: ExtractorConfig = ExtractorConfig::from_toml_str(r#"
///     languages = ["eng", "deu"]
///     auto_merge_by_key = true
/// "#).unwrap();
/// assert!(config.auto_merge_by_key);
/// assert!(config.accepts_language(Some("deu")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Article languages to ingest (ISO 639-3). Empty accepts every article,
    /// including those without a language.
    pub languages: Vec<String>,

    /// Merge every identity sharing a fingerprint as soon as it is ingested.
    /// Off by default: identical names can belong to different people.
    pub auto_merge_by_key: bool,

    /// Entity categories to keep (`PERSON`, `ORG`, `GPE`). Empty keeps all.
    pub categories: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string()],
            auto_merge_by_key: false,
            categories: Category::ALL.iter().map(|c| c.as_str().to_string()).collect(),
        }
    }
}

impl ExtractorConfig {
    /// Parse a TOML document holding only the ingest settings
    pub fn from_toml_str(s: &str) -> Result<Self, ExtractorError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.languages.iter().any(|l| l.trim().is_empty()) {
            return Err(ExtractorError::Config(
                "languages must not contain blank entries".to_string(),
            ));
        }
        for category in &self.categories {
            category.parse::<Category>().map_err(|_| {
                ExtractorError::Config(format!("unknown entity category '{}'", category))
            })?;
        }
        Ok(())
    }

    /// Whether tags of `category` should be kept
    pub fn accepts_category(&self, category: Category) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(category.as_str()))
    }

    /// Whether an article in `language` should be ingested
    pub fn accepts_language(&self, language: Option<&str>) -> bool {
        if self.languages.is_empty() {
            return true;
        }
        match language {
            Some(language) => self.languages.iter().any(|l| l == language),
            None => false,
        }
    }
}
