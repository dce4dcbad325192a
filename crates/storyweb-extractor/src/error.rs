//! Error types for ingestion

use thiserror::Error;

/// Errors that can occur while ingesting articles
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Store error
    #[error("Store error: {0}")]
    Store(String),

    /// Reading the article file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Article record is missing required data
    #[error("Invalid article: {0}")]
    InvalidArticle(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(e: toml::de::Error) -> Self {
        ExtractorError::Config(e.to_string())
    }
}
