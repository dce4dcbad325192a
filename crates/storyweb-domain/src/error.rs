//! Error types for domain validation

use thiserror::Error;

/// Errors raised while constructing or validating domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied value is not acceptable (unknown link type, self-link,
    /// unparseable id). Never worth retrying.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
