//! Shared primitives for all Rust crates in saaswatch.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across saaswatch crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required setting or credential is missing or invalid.
    ///
    /// Raised before any network or database I/O is attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The vendor login call failed or returned an unusable body.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// An authenticated vendor call failed or returned a non-success status.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The datastore was unreachable or rejected a statement.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A single fetched record could not be interpreted.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable label for the error category, used as a log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Authentication(_) => "authentication",
            Self::Upstream(_) => "upstream",
            Self::Persistence(_) => "persistence",
            Self::Parse(_) => "parse",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}
