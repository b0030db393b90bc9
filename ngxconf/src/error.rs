//! Error types for ngxconf

use crate::parser::SyntaxError;
use thiserror::Error;

/// Result type for ngxconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ngxconf
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The configuration text could not be tokenized or parsed
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// A query path matched no directive
    #[error("Directive not found: {path}")]
    NotFound { path: String },

    /// A query path was empty or contained an empty segment
    #[error("Invalid query path: {path:?}")]
    InvalidPath { path: String },

    /// A directive is present but its value could not be interpreted
    #[error("Cannot extract value from {directive} '{value}': {reason}")]
    Extraction {
        directive: String,
        value: String,
        reason: String,
    },
}

impl Error {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// True for [`Error::NotFound`], the expected outcome for optional directives
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
