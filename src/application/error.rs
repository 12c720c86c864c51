//! Application-level errors (wraps domain errors)

use std::fmt;

use thiserror::Error;

use crate::domain::DomainError;

/// Boxed cause carried by conversion and operation failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which end of a brace group is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceBoundary {
    Opening,
    Closing,
}

impl fmt::Display for BraceBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BraceBoundary::Opening => f.write_str("opening '{'"),
            BraceBoundary::Closing => f.write_str("closing '}'"),
        }
    }
}

/// Application errors wrap domain errors and add parsing/configuration context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid argument '{name}': {reason}")]
    Argument { name: &'static str, reason: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("missing {boundary} brace in '{fragment}'")]
    MissingBrace {
        boundary: BraceBoundary,
        fragment: String,
    },

    #[error("brace mismatch at position {position}: {reason} in '{fragment}'")]
    BraceMismatch {
        position: usize,
        reason: String,
        fragment: String,
    },

    #[error("cannot convert element '{token}'")]
    Conversion {
        token: String,
        #[source]
        source: BoxError,
    },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: BoxError,
    },
}

impl ApplicationError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for both missing-brace and brace-mismatch errors.
    pub fn is_brace_error(&self) -> bool {
        matches!(
            self,
            ApplicationError::MissingBrace { .. } | ApplicationError::BraceMismatch { .. }
        )
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
