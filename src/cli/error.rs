//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl CliError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Io { .. } => crate::exitcode::IOERR,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::Argument { .. } => crate::exitcode::USAGE,
                ApplicationError::Domain(_) => crate::exitcode::USAGE,
                ApplicationError::MissingBrace { .. }
                | ApplicationError::BraceMismatch { .. }
                | ApplicationError::Conversion { .. } => crate::exitcode::DATAERR,
                ApplicationError::OperationFailed { .. } => crate::exitcode::SOFTWARE,
            },
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BraceBoundary;

    #[test]
    fn given_brace_error_when_mapping_exit_code_then_dataerr() {
        let err = CliError::from(ApplicationError::MissingBrace {
            boundary: BraceBoundary::Opening,
            fragment: "1}".to_string(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err = CliError::from(ApplicationError::config("bad"));
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
