//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated preconditions on the set structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
