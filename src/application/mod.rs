//! Application layer: configuration, conversion and parsing
//!
//! This layer turns text into domain trees.

pub mod configuration;
pub mod converter;
pub mod error;
pub mod parser;

pub use configuration::{Configuration, DEFAULT_FIELD_TERMINATOR, DEFAULT_ROW_TERMINATOR, RESERVED_CHARS};
pub use converter::{ElementConverter, FnConverter, FromStrConverter};
pub use error::{ApplicationError, ApplicationResult, BoxError, BraceBoundary};
pub use parser::{SetParser, MAX_NESTING_DEPTH};
