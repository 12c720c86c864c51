//! Parser configuration: delimiters and empty-field policy.
//!
//! A [`Configuration`] is validated once when it is built and is immutable
//! afterwards, so holding one means holding a valid one.

use tracing::instrument;

use crate::application::error::{ApplicationError, ApplicationResult};

/// Characters that delimit set groups and may never appear in a delimiter.
pub const RESERVED_CHARS: [char; 2] = ['{', '}'];

pub const DEFAULT_FIELD_TERMINATOR: &str = ",";
pub const DEFAULT_ROW_TERMINATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    field_terminator: String,
    row_terminator: String,
    ignore_empty_fields: bool,
    auto_wrap_braces: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            field_terminator: DEFAULT_FIELD_TERMINATOR.to_string(),
            row_terminator: DEFAULT_ROW_TERMINATOR.to_string(),
            ignore_empty_fields: false,
            auto_wrap_braces: false,
        }
    }
}

impl Configuration {
    /// Single-delimiter form; rows are separated by a newline.
    pub fn new(
        element_delimiter: &str,
        auto_wrap_braces: bool,
        ignore_empty_fields: bool,
    ) -> ApplicationResult<Self> {
        Self::build(
            element_delimiter,
            DEFAULT_ROW_TERMINATOR,
            ignore_empty_fields,
            auto_wrap_braces,
        )
    }

    /// Field and row delimiter form.
    pub fn with_rows(
        field_terminator: &str,
        row_terminator: &str,
        ignore_empty_fields: bool,
        auto_wrap_braces: bool,
    ) -> ApplicationResult<Self> {
        Self::build(
            field_terminator,
            row_terminator,
            ignore_empty_fields,
            auto_wrap_braces,
        )
    }

    #[instrument(level = "debug")]
    fn build(
        field_terminator: &str,
        row_terminator: &str,
        ignore_empty_fields: bool,
        auto_wrap_braces: bool,
    ) -> ApplicationResult<Self> {
        validate_terminator("field terminator", field_terminator)?;
        validate_terminator("row terminator", row_terminator)?;
        if field_terminator == row_terminator {
            return Err(ApplicationError::config(format!(
                "field and row terminators must differ, both are {:?}",
                field_terminator
            )));
        }
        Ok(Self {
            field_terminator: field_terminator.to_string(),
            row_terminator: row_terminator.to_string(),
            ignore_empty_fields,
            auto_wrap_braces,
        })
    }

    pub fn field_terminator(&self) -> &str {
        &self.field_terminator
    }

    pub fn row_terminator(&self) -> &str {
        &self.row_terminator
    }

    pub fn ignore_empty_fields(&self) -> bool {
        self.ignore_empty_fields
    }

    pub fn auto_wrap_braces(&self) -> bool {
        self.auto_wrap_braces
    }
}

fn validate_terminator(name: &str, value: &str) -> ApplicationResult<()> {
    if value.is_empty() {
        return Err(ApplicationError::config(format!("{} must not be empty", name)));
    }
    if let Some(reserved) = value.chars().find(|c| RESERVED_CHARS.contains(c)) {
        return Err(ApplicationError::config(format!(
            "{} {:?} contains reserved character '{}'",
            name, value, reserved
        )));
    }
    Ok(())
}
