//! Error types for mksql

use thiserror::Error;

/// Core error type for mksql operations
#[derive(Error, Debug)]
pub enum MksqlError {
    #[error("Grammar error in table '{table}': {message}")]
    Grammar { table: String, message: String },

    #[error("Encoding error in table '{table}' at line {line}: column '{column}' is not valid UTF-8")]
    Encoding {
        table: String,
        line: u64,
        column: String,
    },

    #[error("Invalid integer '{value}' in column '{column}'")]
    InvalidInteger { column: String, value: String },

    #[error("Malformed row in table '{table}' at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        table: String,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("value '{value}' is not found in {table}.{column}")]
    ReferenceNotFound {
        value: String,
        table: String,
        column: String,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),
}

impl MksqlError {
    pub(crate) fn grammar(table: &str, message: impl Into<String>) -> Self {
        Self::Grammar {
            table: table.to_string(),
            message: message.into(),
        }
    }

    /// Attach the table name to an encoding failure raised by the coercer,
    /// which only knows about the column.
    pub fn with_location(self, table: &str, line: u64) -> Self {
        match self {
            Self::Encoding { column, .. } => Self::Encoding {
                table: table.to_string(),
                line,
                column,
            },
            other => other,
        }
    }
}

/// Result type alias for mksql operations
pub type Result<T> = std::result::Result<T, MksqlError>;
