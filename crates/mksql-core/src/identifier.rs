//! Identifier validation for SQL built by string interpolation
//!
//! Table, column and index names come from the source files and are spliced
//! into DDL and queries unquoted, so every one of them must pass
//! [`validate_identifier`] first. Values are always bound as parameters.

use regex::Regex;
use std::sync::LazyLock;

use crate::{MksqlError, Result};

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Column type names such as `real` or `varchar(10)`
static TYPE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_ ()]*$").expect("valid regex"));

/// Keywords SQLite never accepts as a bare table or column name
const RESERVED_WORDS: &[&str] = &[
    "add", "all", "alter", "and", "as", "autoincrement", "between", "case", "check", "collate",
    "constraint", "create", "default", "deferrable", "delete", "distinct", "drop", "else",
    "escape", "except", "exists", "foreign", "from", "group", "having", "in", "index", "insert",
    "intersect", "into", "is", "isnull", "join", "limit", "not", "notnull", "null", "on", "or",
    "order", "primary", "references", "select", "set", "table", "then", "to", "union", "unique",
    "update", "using", "values", "when", "where",
];

/// Returns true if `name` is a bare SQL identifier.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name) && !is_reserved_word(name)
}

/// Returns true if `name` is a reserved keyword (compared case-insensitively).
pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
}

/// Returns true if `token` can be spliced into DDL as a column type.
pub fn is_type_name(token: &str) -> bool {
    TYPE_NAME_REGEX.is_match(token)
}

/// Validate a passthrough column type, returning it unchanged.
pub fn validate_type_name(token: &str) -> Result<&str> {
    if is_type_name(token) {
        Ok(token)
    } else {
        Err(MksqlError::InvalidIdentifier(token.to_string()))
    }
}

/// Validate a bare SQL identifier, returning it unchanged.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if is_identifier(name) {
        Ok(name)
    } else {
        Err(MksqlError::InvalidIdentifier(name.to_string()))
    }
}

/// Validate a comma-separated identifier list such as `a,b` or `a, b`.
pub fn validate_identifier_list(list: &str) -> Result<&str> {
    if list.split(',').all(|part| is_identifier(part.trim())) {
        Ok(list)
    } else {
        Err(MksqlError::InvalidIdentifier(list.to_string()))
    }
}
