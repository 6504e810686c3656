//! Inline directive rows
//!
//! A data row whose first field starts with `#@` is a directive for the table
//! instead of data, e.g. `#@index,station_name,1,name`. Directives run after
//! the table is created and before any row is inserted.

use crate::identifier::{validate_identifier, validate_identifier_list};
use crate::{MksqlError, Result};

/// Prefix marking a directive row
pub const DIRECTIVE_MARKER: &str = "#@";

/// Returns true if a row's first field marks it as a directive.
pub fn is_directive(first_field: &[u8]) -> bool {
    first_field.starts_with(DIRECTIVE_MARKER.as_bytes())
}

/// A parsed directive row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub args: Vec<String>,
}

impl Directive {
    /// Parse a row into a directive. Returns `None` for ordinary rows.
    pub fn parse<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        let (first, rest) = fields.split_first()?;
        let name = first.as_ref().strip_prefix(DIRECTIVE_MARKER)?;
        Some(Self {
            name: name.trim().to_string(),
            args: rest.iter().map(|arg| arg.as_ref().trim().to_string()).collect(),
        })
    }

    /// Build the SQL statement for this directive on `table`.
    ///
    /// Unknown directive names yield `Ok(None)`.
    pub fn to_sql(&self, table: &str) -> Result<Option<String>> {
        match self.name.to_lowercase().as_str() {
            "index" => self.create_index(table).map(Some),
            _ => {
                tracing::debug!(
                    table = %table,
                    directive = %self.name,
                    "ignoring unknown directive"
                );
                Ok(None)
            }
        }
    }

    /// `args = [index_name, uniqueness, col1, col2, ...]`.
    ///
    /// Column arguments are concatenated without a separator, so a
    /// multi-column index is written as a single quoted field: `"a,b"`.
    fn create_index(&self, table: &str) -> Result<String> {
        let [index_name, uniqueness, columns @ ..] = self.args.as_slice() else {
            return Err(self.invalid(table, "expected index name, uniqueness and columns"));
        };
        if columns.is_empty() {
            return Err(self.invalid(table, "expected at least one column"));
        }

        let column_list = columns.concat();
        validate_identifier(table)?;
        validate_identifier(index_name).map_err(|_| self.invalid(table, "invalid index name"))?;
        validate_identifier_list(&column_list)
            .map_err(|_| self.invalid(table, "invalid column list"))?;

        let unique = if is_unique_flag(uniqueness) { "UNIQUE " } else { "" };
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            unique, index_name, table, column_list
        ))
    }

    fn invalid(&self, table: &str, message: &str) -> MksqlError {
        MksqlError::grammar(
            table,
            format!(
                "directive '{}{}' ({}): {}",
                DIRECTIVE_MARKER,
                self.name,
                self.args.join(","),
                message
            ),
        )
    }
}

fn is_unique_flag(flag: &str) -> bool {
    ["1", "u", "unique", "true"]
        .iter()
        .any(|token| flag.eq_ignore_ascii_case(token))
}
