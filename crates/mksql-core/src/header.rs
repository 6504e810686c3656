//! Header grammar parser
//!
//! The first row of every source file annotates each column:
//!
//! ```text
//! id:integer:p, name:text:un, other:integer::foo[name]
//! ```
//!
//! - `id` is an integer primary key.
//! - `name` is text, `NOT NULL UNIQUE`.
//! - `other` is an integer whose cells hold `foo.name` values; the loader looks
//!   up the matching `foo.fooid` and stores that instead.
//!
//! A cell is `name:type[:constraints[:table[column]]]`. `type` is `text`,
//! `integer` or `trash`; any other token is kept as a passthrough type.
//! `constraints` is tested for the characters `p` (primary key), `n`
//! (not null) and `u` (unique).

use std::collections::HashSet;

use regex::Regex;
use std::sync::LazyLock;

use crate::identifier::{is_identifier, is_type_name};
use crate::{ColumnSpec, ColumnType, Constraints, MksqlError, Result, TableSpec};

static FOREIGN_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\[([A-Za-z_][A-Za-z0-9_]*)\]$").expect("valid regex")
});

/// Parse a full header row into the table's schema.
pub fn parse_header<S: AsRef<str>>(table: &str, cells: &[S]) -> Result<TableSpec> {
    if cells.is_empty() {
        return Err(MksqlError::grammar(table, "header row is empty"));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(cells.len());
    for cell in cells {
        let column = parse_header_cell(table, cell.as_ref())?;
        if !seen.insert(column.name.clone()) {
            return Err(MksqlError::grammar(
                table,
                format!("duplicate column '{}'", column.name),
            ));
        }
        columns.push(column);
    }

    let spec = TableSpec::new(table, columns);
    tracing::debug!(
        table = %table,
        columns = spec.columns.len(),
        primary_key = ?spec.primary_key_columns,
        synthetic_id = spec.synthetic_id_added,
        "parsed header"
    );
    Ok(spec)
}

/// Parse a single header cell such as `other:integer::foo[name]`.
pub fn parse_header_cell(table: &str, cell: &str) -> Result<ColumnSpec> {
    let cell = cell.trim();
    let segments: Vec<&str> = cell.split(':').collect();

    if segments.len() < 2 {
        return Err(MksqlError::grammar(
            table,
            format!("header cell '{}' has no type segment", cell),
        ));
    }
    if segments.len() > 4 {
        return Err(MksqlError::grammar(
            table,
            format!("header cell '{}' has more than four segments", cell),
        ));
    }

    let name = segments[0];
    if !is_identifier(name) {
        return Err(MksqlError::grammar(
            table,
            format!("invalid column name '{}' in header cell '{}'", name, cell),
        ));
    }

    let declared_type = ColumnType::from_token(segments[1]);
    if let ColumnType::Passthrough(token) = &declared_type
        && !is_type_name(token)
    {
        return Err(MksqlError::grammar(
            table,
            format!("invalid column type '{}' in header cell '{}'", token, cell),
        ));
    }

    let constraints = segments
        .get(2)
        .map(|chars| Constraints::from_chars(chars))
        .unwrap_or_default();
    let mut column = ColumnSpec::new(name, declared_type).with_constraints(constraints);

    if let Some(target) = segments.get(3) {
        let (target_table, target_column) = parse_foreign_key(table, cell, target)?;
        column = column.with_foreign_key(target_table, target_column);
    }
    Ok(column)
}

fn parse_foreign_key<'t>(table: &str, cell: &str, target: &'t str) -> Result<(&'t str, &'t str)> {
    let invalid = || {
        MksqlError::grammar(
            table,
            format!(
                "foreign key '{}' in header cell '{}' is not of the form table[column]",
                target, cell
            ),
        )
    };
    let captures = FOREIGN_KEY_REGEX.captures(target).ok_or_else(invalid)?;
    let (Some(target_table), Some(target_column)) = (captures.get(1), captures.get(2)) else {
        return Err(invalid());
    };
    if !is_identifier(target_table.as_str()) || !is_identifier(target_column.as_str()) {
        return Err(invalid());
    }

    Ok((target_table.as_str(), target_column.as_str()))
}
