//! DDL generation from a parsed table header

use crate::identifier::{validate_identifier, validate_type_name};
use crate::{ColumnSpec, ColumnType, Result, TableSpec};

/// Generate the `CREATE TABLE` statement for a table.
///
/// Column clauses follow header order with trash columns removed. When the
/// header flags no primary key, `<table>id INTEGER PRIMARY KEY AUTOINCREMENT`
/// is prepended; otherwise the flagged columns form a table-level
/// `PRIMARY KEY (...)` clause. Each foreign-key column adds
/// `FOREIGN KEY (col) REFERENCES target(targetid)`; the referenced column is
/// always the target's identifier column, not the lookup column named in the
/// header.
pub fn create_table(table: &TableSpec) -> Result<String> {
    validate_identifier(&table.name)?;
    tracing::debug!(
        table = %table.name,
        column_count = table.columns.len(),
        "generating CREATE TABLE DDL"
    );

    let mut clauses = Vec::new();

    if let Some(id_column) = table.synthetic_id_column() {
        clauses.push(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", id_column));
    }

    for column in table.stored_columns() {
        clauses.push(column_definition(column)?);
    }

    if !table.primary_key_columns.is_empty() {
        for name in &table.primary_key_columns {
            validate_identifier(name)?;
        }
        clauses.push(format!(
            "PRIMARY KEY ({})",
            table.primary_key_columns.join(", ")
        ));
    }

    for column in table.stored_columns() {
        if let Some(reference) = &column.foreign_key {
            let target = validate_identifier(&reference.target_table)?;
            clauses.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                column.name,
                target,
                reference.id_column()
            ));
        }
    }

    Ok(format!("CREATE TABLE {} ({})", table.name, clauses.join(", ")))
}

/// Generate the `INSERT` statement for a table's stored columns, with one
/// positional parameter per column. The synthetic key is left to the store.
pub fn insert_statement(table: &TableSpec) -> Result<String> {
    validate_identifier(&table.name)?;
    let columns = table.stored_column_names();
    for name in &columns {
        validate_identifier(name)?;
    }
    let placeholders = vec!["?"; columns.len()].join(", ");

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders
    ))
}

fn column_definition(column: &ColumnSpec) -> Result<String> {
    let mut def = validate_identifier(&column.name)?.to_string();

    let sql_type = match &column.declared_type {
        ColumnType::Passthrough(token) => validate_type_name(token)?,
        other => other.sql_type(),
    };
    if !sql_type.is_empty() {
        def.push(' ');
        def.push_str(sql_type);
    }

    let suffix = column.constraints.sql_suffix();
    if !suffix.is_empty() {
        def.push(' ');
        def.push_str(&suffix);
    }

    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_header;
    use crate::MksqlError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_synthetic_key_prepended() {
        let spec = parse_header("city", &["name:text:un", "kana:text"]).unwrap();

        assert_eq!(
            create_table(&spec).unwrap(),
            "CREATE TABLE city (cityid INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE, kana TEXT)"
        );
        assert_eq!(
            insert_statement(&spec).unwrap(),
            "INSERT INTO city (name, kana) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_composite_primary_key_clause() {
        let spec = parse_header(
            "fare",
            &["low:integer:pn", "fare:integer:n", "high:integer:pn"],
        )
        .unwrap();
        let sql = create_table(&spec).unwrap();

        assert_eq!(
            sql,
            "CREATE TABLE fare (low INTEGER NOT NULL, fare INTEGER NOT NULL, high INTEGER NOT NULL, PRIMARY KEY (low, high))"
        );
        assert!(!sql.contains("fareid"));
    }

    #[test]
    fn test_single_declared_key_uses_table_clause() {
        let spec = parse_header("company", &["id:integer:p", "name:text:un"]).unwrap();
        assert_eq!(
            create_table(&spec).unwrap(),
            "CREATE TABLE company (id INTEGER, name TEXT NOT NULL UNIQUE, PRIMARY KEY (id))"
        );
    }

    #[test]
    fn test_foreign_key_references_identifier_column() {
        let spec = parse_header(
            "station",
            &["name:text:n", "city:integer:n:city[name]", "memo:trash"],
        )
        .unwrap();

        assert_eq!(
            create_table(&spec).unwrap(),
            "CREATE TABLE station (stationid INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, city INTEGER NOT NULL, FOREIGN KEY (city) REFERENCES city(cityid))"
        );
        assert_eq!(
            insert_statement(&spec).unwrap(),
            "INSERT INTO station (name, city) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_passthrough_type_emitted_verbatim() {
        let spec = TableSpec::new(
            "kilo",
            vec![ColumnSpec::new("km", ColumnType::Passthrough("real".to_string()))],
        );
        assert_eq!(
            create_table(&spec).unwrap(),
            "CREATE TABLE kilo (kiloid INTEGER PRIMARY KEY AUTOINCREMENT, km real)"
        );
    }

    #[test]
    fn test_unsafe_passthrough_type_rejected() {
        let spec = TableSpec::new(
            "kilo",
            vec![ColumnSpec::new(
                "km",
                ColumnType::Passthrough("real); DROP TABLE kilo; --".to_string()),
            )],
        );
        assert!(matches!(
            create_table(&spec),
            Err(MksqlError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let spec = TableSpec::new("bad name", vec![]);
        assert!(matches!(
            create_table(&spec),
            Err(MksqlError::InvalidIdentifier(_))
        ));
    }
}
