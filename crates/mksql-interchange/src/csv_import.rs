//! Annotated CSV table import
//!
//! One source file becomes one table. The first row is the header grammar,
//! rows starting with `#@` are directives, and every other non-blank row is
//! data. The whole table is loaded inside one transaction.

use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use mksql_core::{
    Coerced, Directive, ForeignKeyResolver, MksqlError, Result, Store, TableSpec, Value, coerce,
    coerce::decode, ddl, is_directive, parse_header,
};

/// Separator used when dumping a failing row to the log
const ROW_DUMP_SEPARATOR: &str = " @ ";

/// Result of importing one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    pub table: String,
    /// Rows inserted into the table
    pub rows_inserted: u64,
    /// Blank rows and directive rows passed over during insertion
    pub rows_skipped: u64,
    /// Directive statements executed after `CREATE TABLE`
    pub directives_applied: usize,
    /// Whether `<table>id` was generated
    pub synthetic_id: bool,
}

/// A source record with the line it started on
struct SourceRecord {
    line: u64,
    fields: ByteRecord,
}

impl SourceRecord {
    fn first_field(&self) -> &[u8] {
        self.fields.get(0).unwrap_or_default()
    }

    fn is_blank(&self) -> bool {
        self.first_field().is_empty()
    }

    fn is_directive(&self) -> bool {
        is_directive(self.first_field())
    }

    fn decode_all(&self, table: &str) -> Result<Vec<String>> {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                std::str::from_utf8(field)
                    .map(str::to_string)
                    .map_err(|_| MksqlError::Encoding {
                        table: table.to_string(),
                        line: self.line,
                        column: format!("#{}", idx + 1),
                    })
            })
            .collect()
    }

    /// Every field of the row, lossily decoded, for diagnostics
    fn dump(&self) -> String {
        self.fields
            .iter()
            .map(String::from_utf8_lossy)
            .collect::<Vec<_>>()
            .join(ROW_DUMP_SEPARATOR)
    }
}

/// Loads annotated CSV sources into a [`Store`]
pub struct CsvTableLoader<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> CsvTableLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Import `path` as table `table`
    pub fn load_file(&self, table: &str, path: &Path) -> Result<TableReport> {
        let file = std::fs::File::open(path)
            .map_err(|e| MksqlError::SourceNotFound(format!("{}: {}", path.display(), e)))?;
        tracing::info!(table = %table, path = %path.display(), "loading table");
        self.load_reader(table, file)
    }

    /// Import CSV text from any reader as table `table`
    pub fn load_reader<R: Read>(&self, table: &str, reader: R) -> Result<TableReport> {
        let mut records = read_records(table, reader)?.into_iter();

        let header = records
            .next()
            .ok_or_else(|| MksqlError::Grammar {
                table: table.to_string(),
                message: "source has no header row".to_string(),
            })?;
        let spec = parse_header(table, &header.decode_all(table)?)?;
        let rows: Vec<SourceRecord> = records.collect();

        // Everything that can fail on malformed input is checked before DDL runs
        let create_sql = ddl::create_table(&spec)?;
        let insert_sql = ddl::insert_statement(&spec)?;
        let directive_sql = collect_directives(table, &rows)?;

        self.store.begin()?;
        match self.apply(&spec, &create_sql, &directive_sql, &insert_sql, &rows) {
            Ok(report) => {
                self.store.commit()?;
                tracing::info!(
                    table = %table,
                    rows_inserted = report.rows_inserted,
                    rows_skipped = report.rows_skipped,
                    directives = report.directives_applied,
                    "table loaded"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::warn!(table = %table, error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    fn apply(
        &self,
        spec: &TableSpec,
        create_sql: &str,
        directive_sql: &[String],
        insert_sql: &str,
        rows: &[SourceRecord],
    ) -> Result<TableReport> {
        tracing::debug!(sql = %create_sql, "creating table");
        self.store.execute(create_sql, &[])?;

        for sql in directive_sql {
            tracing::debug!(sql = %sql, "applying directive");
            self.store.execute(sql, &[])?;
        }

        let mut report = TableReport {
            table: spec.name.clone(),
            directives_applied: directive_sql.len(),
            synthetic_id: spec.synthetic_id_added,
            ..Default::default()
        };

        tracing::debug!(sql = %insert_sql, "inserting rows");
        let resolver = ForeignKeyResolver::new(self.store);
        for record in rows {
            if record.is_blank() || record.is_directive() {
                report.rows_skipped += 1;
                continue;
            }

            let inserted = convert_row(spec, record, &resolver).and_then(|values| {
                tracing::trace!(
                    table = %spec.name,
                    line = record.line,
                    values = ?values,
                    "inserting row"
                );
                self.store.execute(insert_sql, &values)
            });
            if let Err(e) = inserted {
                tracing::error!(
                    table = %spec.name,
                    line = record.line,
                    row = %record.dump(),
                    error = %e,
                    "== Error occurred =="
                );
                return Err(e);
            }
            report.rows_inserted += 1;
        }

        Ok(report)
    }
}

/// Convert one data record into the values bound to the `INSERT`.
///
/// Trash fields are dropped, foreign-key fields are resolved against the
/// store and the rest are coerced by declared type.
fn convert_row<S: Store + ?Sized>(
    spec: &TableSpec,
    record: &SourceRecord,
    resolver: &ForeignKeyResolver<'_, S>,
) -> Result<Vec<Value>> {
    if record.fields.len() != spec.source_arity() {
        return Err(MksqlError::MalformedRow {
            table: spec.name.clone(),
            line: record.line,
            expected: spec.source_arity(),
            found: record.fields.len(),
        });
    }

    let mut values = Vec::with_capacity(spec.columns.len());
    for (column, raw) in spec.columns.iter().zip(record.fields.iter()) {
        if column.declared_type.is_trash() {
            continue;
        }
        let located = |e: MksqlError| e.with_location(&spec.name, record.line);
        let value = match &column.foreign_key {
            None => match coerce(raw, column).map_err(located)? {
                Coerced::Value(value) => value,
                Coerced::Dropped => continue,
            },
            Some(reference) => {
                let text = decode(raw, column).map_err(located)?;
                resolver.resolve(reference, text)?
            }
        };
        values.push(value);
    }
    Ok(values)
}

fn collect_directives(table: &str, rows: &[SourceRecord]) -> Result<Vec<String>> {
    let mut statements = Vec::new();
    for record in rows.iter().filter(|r| r.is_directive()) {
        let fields = record.decode_all(table)?;
        if let Some(directive) = Directive::parse(&fields)
            && let Some(sql) = directive.to_sql(table)?
        {
            statements.push(sql);
        }
    }
    Ok(statements)
}

fn read_records<R: Read>(table: &str, reader: R) -> Result<Vec<SourceRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut fields = ByteRecord::new();
    loop {
        let more = csv_reader
            .read_byte_record(&mut fields)
            .map_err(|e| MksqlError::Csv(format!("{}: {}", table, e)))?;
        if !more {
            break;
        }
        let line = fields.position().map(|p| p.line()).unwrap_or_default();
        records.push(SourceRecord {
            line,
            fields: fields.clone(),
        });
    }
    Ok(records)
}
