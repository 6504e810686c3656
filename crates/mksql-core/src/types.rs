//! Column, table and value types shared by the loader

/// A store-ready cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// NULL value
    Null,
    /// 64-bit signed integer
    Int64(i64),
    /// UTF-8 string
    String(String),
}

impl Value {
    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Declared type of a column in the header grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    /// Read from the source but never stored
    Trash,
    /// Unknown type token, kept verbatim in DDL and stored unconverted
    Passthrough(String),
}

impl ColumnType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "text" => ColumnType::Text,
            "integer" => ColumnType::Integer,
            "trash" => ColumnType::Trash,
            other => ColumnType::Passthrough(other.to_string()),
        }
    }

    /// SQL type used in the generated `CREATE TABLE`
    pub fn sql_type(&self) -> &str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Trash => "",
            ColumnType::Passthrough(token) => token,
        }
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, ColumnType::Trash)
    }
}

/// Constraint flags from the third header segment (`p`, `n`, `u`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
}

impl Constraints {
    pub fn from_chars(chars: &str) -> Self {
        Self {
            primary_key: chars.contains('p'),
            not_null: chars.contains('n'),
            unique: chars.contains('u'),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !self.not_null
    }

    /// `NOT NULL` / `UNIQUE` suffix for a column clause
    pub fn sql_suffix(&self) -> String {
        let mut parts = Vec::new();
        if self.not_null {
            parts.push("NOT NULL");
        }
        if self.unique {
            parts.push("UNIQUE");
        }
        parts.join(" ")
    }
}

/// Reference from a column to `table[column]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub target_table: String,
    /// Column matched against the cell text during resolution
    pub target_column: String,
}

impl ForeignKeyRef {
    /// Identifier column of the target table (`<table>id`).
    ///
    /// Both the lookup result and the `REFERENCES` clause use this column,
    /// whatever `target_column` says.
    pub fn id_column(&self) -> String {
        identifier_column(&self.target_table)
    }
}

/// Name of the identifier column for a table (`<table>id`)
pub fn identifier_column(table: &str) -> String {
    format!("{}id", table)
}

/// One annotated header cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub declared_type: ColumnType,
    pub constraints: Constraints,
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, declared_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            constraints: Constraints::default(),
            foreign_key: None,
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_foreign_key(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.foreign_key = Some(ForeignKeyRef {
            target_table: table.into(),
            target_column: column.into(),
        });
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.constraints.is_nullable()
    }
}

/// Table schema derived from a parsed header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    /// Every header column, trash included, in source order
    pub columns: Vec<ColumnSpec>,
    /// Declared primary-key columns in header order
    pub primary_key_columns: Vec<String>,
    /// True when no column is flagged `p` and `<table>id` is generated
    pub synthetic_id_added: bool,
}

impl TableSpec {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        let primary_key_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.constraints.primary_key)
            .map(|c| c.name.clone())
            .collect();
        let synthetic_id_added = primary_key_columns.is_empty();
        Self {
            name: name.into(),
            columns,
            primary_key_columns,
            synthetic_id_added,
        }
    }

    /// Columns that reach the store (trash removed, synthetic key excluded)
    pub fn stored_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.declared_type.is_trash())
    }

    pub fn stored_column_names(&self) -> Vec<&str> {
        self.stored_columns().map(|c| c.name.as_str()).collect()
    }

    /// Number of fields every data row must carry
    pub fn source_arity(&self) -> usize {
        self.columns.len()
    }

    pub fn synthetic_id_column(&self) -> Option<String> {
        self.synthetic_id_added
            .then(|| identifier_column(&self.name))
    }
}
