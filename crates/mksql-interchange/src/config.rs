//! Load configuration
//!
//! A [`LoadConfig`] is built once (defaults, then an optional TOML file, then
//! command-line overrides), validated, and handed to the orchestrator by
//! reference. Nothing here is global.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use mksql_core::identifier::is_identifier;
use mksql_core::{MksqlError, Result};
use serde::Deserialize;

use crate::views::default_views;

/// Default output database
pub const DEFAULT_DATABASE: &str = "ares.sqlite";

/// Default directory holding `<table>.csv` sources
pub const DEFAULT_DATA_DIR: &str = "data";

/// Tables loaded by default, each after every table it references
pub const DEFAULT_TABLES: &[&str] = &[
    "company",
    "densha",
    "urban",
    "station",
    "line",
    "city",
    "kilo",
    "fare",
    "fare_country",
    "fare_special",
];

/// One table to load
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSource {
    pub name: String,
    /// Explicit source file; defaults to `<data_dir>/<name>.csv`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl TableSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Source file for this table
    pub fn resolve_path(&self, data_dir: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => data_dir.join(format!("{}.csv", self.name)),
        }
    }
}

/// A view created after every table has been loaded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewDefinition {
    pub name: String,
    /// The `SELECT` the view is defined by
    pub query: String,
}

impl ViewDefinition {
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
        }
    }

    pub fn create_sql(&self) -> String {
        format!("CREATE VIEW {} AS {}", self.name, self.query)
    }
}

/// Everything a load run needs to know
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadConfig {
    /// Output database, recreated on every run (`:memory:` allowed)
    pub database: PathBuf,
    pub data_dir: PathBuf,
    /// Tables in load order
    pub tables: Vec<TableSource>,
    pub views: Vec<ViewDefinition>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            tables: DEFAULT_TABLES.iter().map(|name| TableSource::new(*name)).collect(),
            views: default_views(),
        }
    }
}

impl LoadConfig {
    /// Parse a TOML configuration; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MksqlError::Configuration(e.to_string()))
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MksqlError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;

        // Relative paths in the file are relative to the file itself
        if let Some(base) = path.parent() {
            config.data_dir = base.join(&config.data_dir);
            for table in &mut config.tables {
                if let Some(source) = &table.path {
                    table.path = Some(base.join(source));
                }
            }
        }
        Ok(config)
    }

    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_tables(mut self, tables: Vec<TableSource>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_views(mut self, views: Vec<ViewDefinition>) -> Self {
        self.views = views;
        self
    }

    /// Check table and view names before anything touches the store
    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(MksqlError::Configuration("no tables configured".into()));
        }

        let mut seen = HashSet::new();
        let names = self
            .tables
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.views.iter().map(|v| v.name.as_str()));
        for name in names {
            if !is_identifier(name) {
                return Err(MksqlError::Configuration(format!(
                    "'{}' is not a valid table or view name",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(MksqlError::Configuration(format!(
                    "'{}' is configured more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}
