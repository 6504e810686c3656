//! Whole-database load
//!
//! Tables are loaded strictly in the configured order, each one committed
//! before the next starts so later tables can resolve foreign keys against
//! it. The order is not computed here: a table listed before a table it
//! references fails with `ReferenceNotFound`.

use mksql_core::{Result, Store};
use mksql_driver_sqlite::SqliteStore;

use crate::config::LoadConfig;
use crate::csv_import::{CsvTableLoader, TableReport};

/// Result of a full load run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Per-table results in load order
    pub tables: Vec<TableReport>,
    /// Views created after the tables
    pub views: Vec<String>,
}

impl LoadReport {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }
}

/// Runs a [`LoadConfig`] against a store
pub struct Orchestrator<'a, S: Store + ?Sized> {
    store: &'a S,
    config: &'a LoadConfig,
}

impl<'a, S: Store + ?Sized> Orchestrator<'a, S> {
    pub fn new(store: &'a S, config: &'a LoadConfig) -> Self {
        Self { store, config }
    }

    /// Load every configured table, then create the views
    pub fn run(&self) -> Result<LoadReport> {
        self.config.validate()?;

        let total = self.config.tables.len();
        let loader = CsvTableLoader::new(self.store);
        let mut report = LoadReport::default();

        for (idx, source) in self.config.tables.iter().enumerate() {
            let path = source.resolve_path(&self.config.data_dir);
            tracing::debug!(
                table = %source.name,
                index = idx + 1,
                total,
                "starting table"
            );
            report.tables.push(loader.load_file(&source.name, &path)?);
        }

        report.views = self.create_views()?;
        Ok(report)
    }

    fn create_views(&self) -> Result<Vec<String>> {
        let mut created = Vec::with_capacity(self.config.views.len());
        self.store.begin()?;
        for view in &self.config.views {
            let sql = view.create_sql();
            tracing::debug!(view = %view.name, sql = %sql, "creating view");
            if let Err(e) = self.store.execute(&sql, &[]) {
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::warn!(view = %view.name, error = %rollback_err, "rollback failed");
                }
                return Err(e);
            }
            created.push(view.name.clone());
        }
        self.store.commit()?;
        Ok(created)
    }
}

/// Recreate the SQLite database named by `config.database` and load it.
///
/// On failure the partially built database is left on disk for inspection.
pub fn build_database(config: &LoadConfig) -> Result<LoadReport> {
    let store = SqliteStore::create(&config.database)?;
    let report = Orchestrator::new(&store, config).run()?;
    store.close()?;

    tracing::info!(
        database = %config.database.display(),
        tables = report.tables.len(),
        rows = report.total_rows(),
        views = report.views.len(),
        "database built"
    );
    Ok(report)
}
