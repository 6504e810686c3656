//! SQLite store connection

use std::path::{Path, PathBuf};

use mksql_core::{MksqlError, Result, Store, Value};
use rusqlite::{Connection as RusqliteConnection, OpenFlags, OptionalExtension, params_from_iter};

/// Path that opens a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// SQLite database being built by a load run
pub struct SqliteStore {
    conn: RusqliteConnection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create a fresh database at `path`, removing any existing file first.
    ///
    /// `:memory:` opens an in-memory database instead.
    pub fn create(path: &Path) -> Result<Self> {
        if path == Path::new(MEMORY_PATH) {
            return Self::open_in_memory();
        }

        tracing::info!(path = %path.display(), "creating SQLite database");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(MksqlError::Store(format!(
                "Parent directory does not exist: {}",
                parent.display()
            )));
        }

        if path.exists() {
            tracing::debug!(path = %path.display(), "removing existing database");
            std::fs::remove_file(path)?;
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = RusqliteConnection::open_with_flags(path, flags).map_err(|e| {
            MksqlError::Store(format!(
                "Failed to open SQLite database at '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::configure(conn, Some(path.to_path_buf()))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        tracing::info!("creating in-memory SQLite database");
        let conn = RusqliteConnection::open_in_memory().map_err(|e| {
            MksqlError::Store(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::configure(conn, None)
    }

    fn configure(conn: RusqliteConnection, path: Option<PathBuf>) -> Result<Self> {
        // PRAGMA commands return results, so use pragma_update
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| MksqlError::Store(format!("Failed to enable foreign keys: {}", e)))?;
        Ok(Self { conn, path })
    }

    /// Location of the database file, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, surfacing any error SQLite reports on close
    pub fn close(self) -> Result<()> {
        tracing::debug!("closing SQLite database");
        self.conn
            .close()
            .map_err(|(_, e)| MksqlError::Store(format!("Failed to close database: {}", e)))
    }

    /// Borrow the underlying connection, for read-back queries in tests and reports
    pub fn connection(&self) -> &RusqliteConnection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn driver_name(&self) -> &str {
        "sqlite"
    }

    #[tracing::instrument(
        level = "trace",
        skip(self, sql, params),
        fields(sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64> {
        let rusqlite_params = values_to_rusqlite(params);

        let rows_affected = self
            .conn
            .execute(sql, params_from_iter(rusqlite_params.iter()))
            .map_err(|e| {
                MksqlError::Store(format!("Failed to execute statement '{}': {}", sql, e))
            })?;

        tracing::trace!(affected_rows = rows_affected, "statement executed");
        Ok(rows_affected as u64)
    }

    #[tracing::instrument(
        level = "trace",
        skip(self, sql, params),
        fields(sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    fn query_first(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
        let rusqlite_params = values_to_rusqlite(params);

        let mut stmt = self
            .conn
            .prepare_cached(sql)
            .map_err(|e| MksqlError::Store(format!("Failed to prepare query '{}': {}", sql, e)))?;

        stmt.query_row(params_from_iter(rusqlite_params.iter()), |row| {
            row.get::<_, rusqlite::types::Value>(0)
        })
        .optional()
        .map(|value| value.map(rusqlite_to_value))
        .map_err(|e| MksqlError::Store(format!("Failed to execute query '{}': {}", sql, e)))
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self.query_first(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?",
            &[Value::String(table.to_string())],
        )?;
        Ok(found.is_some())
    }

    fn begin(&self) -> Result<()> {
        tracing::debug!("beginning SQLite transaction");
        // DEFERRED means the write lock is only acquired when the first write occurs
        self.conn
            .execute_batch("BEGIN DEFERRED")
            .map_err(|e| MksqlError::Store(format!("Failed to begin transaction: {}", e)))
    }

    fn commit(&self) -> Result<()> {
        tracing::debug!("committing SQLite transaction");
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| MksqlError::Store(format!("Failed to commit transaction: {}", e)))
    }

    fn rollback(&self) -> Result<()> {
        tracing::debug!("rolling back SQLite transaction");
        if self.conn.is_autocommit() {
            return Ok(());
        }
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| MksqlError::Store(format!("Failed to rollback transaction: {}", e)))
    }
}

fn values_to_rusqlite(params: &[Value]) -> Vec<rusqlite::types::Value> {
    params.iter().map(value_to_rusqlite).collect()
}

fn value_to_rusqlite(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Int64(i) => rusqlite::types::Value::Integer(*i),
        Value::String(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

fn rusqlite_to_value(value: rusqlite::types::Value) -> Value {
    match value {
        rusqlite::types::Value::Null => Value::Null,
        rusqlite::types::Value::Integer(i) => Value::Int64(i),
        rusqlite::types::Value::Real(f) => Value::String(f.to_string()),
        rusqlite::types::Value::Text(s) => Value::String(s),
        rusqlite::types::Value::Blob(b) => Value::String(String::from_utf8_lossy(&b).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ares.sqlite");

        {
            let store = SqliteStore::create(&path).unwrap();
            store.execute("CREATE TABLE stale (x INTEGER)", &[]).unwrap();
            store.close().unwrap();
        }

        let store = SqliteStore::create(&path).unwrap();
        assert!(!store.table_exists("stale").unwrap());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_parent_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("ares.sqlite");
        assert!(matches!(SqliteStore::create(&path), Err(MksqlError::Store(_))));
    }

    #[test]
    fn test_memory_path_opens_in_memory() {
        let store = SqliteStore::create(Path::new(MEMORY_PATH)).unwrap();
        assert_eq!(store.path(), None);
        assert_eq!(store.driver_name(), "sqlite");
    }

    #[test]
    fn test_execute_and_query_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute(
                "CREATE TABLE city (cityid INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
                &[],
            )
            .unwrap();
        let inserted = store
            .execute(
                "INSERT INTO city (name) VALUES (?)",
                &[Value::String("Tokyo".to_string())],
            )
            .unwrap();
        assert_eq!(inserted, 1);

        let id = store
            .query_first(
                "SELECT cityid FROM city WHERE name = ?",
                &[Value::String("Tokyo".to_string())],
            )
            .unwrap();
        assert_eq!(id, Some(Value::Int64(1)));

        let missing = store
            .query_first(
                "SELECT cityid FROM city WHERE name = ?",
                &[Value::String("Osaka".to_string())],
            )
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute("CREATE TABLE city (cityid INTEGER PRIMARY KEY)", &[])
            .unwrap();
        store
            .execute(
                "CREATE TABLE station (city INTEGER, FOREIGN KEY (city) REFERENCES city(cityid))",
                &[],
            )
            .unwrap();

        let result = store.execute("INSERT INTO station (city) VALUES (?)", &[Value::Int64(9)]);
        assert!(matches!(result, Err(MksqlError::Store(_))));
    }

    #[test]
    fn test_rollback_discards_transaction() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.begin().unwrap();
        store.execute("CREATE TABLE t (x INTEGER)", &[]).unwrap();
        store.rollback().unwrap();

        assert!(!store.table_exists("t").unwrap());
        // rollback outside a transaction is a no-op
        store.rollback().unwrap();
    }
}
