//! Destination store trait

use crate::{Result, Value};

/// The relational database being populated.
///
/// Loading is strictly sequential, so the trait is synchronous and takes
/// `&self`; drivers serialize access internally.
pub trait Store {
    /// Get the driver name (e.g., "sqlite")
    fn driver_name(&self) -> &str;

    /// Execute a statement (DDL or INSERT), returning the affected row count
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Run a query and return the first column of its first row, if any
    fn query_first(&self, sql: &str, params: &[Value]) -> Result<Option<Value>>;

    /// Returns true if a table with the given name exists in the store
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Start a transaction scope
    fn begin(&self) -> Result<()>;

    /// Commit the current transaction scope
    fn commit(&self) -> Result<()>;

    /// Roll back the current transaction scope
    fn rollback(&self) -> Result<()>;
}
