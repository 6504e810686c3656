//! Foreign-key value resolution
//!
//! A foreign-key cell holds a human-readable value of the referenced table
//! (a city name, say). The resolver finds the row of the target table whose
//! lookup column equals that value and returns the row's `<table>id`.

use crate::identifier::validate_identifier;
use crate::{ForeignKeyRef, MksqlError, Result, Store, Value};

/// Cell text that resolves to NULL without a lookup (compared case-insensitively)
pub const NULL_TOKEN: &str = "NULL";

/// Looks up foreign-key identifiers in tables already loaded into the store.
///
/// Tables must be loaded in dependency order; a target table that has not
/// been loaded yet is reported as [`MksqlError::ReferenceNotFound`] like any
/// other missing value.
pub struct ForeignKeyResolver<'a, S: Store + ?Sized> {
    store: &'a S,
}

impl<'a, S: Store + ?Sized> ForeignKeyResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve `value` against `reference.target_table[reference.target_column]`.
    pub fn resolve(&self, reference: &ForeignKeyRef, value: &str) -> Result<Value> {
        if value.is_empty() || value.eq_ignore_ascii_case(NULL_TOKEN) {
            return Ok(Value::Null);
        }

        let table = validate_identifier(&reference.target_table)?;
        let column = validate_identifier(&reference.target_column)?;

        if !self.store.table_exists(table)? {
            tracing::debug!(table = %table, "foreign key target table is not loaded");
            return Err(not_found(reference, value));
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            reference.id_column(),
            table,
            column
        );
        match self
            .store
            .query_first(&sql, &[Value::String(value.to_string())])?
        {
            Some(id) => Ok(id),
            None => Err(not_found(reference, value)),
        }
    }
}

fn not_found(reference: &ForeignKeyRef, value: &str) -> MksqlError {
    MksqlError::ReferenceNotFound {
        value: value.to_string(),
        table: reference.target_table.clone(),
        column: reference.target_column.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// A store holding a single `city` table keyed by name
    struct CityStore {
        cities: HashMap<String, i64>,
        queries: RefCell<Vec<String>>,
    }

    impl CityStore {
        fn new() -> Self {
            Self {
                cities: HashMap::from([("Tokyo".to_string(), 3), ("Kyoto".to_string(), 5)]),
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl Store for CityStore {
        fn driver_name(&self) -> &str {
            "mock"
        }

        fn execute(&self, _sql: &str, _params: &[Value]) -> Result<u64> {
            Ok(0)
        }

        fn query_first(&self, sql: &str, params: &[Value]) -> Result<Option<Value>> {
            self.queries.borrow_mut().push(sql.to_string());
            let name = params[0].as_str().unwrap_or_default();
            Ok(self.cities.get(name).map(|id| Value::Int64(*id)))
        }

        fn table_exists(&self, table: &str) -> Result<bool> {
            Ok(table == "city")
        }

        fn begin(&self) -> Result<()> {
            Ok(())
        }

        fn commit(&self) -> Result<()> {
            Ok(())
        }

        fn rollback(&self) -> Result<()> {
            Ok(())
        }
    }

    fn city_name() -> ForeignKeyRef {
        ForeignKeyRef {
            target_table: "city".to_string(),
            target_column: "name".to_string(),
        }
    }

    #[test]
    fn test_resolves_existing_value() {
        let store = CityStore::new();
        let resolver = ForeignKeyResolver::new(&store);

        assert_eq!(resolver.resolve(&city_name(), "Tokyo").unwrap(), Value::Int64(3));
        assert_eq!(
            store.queries.borrow().as_slice(),
            ["SELECT cityid FROM city WHERE name = ?"]
        );
    }

    #[test]
    fn test_missing_value_is_reference_not_found() {
        let store = CityStore::new();
        let err = ForeignKeyResolver::new(&store)
            .resolve(&city_name(), "Osaka")
            .unwrap_err();

        match err {
            MksqlError::ReferenceNotFound { value, table, column } => {
                assert_eq!(value, "Osaka");
                assert_eq!(table, "city");
                assert_eq!(column, "name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let store = CityStore::new();
        let result = ForeignKeyResolver::new(&store).resolve(&city_name(), "tokyo");
        assert!(matches!(result, Err(MksqlError::ReferenceNotFound { .. })));
    }

    #[test]
    fn test_null_tokens_skip_lookup() {
        let store = CityStore::new();
        let resolver = ForeignKeyResolver::new(&store);

        for cell in ["", "NULL", "null", "Null"] {
            assert_eq!(resolver.resolve(&city_name(), cell).unwrap(), Value::Null);
        }
        assert!(store.queries.borrow().is_empty());
    }

    #[test]
    fn test_unloaded_target_table_is_reference_not_found() {
        let store = CityStore::new();
        let reference = ForeignKeyRef {
            target_table: "line".to_string(),
            target_column: "name".to_string(),
        };
        let err = ForeignKeyResolver::new(&store)
            .resolve(&reference, "Yamanote")
            .unwrap_err();
        assert!(matches!(err, MksqlError::ReferenceNotFound { ref table, .. } if table == "line"));
    }
}
