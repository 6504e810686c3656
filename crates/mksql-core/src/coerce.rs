//! Raw cell to store value conversion

use crate::{ColumnSpec, ColumnType, MksqlError, Result, Value};

/// Outcome of coercing one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coerced {
    Value(Value),
    /// The column is `trash`; the field is not stored
    Dropped,
}

/// Convert a raw cell into a store value according to the column's declared
/// type and nullability.
///
/// An empty cell in a nullable `integer` column becomes `NULL`, but in a
/// `NOT NULL` column it becomes `0` rather than an error.
pub fn coerce(raw: &[u8], column: &ColumnSpec) -> Result<Coerced> {
    let value = match &column.declared_type {
        ColumnType::Trash => return Ok(Coerced::Dropped),
        ColumnType::Text | ColumnType::Passthrough(_) => {
            Value::String(decode(raw, column)?.to_string())
        }
        ColumnType::Integer => {
            let text = decode(raw, column)?;
            if text.is_empty() {
                if column.is_nullable() {
                    Value::Null
                } else {
                    Value::Int64(0)
                }
            } else {
                let parsed = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| MksqlError::InvalidInteger {
                        column: column.name.clone(),
                        value: text.to_string(),
                    })?;
                Value::Int64(parsed)
            }
        }
    };
    Ok(Coerced::Value(value))
}

/// Decode a cell as UTF-8. The error carries only the column; the loader adds
/// the table and line with [`MksqlError::with_location`].
pub fn decode<'a>(raw: &'a [u8], column: &ColumnSpec) -> Result<&'a str> {
    std::str::from_utf8(raw).map_err(|_| MksqlError::Encoding {
        table: String::new(),
        line: 0,
        column: column.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Constraints;
    use pretty_assertions::assert_eq;

    fn integer(nullable: bool) -> ColumnSpec {
        let flags = if nullable { "" } else { "n" };
        ColumnSpec::new("count", ColumnType::Integer)
            .with_constraints(Constraints::from_chars(flags))
    }

    #[test]
    fn test_empty_integer_nullable_is_null() {
        assert_eq!(coerce(b"", &integer(true)).unwrap(), Coerced::Value(Value::Null));
    }

    #[test]
    fn test_empty_integer_not_null_is_zero() {
        assert_eq!(coerce(b"", &integer(false)).unwrap(), Coerced::Value(Value::Int64(0)));
    }

    #[test]
    fn test_integer_parsed() {
        assert_eq!(coerce(b"42", &integer(true)).unwrap(), Coerced::Value(Value::Int64(42)));
        assert_eq!(coerce(b"-7", &integer(false)).unwrap(), Coerced::Value(Value::Int64(-7)));
        assert_eq!(coerce(b" 13 ", &integer(false)).unwrap(), Coerced::Value(Value::Int64(13)));
    }

    #[test]
    fn test_integer_garbage_rejected() {
        let err = coerce(b"twelve", &integer(true)).unwrap_err();
        assert!(matches!(err, MksqlError::InvalidInteger { ref value, .. } if value == "twelve"));
    }

    #[test]
    fn test_text_kept_as_is() {
        let column = ColumnSpec::new("name", ColumnType::Text);
        assert_eq!(
            coerce(" 東京 ".as_bytes(), &column).unwrap(),
            Coerced::Value(Value::String(" 東京 ".to_string()))
        );
        assert_eq!(
            coerce(b"", &column).unwrap(),
            Coerced::Value(Value::String(String::new()))
        );
    }

    #[test]
    fn test_text_invalid_utf8_rejected() {
        let column = ColumnSpec::new("name", ColumnType::Text);
        let err = coerce(&[0x66, 0xff, 0xfe], &column).unwrap_err();
        assert!(matches!(err, MksqlError::Encoding { ref column, .. } if column == "name"));
    }

    #[test]
    fn test_trash_dropped_regardless_of_content() {
        let column = ColumnSpec::new("memo", ColumnType::Trash);
        assert_eq!(coerce(b"anything", &column).unwrap(), Coerced::Dropped);
        assert_eq!(coerce(&[0xff], &column).unwrap(), Coerced::Dropped);
    }

    #[test]
    fn test_passthrough_unconverted() {
        let column = ColumnSpec::new("ratio", ColumnType::Passthrough("real".to_string()));
        assert_eq!(
            coerce(b"1.5", &column).unwrap(),
            Coerced::Value(Value::String("1.5".to_string()))
        );
    }
}
