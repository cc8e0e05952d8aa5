//! Dynamic value and row types for SQLite operations.

use std::fmt;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::error::{Error, Result};

/// Core value type bridging Rust values and SQLite storage classes.
///
/// `Boolean` is accepted on the way in and stored as INTEGER; rows read
/// back from the database never contain it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Boolean(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*b as i64)),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Blob(b) => {
                write!(f, "x'")?;
                for byte in b {
                    write!(f, "{byte:02x}")?;
                }
                write!(f, "'")
            }
        }
    }
}

/// One result row: column names in statement order plus their values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        // Bounds-checked so a caller-built ragged row cannot panic here.
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    fn required(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| Error::MissingColumn(column.to_string()))
    }

    /// Read an INTEGER column; NULL maps to `None`.
    pub fn get_i64(&self, column: &str) -> Result<Option<i64>> {
        match self.required(column)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i)),
            _ => Err(Error::ColumnType {
                column: column.to_string(),
                expected: "INTEGER",
            }),
        }
    }

    /// Read a REAL column; INTEGER values are widened.
    pub fn get_f64(&self, column: &str) -> Result<Option<f64>> {
        match self.required(column)? {
            Value::Null => Ok(None),
            Value::Real(r) => Ok(Some(*r)),
            Value::Integer(i) => Ok(Some(*i as f64)),
            _ => Err(Error::ColumnType {
                column: column.to_string(),
                expected: "REAL",
            }),
        }
    }

    /// Read a TEXT column; NULL maps to `None`.
    pub fn get_text(&self, column: &str) -> Result<Option<String>> {
        match self.required(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            _ => Err(Error::ColumnType {
                column: column.to_string(),
                expected: "TEXT",
            }),
        }
    }

    /// Read a BLOB column; NULL maps to `None`.
    pub fn get_blob(&self, column: &str) -> Result<Option<Vec<u8>>> {
        match self.required(column)? {
            Value::Null => Ok(None),
            Value::Blob(b) => Ok(Some(b.clone())),
            _ => Err(Error::ColumnType {
                column: column.to_string(),
                expected: "BLOB",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row::new(
            vec!["id".into(), "name".into(), "age".into()],
            vec![Value::Integer(1), Value::Text("Alice".into()), Value::Null],
        )
    }

    #[test]
    fn typed_getters() {
        let row = sample_row();
        assert_eq!(row.get_i64("id").unwrap(), Some(1));
        assert_eq!(row.get_text("name").unwrap(), Some("Alice".to_string()));
        assert_eq!(row.get_i64("age").unwrap(), None);
    }

    #[test]
    fn missing_column_is_an_error() {
        let row = sample_row();
        assert!(matches!(
            row.get_i64("email"),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn type_mismatch_names_the_column() {
        let row = sample_row();
        let err = row.get_i64("name").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn ragged_row_yields_none_instead_of_panicking() {
        let row = Row::new(
            vec!["id".into(), "name".into()],
            vec![Value::Integer(1)],
        );
        assert_eq!(row.get("id"), Some(&Value::Integer(1)));
        assert_eq!(row.get("name"), None);
        assert!(matches!(row.get_text("name"), Err(Error::MissingColumn(_))));
    }

    #[test]
    fn option_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(7i64)), Value::Integer(7));
    }

    #[test]
    fn blob_display_is_hex() {
        assert_eq!(Value::Blob(vec![0xde, 0xad]).to_string(), "x'dead'");
    }
}
