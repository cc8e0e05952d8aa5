//! Schema primitives: column types, field definitions, and table specs.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::value::Value;

/// SQLite storage classes supported by the schema layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
}

impl DataType {
    pub fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
            DataType::Blob => "BLOB",
        }
    }

    /// Rust type the code generator maps this column to.
    pub fn rust_type(self) -> &'static str {
        match self {
            DataType::Integer => "i64",
            DataType::Text => "String",
            DataType::Real => "f64",
            DataType::Blob => "Vec<u8>",
        }
    }
}

/// One column definition, translated directly to a column fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
    pub nullable: bool,
    pub unique: bool,
    pub auto_increment: bool,
    pub default: Option<Value>,
}

impl Field {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            primary_key: false,
            nullable: true,
            unique: false,
            auto_increment: false,
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Render the column definition fragment.
    pub fn to_sql(&self) -> Result<String> {
        validate_identifier(&self.name)?;
        let mut parts = vec![self.name.clone(), self.data_type.as_sql().to_string()];
        if self.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        if !self.nullable {
            parts.push("NOT NULL".to_string());
        }
        if self.unique {
            parts.push("UNIQUE".to_string());
        }
        if let Some(default) = &self.default {
            parts.push(format!("DEFAULT {}", sql_literal(default)?));
        }
        if self.auto_increment {
            parts.push("AUTOINCREMENT".to_string());
        }
        Ok(parts.join(" "))
    }
}

/// A table name plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub name: String,
    pub fields: Vec<Field>,
}

impl TableSpec {
    pub fn new(name: &str, fields: Vec<Field>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Render a `CREATE TABLE IF NOT EXISTS` statement.
    pub fn create_sql(&self) -> Result<String> {
        validate_identifier(&self.name)?;
        if self.fields.is_empty() {
            return Err(Error::Schema(format!("table '{}' has no fields", self.name)));
        }
        let columns: Vec<String> = self
            .fields
            .iter()
            .map(Field::to_sql)
            .collect::<Result<_>>()?;
        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            columns.join(", ")
        ))
    }
}

/// Render a default value as a SQL literal.
fn sql_literal(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Boolean(b) => (*b as i64).to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Blob(_) => {
            return Err(Error::Schema("blob defaults are not supported".to_string()))
        }
    })
}

/// Table and column names are interpolated into SQL, so they are restricted
/// to `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::Schema(format!("invalid identifier: '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_fragment_order() {
        let field = Field::new("id", DataType::Integer)
            .primary_key()
            .auto_increment();
        assert_eq!(field.to_sql().unwrap(), "id INTEGER PRIMARY KEY AUTOINCREMENT");
    }

    #[test]
    fn field_with_all_flags() {
        let field = Field::new("status", DataType::Text)
            .not_null()
            .unique()
            .default_value(Value::from("active"));
        assert_eq!(
            field.to_sql().unwrap(),
            "status TEXT NOT NULL UNIQUE DEFAULT 'active'"
        );
    }

    #[test]
    fn text_default_escapes_quotes() {
        let field = Field::new("note", DataType::Text).default_value(Value::from("it's"));
        assert_eq!(field.to_sql().unwrap(), "note TEXT DEFAULT 'it''s'");
    }

    #[test]
    fn create_sql_joins_fields() {
        let spec = TableSpec::new(
            "users",
            vec![
                Field::new("id", DataType::Integer).primary_key().auto_increment(),
                Field::new("name", DataType::Text).not_null(),
                Field::new("age", DataType::Integer),
            ],
        );
        assert_eq!(
            spec.create_sql().unwrap(),
            "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, age INTEGER)"
        );
    }

    #[test]
    fn empty_table_is_rejected() {
        let spec = TableSpec::new("empty", vec![]);
        assert!(spec.create_sql().is_err());
    }

    #[test]
    fn identifier_validation() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("_hidden2").is_ok());
        assert!(validate_identifier("1bad").is_err());
        assert!(validate_identifier("drop table").is_err());
        assert!(validate_identifier("").is_err());
    }
}
