//! Model code generation from a YAML schema file.
//!
//! The schema lists tables and their fields:
//!
//! ```yaml
//! tables:
//!   - name: users
//!     fields:
//!       - name: id
//!         type: integer
//!         primary_key: true
//!         auto_increment: true
//!       - name: name
//!         type: text
//!         nullable: false
//! ```
//!
//! [`generate`] emits one struct per table (singular PascalCase name, every
//! field an `Option`) together with a hand-rolled [`crate::Model`] impl.

use std::fmt::Write as _;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schema::{validate_identifier, DataType, Field};
use crate::value::Value;

fn default_nullable() -> bool {
    true
}

/// Top-level schema document.
#[derive(Debug, Deserialize)]
pub struct SchemaFile {
    pub tables: Vec<TableSchema>,
}

#[derive(Debug, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

impl FieldSchema {
    fn to_field(&self) -> Result<Field> {
        validate_identifier(&self.name)?;
        let mut field = Field::new(&self.name, self.data_type);
        if self.primary_key {
            field = field.primary_key();
        }
        if !self.nullable {
            field = field.not_null();
        }
        if self.unique {
            field = field.unique();
        }
        if self.auto_increment {
            field = field.auto_increment();
        }
        if let Some(default) = &self.default {
            field = field.default_value(yaml_default(default)?);
        }
        Ok(field)
    }
}

fn yaml_default(value: &serde_yaml::Value) -> Result<Value> {
    match value {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Boolean(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                Ok(Value::Real(n.as_f64().unwrap_or_default()))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::Text(s.clone())),
        other => Err(Error::Schema(format!(
            "unsupported default value: {other:?}"
        ))),
    }
}

/// Load and validate a schema file.
pub fn load_schema(path: &Path) -> Result<SchemaFile> {
    let text = std::fs::read_to_string(path)?;
    let schema: SchemaFile = serde_yaml::from_str(&text)?;
    validate(&schema)?;
    Ok(schema)
}

fn validate(schema: &SchemaFile) -> Result<()> {
    if schema.tables.is_empty() {
        return Err(Error::Schema("schema has no tables".to_string()));
    }
    let mut table_names = Vec::new();
    for table in &schema.tables {
        validate_identifier(&table.name)?;
        if table_names.contains(&table.name) {
            return Err(Error::Schema(format!("duplicate table '{}'", table.name)));
        }
        table_names.push(table.name.clone());

        if table.fields.is_empty() {
            return Err(Error::Schema(format!("table '{}' has no fields", table.name)));
        }
        let mut field_names = Vec::new();
        let mut primary_keys = 0;
        for field in &table.fields {
            validate_identifier(&field.name)?;
            if field_names.contains(&field.name) {
                return Err(Error::Schema(format!(
                    "duplicate field '{}' in table '{}'",
                    field.name, table.name
                )));
            }
            field_names.push(field.name.clone());
            if field.primary_key {
                primary_keys += 1;
            }
            if field.auto_increment && field.data_type != DataType::Integer {
                return Err(Error::Schema(format!(
                    "field '{}' in table '{}' cannot auto-increment a non-integer column",
                    field.name, table.name
                )));
            }
        }
        if primary_keys > 1 {
            return Err(Error::Schema(format!(
                "table '{}' declares more than one primary key",
                table.name
            )));
        }
    }
    Ok(())
}

/// Model struct name for a table: singular, PascalCase. Only a plural-style
/// trailing `s` is stripped; names ending in `ss` or `us` (`address`,
/// `status`) are kept as-is. Irregular plurals are not singularized.
fn struct_name(table: &str) -> String {
    let singular = table
        .strip_suffix('s')
        .filter(|s| !s.is_empty() && !s.ends_with('s') && !s.ends_with('u'))
        .unwrap_or(table);
    singular
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn value_expr(value: &Value) -> String {
    match value {
        Value::Null => "Value::Null".to_string(),
        Value::Integer(i) => format!("Value::Integer({i})"),
        Value::Real(r) => format!("Value::Real({r:?})"),
        Value::Text(s) => format!("Value::Text({s:?}.to_string())"),
        Value::Boolean(b) => format!("Value::Boolean({b})"),
        Value::Blob(_) => "Value::Null".to_string(),
    }
}

fn field_expr(field: &Field) -> String {
    let mut expr = format!(
        "Field::new({:?}, DataType::{:?})",
        field.name, field.data_type
    );
    if field.primary_key {
        expr.push_str(".primary_key()");
    }
    if !field.nullable {
        expr.push_str(".not_null()");
    }
    if field.unique {
        expr.push_str(".unique()");
    }
    if field.auto_increment {
        expr.push_str(".auto_increment()");
    }
    if let Some(default) = &field.default {
        let _ = write!(expr, ".default_value({})", value_expr(default));
    }
    expr
}

fn row_getter(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Integer => "get_i64",
        DataType::Text => "get_text",
        DataType::Real => "get_f64",
        DataType::Blob => "get_blob",
    }
}

/// Emit Rust source implementing [`crate::Model`] for every table.
pub fn generate(schema: &SchemaFile) -> Result<String> {
    validate(schema)?;

    let mut out = String::new();
    out.push_str("// Generated by `bmdb generate`; edit the schema file instead.\n\n");
    out.push_str("use bmdb::{DataType, Field, Model, Row, Value};\n");

    for table in &schema.tables {
        let name = struct_name(&table.name);
        let fields: Vec<Field> = table
            .fields
            .iter()
            .map(FieldSchema::to_field)
            .collect::<Result<_>>()?;
        let pk = fields.iter().find(|f| f.primary_key);

        out.push('\n');
        let _ = writeln!(out, "#[derive(Debug, Clone, Default, PartialEq)]");
        let _ = writeln!(out, "pub struct {name} {{");
        for field in &fields {
            let _ = writeln!(
                out,
                "    pub {}: Option<{}>,",
                field.name,
                field.data_type.rust_type()
            );
        }
        out.push_str("}\n\n");

        let _ = writeln!(out, "impl Model for {name} {{");
        let _ = writeln!(out, "    fn table_name() -> &'static str {{");
        let _ = writeln!(out, "        {:?}", table.name);
        out.push_str("    }\n\n");

        out.push_str("    fn fields() -> Vec<Field> {\n        vec![\n");
        for field in &fields {
            let _ = writeln!(out, "            {},", field_expr(field));
        }
        out.push_str("        ]\n    }\n\n");

        out.push_str("    fn values(&self) -> Vec<(String, Value)> {\n        vec![\n");
        for field in &fields {
            let _ = writeln!(
                out,
                "            ({:?}.to_string(), Value::from(self.{}.clone())),",
                field.name, field.name
            );
        }
        out.push_str("        ]\n    }\n\n");

        out.push_str("    fn from_row(row: &Row) -> bmdb::Result<Self> {\n        Ok(Self {\n");
        for field in &fields {
            let _ = writeln!(
                out,
                "            {}: row.{}({:?})?,",
                field.name,
                row_getter(field.data_type),
                field.name
            );
        }
        out.push_str("        })\n    }\n\n");

        out.push_str("    fn primary_key_value(&self) -> Option<Value> {\n");
        match pk {
            Some(pk) => {
                let _ = writeln!(out, "        self.{}.clone().map(Value::from)", pk.name);
            }
            None => out.push_str("        None\n"),
        }
        out.push_str("    }\n");

        if let Some(pk) = pk {
            if pk.auto_increment {
                out.push('\n');
                out.push_str("    fn set_rowid(&mut self, id: i64) {\n");
                let _ = writeln!(out, "        self.{} = Some(id);", pk.name);
                out.push_str("    }\n");
            }
        }

        out.push_str("}\n");
    }

    Ok(out)
}
