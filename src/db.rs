//! Single-connection SQLite wrapper.
//!
//! Accepts `sqlite:///` connection strings or bare paths and marshals every
//! result row into [`Row`] so callers never touch rusqlite types directly.

use std::path::Path;

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::query::Table;
use crate::schema::validate_identifier;
use crate::value::{Row, Value};

/// Options for a composed SELECT, mirroring what the query builder collects.
#[derive(Debug, Default, Clone)]
pub struct Select {
    /// Columns to project; `None` selects `*`.
    pub columns: Option<Vec<String>>,
    /// WHERE clause body with `?` placeholders.
    pub filter: Option<String>,
    pub params: Vec<Value>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Column metadata reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

/// Result of running an arbitrary statement.
#[derive(Debug)]
pub enum StatementOutput {
    /// The statement produced a result set.
    Rows(Vec<Row>),
    /// The statement changed this many rows.
    Changed(usize),
}

/// Wrapper around one SQLite connection.
#[derive(Debug)]
pub struct Bmdb {
    connection: Connection,
    target: String,
}

impl Bmdb {
    /// Open a database from a connection string or bare path.
    ///
    /// Accepted forms: `sqlite:///path/to.db`, `sqlite:///:memory:`,
    /// `:memory:`, or a plain filesystem path. Parent directories of a file
    /// path are created on demand.
    pub fn open(target: &str) -> Result<Self> {
        let path = if let Some(rest) = target.strip_prefix("sqlite:///") {
            rest
        } else if target.contains("://") {
            return Err(Error::UnsupportedScheme(target.to_string()));
        } else {
            target
        };

        if path == ":memory:" {
            return Self::open_in_memory();
        }

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let connection = Connection::open(path)?;
        info!("connected to sqlite database at {path}");
        Ok(Self {
            connection,
            target: path.to_string(),
        })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        info!("connected to in-memory sqlite database");
        Ok(Self {
            connection,
            target: ":memory:".to_string(),
        })
    }

    /// The resolved path this connection was opened on.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.connection
    }

    /// Execute a statement that returns no rows; yields the affected count.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        debug!("executing sql: {sql}");
        Ok(self.connection.execute(sql, params_from_iter(params))?)
    }

    /// Execute a query and marshal every row.
    pub fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        debug!("querying sql: {sql}");
        let mut stmt = self.connection.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                values.push(Value::from(row.get_ref(i)?));
            }
            out.push(Row::new(columns.clone(), values));
        }
        Ok(out)
    }

    /// Run an arbitrary statement, dispatching on whether it produces
    /// columns. Used by the shell and the `query` CLI command.
    pub fn run_statement(&self, sql: &str) -> Result<StatementOutput> {
        let column_count = self.connection.prepare(sql)?.column_count();
        if column_count > 0 {
            Ok(StatementOutput::Rows(self.query(sql, &[])?))
        } else {
            Ok(StatementOutput::Changed(self.execute(sql, &[])?))
        }
    }

    /// Create a table from raw `(column, type-fragment)` pairs.
    pub fn create_table(&self, name: &str, columns: &[(&str, &str)]) -> Result<()> {
        validate_identifier(name)?;
        let defs: Vec<String> = columns
            .iter()
            .map(|(col, ty)| {
                validate_identifier(col)?;
                Ok(format!("{col} {ty}"))
            })
            .collect::<Result<_>>()?;
        let sql = format!("CREATE TABLE IF NOT EXISTS {name} ({})", defs.join(", "));
        self.execute(&sql, &[])?;
        info!("created table {name}");
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        validate_identifier(name)?;
        self.execute(&format!("DROP TABLE IF EXISTS {name}"), &[])?;
        info!("dropped table {name}");
        Ok(())
    }

    /// Insert one row; returns the new rowid.
    pub fn insert(&self, table: &str, data: &[(String, Value)]) -> Result<i64> {
        let columns: Vec<&str> = data.iter().map(|(c, _)| c.as_str()).collect();
        let placeholders: Vec<&str> = data.iter().map(|_| "?").collect();
        let params: Vec<Value> = data.iter().map(|(_, v)| v.clone()).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        self.execute(&sql, &params)?;
        Ok(self.connection.last_insert_rowid())
    }

    /// Run a composed SELECT against one table.
    pub fn select(&self, table: &str, options: &Select) -> Result<Vec<Row>> {
        let columns = match &options.columns {
            Some(cols) => cols.join(", "),
            None => "*".to_string(),
        };
        let mut sql = format!("SELECT {columns} FROM {table}");
        if let Some(filter) = &options.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }
        if let Some(order) = &options.order_by {
            sql.push_str(&format!(" ORDER BY {order}"));
        }
        match (options.limit, options.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite requires a LIMIT clause before OFFSET; -1 means unbounded.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        self.query(&sql, &options.params)
    }

    /// Update rows matching `filter`; returns the affected count.
    pub fn update(
        &self,
        table: &str,
        data: &[(String, Value)],
        filter: &str,
        params: &[Value],
    ) -> Result<usize> {
        let assignments: Vec<String> = data.iter().map(|(c, _)| format!("{c} = ?")).collect();
        let mut bound: Vec<Value> = data.iter().map(|(_, v)| v.clone()).collect();
        bound.extend_from_slice(params);
        let sql = format!(
            "UPDATE {table} SET {} WHERE {filter}",
            assignments.join(", ")
        );
        self.execute(&sql, &bound)
    }

    /// Delete rows matching `filter`; returns the affected count.
    pub fn delete(&self, table: &str, filter: &str, params: &[Value]) -> Result<usize> {
        let sql = format!("DELETE FROM {table} WHERE {filter}");
        self.execute(&sql, params)
    }

    /// Names of all user tables.
    pub fn tables(&self) -> Result<Vec<String>> {
        let rows = self.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            &[],
        )?;
        rows.iter()
            .map(|row| {
                row.get_text("name")?
                    .ok_or_else(|| Error::MissingColumn("name".to_string()))
            })
            .collect()
    }

    /// Column metadata for one table via `PRAGMA table_info`.
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        validate_identifier(table)?;
        let rows = self.query(&format!("PRAGMA table_info({table})"), &[])?;
        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: row
                        .get_text("name")?
                        .ok_or_else(|| Error::MissingColumn("name".to_string()))?,
                    data_type: row.get_text("type")?.unwrap_or_default(),
                    not_null: row.get_i64("notnull")?.unwrap_or(0) != 0,
                    default_value: row.get_text("dflt_value")?,
                    primary_key: row.get_i64("pk")?.unwrap_or(0) != 0,
                })
            })
            .collect()
    }

    /// Start a query builder for one table.
    pub fn table(&self, name: &str) -> Table<'_> {
        Table::new(self, name)
    }

    /// Close the connection, surfacing any pending error.
    pub fn close(self) -> Result<()> {
        self.connection.close().map_err(|(_, e)| Error::Sqlite(e))?;
        info!("database connection closed");
        Ok(())
    }
}
