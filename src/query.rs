//! Fluent query builder scoped to one table.

use crate::db::{Bmdb, Select};
use crate::error::{Error, Result};
use crate::value::{Row, Value};

/// Sort direction for [`Table::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Transient builder state for one call chain; nothing is persisted.
///
/// ```no_run
/// # use bmdb::{Bmdb, Value};
/// # fn demo(db: &Bmdb) -> bmdb::Result<()> {
/// let adults = db
///     .table("users")
///     .filter("age >= ?", vec![Value::Integer(18)])
///     .order_by("name", bmdb::Order::Asc)
///     .limit(10)
///     .get()?;
/// # Ok(())
/// # }
/// ```
pub struct Table<'a> {
    db: &'a Bmdb,
    name: String,
    filter: Option<String>,
    params: Vec<Value>,
    order_by: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl<'a> Table<'a> {
    pub(crate) fn new(db: &'a Bmdb, name: &str) -> Self {
        Self {
            db,
            name: name.to_string(),
            filter: None,
            params: Vec::new(),
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// Set the WHERE clause. Placeholders in `condition` are bound in order.
    pub fn filter(mut self, condition: &str, params: impl IntoIterator<Item = Value>) -> Self {
        self.filter = Some(condition.to_string());
        self.params.extend(params);
        self
    }

    pub fn order_by(mut self, column: &str, order: Order) -> Self {
        self.order_by = Some(format!("{column} {}", order.as_sql()));
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn offset(mut self, count: u32) -> Self {
        self.offset = Some(count);
        self
    }

    fn into_select(self) -> (String, Select, &'a Bmdb) {
        (
            self.name,
            Select {
                columns: None,
                filter: self.filter,
                params: self.params,
                order_by: self.order_by,
                limit: self.limit,
                offset: self.offset,
            },
            self.db,
        )
    }

    /// Execute the SELECT and return all matching rows.
    pub fn get(self) -> Result<Vec<Row>> {
        let (name, select, db) = self.into_select();
        db.select(&name, &select)
    }

    /// Return the first matching row, if any.
    pub fn first(mut self) -> Result<Option<Row>> {
        self.limit = Some(1);
        Ok(self.get()?.into_iter().next())
    }

    /// Count matching rows.
    pub fn count(self) -> Result<i64> {
        let mut sql = format!("SELECT COUNT(*) AS n FROM {}", self.name);
        if let Some(filter) = &self.filter {
            sql.push_str(&format!(" WHERE {filter}"));
        }
        let rows = self.db.query(&sql, &self.params)?;
        match rows.first() {
            Some(row) => Ok(row.get_i64("n")?.unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Insert one row; the builder filter does not apply.
    pub fn insert(self, data: &[(String, Value)]) -> Result<i64> {
        self.db.insert(&self.name, data)
    }

    /// Update matching rows. A filter is required.
    pub fn update(self, data: &[(String, Value)]) -> Result<usize> {
        let filter = self
            .filter
            .as_deref()
            .ok_or(Error::FilterRequired("update"))?;
        self.db.update(&self.name, data, filter, &self.params)
    }

    /// Delete matching rows. A filter is required.
    pub fn delete(self) -> Result<usize> {
        let filter = self
            .filter
            .as_deref()
            .ok_or(Error::FilterRequired("delete"))?;
        self.db.delete(&self.name, filter, &self.params)
    }
}
