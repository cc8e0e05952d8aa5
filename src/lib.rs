//! Lightweight SQLite convenience layer.
//!
//! # Intention
//!
//! - Provide a single-connection wrapper around SQLite with generic row
//!   marshalling ([`Bmdb`], [`Row`], [`Value`]).
//! - Offer a fluent query builder ([`Table`]) and a small active-record
//!   trait ([`Model`]) on top of it.
//! - Generate `Model` boilerplate from a YAML schema file ([`codegen`]).
//!
//! # Architectural Boundaries
//!
//! - Everything is synchronous and single-threaded; there is no pooling,
//!   no query planning, and no concurrency control.
//! - SQL is composed as text with positional `?` placeholders; values are
//!   always bound, never interpolated.

pub mod codegen;
pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod model;
pub mod output;
pub mod query;
pub mod schema;
pub mod value;

pub use db::{Bmdb, ColumnInfo, Select, StatementOutput};
pub use error::{Error, Result};
pub use model::Model;
pub use query::{Order, Table};
pub use schema::{DataType, Field, TableSpec};
pub use value::{Row, Value};
