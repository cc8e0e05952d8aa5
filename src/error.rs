//! Error types shared across the crate.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("unsupported connection string: {0}")]
    UnsupportedScheme(String),

    #[error("a filter is required for {0}")]
    FilterRequired(&'static str),

    #[error("model for table '{0}' has no primary key field")]
    NoPrimaryKey(&'static str),

    #[error("record in table '{0}' has no primary key value")]
    MissingPrimaryKey(&'static str),

    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("column '{0}' missing from row")]
    MissingColumn(String),

    #[error("column '{column}' has unexpected type, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("migration '{0}' failed: {1}")]
    Migration(String, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid schema file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
