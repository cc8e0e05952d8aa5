use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bmdb")]
#[command(author, version, about = "Lightweight SQLite toolkit with a small ORM")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database with the migrations table
    Init {
        /// Database connection string or filename
        database: String,
    },

    /// Open an interactive SQL shell
    Shell {
        /// Database connection string or filename
        database: String,
    },

    /// Execute a single SQL statement
    Query {
        /// Database connection string or filename
        database: String,

        /// SQL to execute
        sql: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        output: OutputFormat,
    },

    /// Table inspection and maintenance
    Table {
        /// Database connection string or filename
        database: String,

        #[command(subcommand)]
        action: TableAction,
    },

    /// Migration management
    Migration {
        #[command(subcommand)]
        action: MigrationAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate model code from a YAML schema
    Generate {
        /// YAML schema file
        schema: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TableAction {
    /// List all tables
    List,

    /// Create a table from a JSON column map
    Create {
        name: String,

        /// Inline JSON (`{"id": "INTEGER PRIMARY KEY"}`) or `@schema.json`
        #[arg(long)]
        schema: String,
    },

    /// Drop a table
    Drop {
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Show column information
    Describe { name: String },
}

#[derive(Subcommand)]
pub enum MigrationAction {
    /// Create a new migration file
    Create {
        name: String,

        /// Migrations directory
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },

    /// Apply pending migrations
    Run {
        /// Database connection string or filename
        database: String,

        /// Migrations directory
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },

    /// List migration files
    List {
        /// Migrations directory
        #[arg(long, default_value = "migrations")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,

    /// Set a key
    Set { key: String, value: String },

    /// Remove a key
    Unset { key: String },

    /// Delete the configuration file
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}
