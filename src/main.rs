mod cli;
mod shell;

use std::io::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;

use bmdb::config::Config;
use bmdb::{codegen, migrate, output, Bmdb, Row, StatementOutput, Value};
use cli::{Cli, Commands, ConfigAction, MigrationAction, OutputFormat, TableAction};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { database } => handle_init(&database),
        Commands::Shell { database } => shell::run(&Bmdb::open(&database)?),
        Commands::Query {
            database,
            sql,
            output,
        } => handle_query(&database, &sql, output),
        Commands::Table { database, action } => handle_table(&database, action),
        Commands::Migration { action } => handle_migration(action),
        Commands::Config { action } => handle_config(action),
        Commands::Generate { schema, out } => handle_generate(&schema, out.as_deref()),
    }
}

fn init_logging(verbose: bool) {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| if verbose { "bmdb=debug" } else { "bmdb=warn" }.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_target(false)
        .init();
}

fn handle_init(database: &str) -> Result<()> {
    let db = Bmdb::open(database)?;
    migrate::ensure_table(&db)?;
    println!("Database initialized at {}", db.target());
    Ok(())
}

fn handle_query(database: &str, sql: &str, format: OutputFormat) -> Result<()> {
    let db = Bmdb::open(database)?;
    match db.run_statement(sql)? {
        StatementOutput::Rows(rows) => print_rows(&rows, format)?,
        StatementOutput::Changed(n) => println!("{n} row(s) affected"),
    }
    Ok(())
}

fn print_rows(rows: &[Row], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", output::format_table(rows)),
        OutputFormat::Json => println!("{}", output::format_json(rows)?),
        OutputFormat::Csv => println!("{}", output::format_csv(rows)),
    }
    Ok(())
}

fn handle_table(database: &str, action: TableAction) -> Result<()> {
    let db = Bmdb::open(database)?;
    match action {
        TableAction::List => {
            let tables = db.tables()?;
            if tables.is_empty() {
                println!("No tables found");
            } else {
                for table in tables {
                    println!("{table}");
                }
            }
        }
        TableAction::Create { name, schema } => {
            let columns = parse_column_map(&schema)?;
            let refs: Vec<(&str, &str)> = columns
                .iter()
                .map(|(c, t)| (c.as_str(), t.as_str()))
                .collect();
            db.create_table(&name, &refs)?;
            println!("Table '{name}' created");
        }
        TableAction::Drop { name, yes } => {
            if !yes && !confirm(&format!("Drop table '{name}'?"))? {
                println!("Operation cancelled");
                return Ok(());
            }
            db.drop_table(&name)?;
            println!("Table '{name}' dropped");
        }
        TableAction::Describe { name } => {
            let columns = db.table_columns(&name)?;
            if columns.is_empty() {
                println!("Table '{name}' not found or has no columns");
                return Ok(());
            }
            let headers = vec![
                "column".to_string(),
                "type".to_string(),
                "notnull".to_string(),
                "default".to_string(),
                "pk".to_string(),
            ];
            let rows: Vec<Row> = columns
                .into_iter()
                .map(|c| {
                    Row::new(
                        headers.clone(),
                        vec![
                            Value::Text(c.name),
                            Value::Text(c.data_type),
                            Value::Boolean(c.not_null),
                            Value::from(c.default_value),
                            Value::Boolean(c.primary_key),
                        ],
                    )
                })
                .collect();
            println!("{}", output::format_table(&rows));
        }
    }
    Ok(())
}

/// Parse `--schema`: inline JSON object or `@file.json`, mapping column
/// names to raw type fragments.
fn parse_column_map(schema: &str) -> Result<Vec<(String, String)>> {
    let text = match schema.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read schema file: {path}"))?,
        None => schema.to_string(),
    };
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&text).context("schema must be a JSON object")?;
    let mut columns = Vec::with_capacity(map.len());
    for (name, value) in map {
        let Some(ty) = value.as_str() else {
            bail!("column '{name}' must map to a type string");
        };
        columns.push((name, ty.to_string()));
    }
    if columns.is_empty() {
        bail!("schema has no columns");
    }
    Ok(columns)
}

fn handle_migration(action: MigrationAction) -> Result<()> {
    match action {
        MigrationAction::Create { name, dir } => {
            let path = migrate::create(&dir, &name)?;
            println!("Migration created: {}", path.display());
        }
        MigrationAction::Run { database, dir } => {
            let db = Bmdb::open(&database)?;
            let applied = migrate::run(&db, &dir)?;
            if applied == 0 {
                println!("No pending migrations");
            } else {
                println!("{applied} migration(s) applied");
            }
        }
        MigrationAction::List { dir } => {
            let files = migrate::list(&dir)?;
            if files.is_empty() {
                println!("No migrations found");
            } else {
                for file in files {
                    if let Some(name) = file.file_name() {
                        println!("{}", name.to_string_lossy());
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load_default()?;
    match action {
        ConfigAction::Show => {
            if config.is_empty() {
                println!("No configuration found");
            } else {
                println!("{}", config.to_json()?);
            }
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("Set {key} = {value}");
        }
        ConfigAction::Unset { key } => {
            if config.unset(&key)? {
                println!("Removed {key}");
            } else {
                println!("No such key: {key}");
            }
        }
        ConfigAction::Reset => {
            config.reset()?;
            println!("Configuration reset");
        }
    }
    Ok(())
}

fn handle_generate(schema_path: &Path, out: Option<&Path>) -> Result<()> {
    let schema = codegen::load_schema(schema_path)?;
    let source = codegen::generate(&schema)?;
    match out {
        Some(path) => {
            std::fs::write(path, &source)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Models written to {}", path.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} (yes/no): ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}
