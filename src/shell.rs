//! Interactive SQL shell.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use bmdb::{output, Bmdb, StatementOutput};

pub fn run(db: &Bmdb) -> Result<()> {
    println!("Connected to {}", db.target());
    println!("Type 'exit' to quit, 'help' for help");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("bmdb> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" | "quit" | "q" => break,
            "help" | "?" => print_help(),
            ".tables" => list_tables(db),
            _ => run_sql(db, input),
        }
    }
    Ok(())
}

fn list_tables(db: &Bmdb) {
    match db.tables() {
        Ok(tables) if tables.is_empty() => println!("No tables found"),
        Ok(tables) => {
            for table in tables {
                println!("{table}");
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn run_sql(db: &Bmdb, sql: &str) {
    match db.run_statement(sql) {
        Ok(StatementOutput::Rows(rows)) if rows.is_empty() => {
            println!("Query executed successfully (no rows returned)");
        }
        Ok(StatementOutput::Rows(rows)) => println!("{}", output::format_table(&rows)),
        Ok(StatementOutput::Changed(n)) => println!("{n} row(s) affected"),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_help() {
    println!(
        "
Shell commands:
  SQL statements  - Execute any SQL statement
  .tables         - List all tables
  exit/quit/q     - Exit the shell
  help/?          - Show this help

Examples:
  SELECT * FROM users;
  CREATE TABLE test (id INTEGER, name TEXT);
  INSERT INTO users (name) VALUES ('John');
"
    );
}
