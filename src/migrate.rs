//! File-based SQL migrations.
//!
//! Migrations live in a directory of timestamped `.sql` files with
//! `-- Up migration` and `-- Down migration` sections. Applied migrations
//! are tracked by name in a `migrations` table; [`run`] applies each
//! pending up-section inside its own transaction.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::db::Bmdb;
use crate::error::{Error, Result};

const UP_MARKER: &str = "-- up migration";
const DOWN_MARKER: &str = "-- down migration";

/// A parsed migration file.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub name: String,
    pub up: String,
    pub down: String,
}

/// Create the tracking table if it does not exist. Also used by `init`.
pub fn ensure_table(db: &Bmdb) -> Result<()> {
    db.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        &[],
    )?;
    Ok(())
}

/// Names of migrations already applied, oldest first.
pub fn applied(db: &Bmdb) -> Result<Vec<String>> {
    ensure_table(db)?;
    let rows = db.query("SELECT name FROM migrations ORDER BY id", &[])?;
    rows.iter()
        .map(|row| {
            row.get_text("name")?
                .ok_or_else(|| Error::MissingColumn("name".to_string()))
        })
        .collect()
}

/// Write a new timestamped migration file and return its path.
pub fn create(dir: &Path, name: &str) -> Result<PathBuf> {
    let slug = name.trim().to_lowercase().replace(' ', "_");
    if slug.is_empty() {
        return Err(Error::Schema("migration name is empty".to_string()));
    }
    std::fs::create_dir_all(dir)?;

    let now = Local::now();
    let filename = format!("{}_{}.sql", now.format("%Y%m%d_%H%M%S"), slug);
    let path = dir.join(filename);

    let content = format!(
        "-- Migration: {name}\n-- Created: {}\n\n\
         -- Up migration\n\n\n\
         -- Down migration\n\n",
        now.to_rfc3339()
    );
    std::fs::write(&path, content)?;
    Ok(path)
}

/// Migration files in `dir`, sorted by filename.
pub fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "sql").unwrap_or(false))
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one migration file into its up and down sections.
pub fn load(path: &Path) -> Result<Migration> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content = std::fs::read_to_string(path)?;

    #[derive(PartialEq)]
    enum Section {
        Header,
        Up,
        Down,
    }

    let mut section = Section::Header;
    let mut up = String::new();
    let mut down = String::new();
    for line in content.lines() {
        let lowered = line.trim().to_lowercase();
        if lowered == UP_MARKER {
            section = Section::Up;
            continue;
        }
        if lowered == DOWN_MARKER {
            section = Section::Down;
            continue;
        }
        match section {
            Section::Header => {}
            Section::Up => {
                up.push_str(line);
                up.push('\n');
            }
            Section::Down => {
                down.push_str(line);
                down.push('\n');
            }
        }
    }

    Ok(Migration {
        name,
        up: up.trim().to_string(),
        down: down.trim().to_string(),
    })
}

/// Apply all pending migrations from `dir`; returns how many ran.
///
/// Each migration executes in its own transaction together with its
/// tracking record, so a failing file leaves the database at the last
/// successful migration.
pub fn run(db: &Bmdb, dir: &Path) -> Result<usize> {
    let done = applied(db)?;

    let mut count = 0;
    for path in list(dir)? {
        let migration = load(&path)?;
        if done.contains(&migration.name) {
            continue;
        }
        if migration.up.is_empty() {
            return Err(Error::Migration(
                migration.name,
                "no up section".to_string(),
            ));
        }

        let tx = db.conn().unchecked_transaction()?;
        tx.execute_batch(&migration.up)
            .map_err(|e| Error::Migration(migration.name.clone(), e.to_string()))?;
        tx.execute(
            "INSERT INTO migrations (name) VALUES (?)",
            [&migration.name],
        )
        .map_err(|e| Error::Migration(migration.name.clone(), e.to_string()))?;
        tx.commit()
            .map_err(|e| Error::Migration(migration.name.clone(), e.to_string()))?;

        info!("applied migration {}", migration.name);
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_migration(dir: &Path, filename: &str, up: &str, down: &str) {
        let content = format!(
            "-- Migration: {filename}\n\n-- Up migration\n{up}\n\n-- Down migration\n{down}\n"
        );
        std::fs::write(dir.join(filename), content).unwrap();
    }

    #[test]
    fn create_writes_timestamped_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = create(dir.path(), "Add Users Table").unwrap();
        let filename = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(filename.ends_with("_add_users_table.sql"));

        let migration = load(&path).unwrap();
        assert!(migration.up.is_empty());
        assert!(migration.down.is_empty());
    }

    #[test]
    fn create_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create(dir.path(), "   ").is_err());
    }

    #[test]
    fn list_is_sorted_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(dir.path(), "002_second.sql", "SELECT 2;", "");
        write_migration(dir.path(), "001_first.sql", "SELECT 1;", "");
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let files = list(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["001_first.sql", "002_second.sql"]);
    }

    #[test]
    fn list_of_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list(&missing).unwrap().is_empty());
    }

    #[test]
    fn load_splits_sections() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(
            dir.path(),
            "001_users.sql",
            "CREATE TABLE users (id INTEGER);",
            "DROP TABLE users;",
        );
        let migration = load(&dir.path().join("001_users.sql")).unwrap();
        assert_eq!(migration.name, "001_users");
        assert_eq!(migration.up, "CREATE TABLE users (id INTEGER);");
        assert_eq!(migration.down, "DROP TABLE users;");
    }

    #[test]
    fn run_applies_pending_once() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(
            dir.path(),
            "001_users.sql",
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);",
            "DROP TABLE users;",
        );
        write_migration(
            dir.path(),
            "002_seed.sql",
            "INSERT INTO users (name) VALUES ('admin');",
            "DELETE FROM users;",
        );

        let db = Bmdb::open_in_memory().unwrap();
        assert_eq!(run(&db, dir.path()).unwrap(), 2);
        assert_eq!(applied(&db).unwrap(), vec!["001_users", "002_seed"]);

        // Second run is a no-op.
        assert_eq!(run(&db, dir.path()).unwrap(), 0);

        let rows = db.query("SELECT name FROM users", &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn failing_migration_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(dir.path(), "001_bad.sql", "CREATE BOGUS;", "");

        let db = Bmdb::open_in_memory().unwrap();
        let err = run(&db, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Migration(_, _)));
        assert!(applied(&db).unwrap().is_empty());
    }
}
