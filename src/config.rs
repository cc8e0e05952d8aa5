//! Persisted key/value configuration.
//!
//! Settings live in a JSON file at `~/.bmdb_config.json`. A corrupt file is
//! logged and treated as empty rather than refusing to start.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

pub const CONFIG_FILE_NAME: &str = ".bmdb_config.json";

#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Config {
    /// Load the configuration from the user's home directory.
    pub fn load_default() -> Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::load_from(home.join(CONFIG_FILE_NAME))
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("config file corrupted ({e}), starting fresh");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    pub fn unset(&mut self, key: &str) -> Result<bool> {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Drop all values and delete the backing file.
    pub fn reset(&mut self) -> Result<()> {
        self.values.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    /// Pretty-printed JSON of all values.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }
}
