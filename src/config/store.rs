//! Key-value configuration persistence
//!
//! The configuration is a single TOML document per user. It is always read
//! in full and rewritten in full; there is no file locking, so two concurrent
//! invocations may race and the last writer wins.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MaildownError, MaildownResult};

/// A flat mapping of keys to scalar values or provider namespace tables
pub type Configuration = toml::Table;

/// Storage for the user's configuration
pub trait ConfigStore {
    /// Read the current configuration, empty if nothing has been saved yet
    fn load(&self) -> MaildownResult<Configuration>;

    /// Merge `updates` into the existing configuration and persist the result
    fn save(&self, updates: Configuration) -> MaildownResult<()>;
}

/// Configuration stored as a TOML file on disk
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> MaildownResult<Configuration> {
        if !self.path.exists() {
            return Ok(Configuration::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| {
            MaildownError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        toml::from_str(&contents).map_err(|e| MaildownError::ConfigCorrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn save(&self, updates: Configuration) -> MaildownResult<()> {
        let mut config = self.load()?;
        config.extend(updates);

        let contents = toml::to_string_pretty(&config)
            .map_err(|e| MaildownError::Io(format!("Failed to serialize config: {}", e)))?;
        write_atomic(&self.path, contents.as_bytes())?;

        debug!(path = %self.path.display(), keys = config.len(), "saved configuration");
        Ok(())
    }
}

/// Configuration held in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: RefCell<Configuration>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            config: RefCell::new(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> MaildownResult<Configuration> {
        Ok(self.config.borrow().clone())
    }

    fn save(&self, updates: Configuration) -> MaildownResult<()> {
        self.config.borrow_mut().extend(updates);
        Ok(())
    }
}

/// Read a provider namespace table, empty if absent or not a table
pub fn load_namespace(store: &dyn ConfigStore, namespace: &str) -> MaildownResult<Configuration> {
    let mut config = store.load()?;
    Ok(match config.remove(namespace) {
        Some(toml::Value::Table(table)) => table,
        _ => Configuration::new(),
    })
}

/// Merge `values` key by key into a provider namespace table and save it
pub fn update_namespace(
    store: &dyn ConfigStore,
    namespace: &str,
    values: Configuration,
) -> MaildownResult<()> {
    let mut table = load_namespace(store, namespace)?;
    table.extend(values);

    let mut updates = Configuration::new();
    updates.insert(namespace.to_string(), toml::Value::Table(table));
    store.save(updates)
}

/// Write a file atomically (write to temp, then rename)
fn write_atomic(path: &Path, contents: &[u8]) -> MaildownResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MaildownError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("toml.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| MaildownError::Io(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents)
        .and_then(|_| writer.flush())
        .map_err(|e| MaildownError::Io(format!("Failed to write config: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| MaildownError::Io(format!("Failed to sync config: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        MaildownError::Io(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}
