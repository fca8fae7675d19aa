//! Hour-partitioned usage object storage.
//!
//! This module provides:
//! - [`UsageStore`] — Range listing and reading of usage objects
//! - [`FileUsageStore`] — A store backed by a local directory tree whose
//!   relative paths are the object keys

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Result, UsageError};
use crate::types::{UsageEvent, UsageQuery};

/// A store of usage objects keyed `account=<A>/date=<D>/hour=<H>/<object>`.
pub trait UsageStore {
    /// Lists the keys matched by `query`, in lexical order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list(&self, query: &UsageQuery) -> Result<Vec<String>>;

    /// Reads every event stored in the object at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be read or parsed.
    fn read(&self, key: &str) -> Result<Vec<UsageEvent>>;
}

/// Configuration for [`FileUsageStore`].
#[derive(Debug, Clone)]
pub struct FileUsageStoreConfig {
    /// Directory holding the `account=...` partitions.
    pub root: PathBuf,
    /// File extension of usage objects; other files are ignored.
    pub object_extension: String,
}

impl Default for FileUsageStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("usage"),
            object_extension: "json".to_string(),
        }
    }
}

impl FileUsageStoreConfig {
    /// Creates a config rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Sets the object file extension.
    #[must_use]
    pub fn with_object_extension(mut self, ext: impl Into<String>) -> Self {
        self.object_extension = ext.into();
        self
    }
}

/// Usage objects stored as JSON-lines files in a directory tree.
#[derive(Debug, Clone)]
pub struct FileUsageStore {
    config: FileUsageStoreConfig,
}

impl FileUsageStore {
    /// Opens a store over an existing directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.root` is not a readable directory.
    pub fn new(config: FileUsageStoreConfig) -> Result<Self> {
        let meta = fs::metadata(&config.root)?;
        if !meta.is_dir() {
            return Err(UsageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                format!("{} is not a directory", config.root.display()),
            )));
        }
        Ok(Self { config })
    }

    /// Opens a store rooted at `root` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a readable directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        Self::new(FileUsageStoreConfig::new(root))
    }

    fn is_object(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.config.object_extension.as_str())
    }

    /// Walks `dir`, pushing the key of every object file under it.
    fn collect_keys(&self, dir: &Path, prefix: &str, keys: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                trace!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            let key = format!("{prefix}{name}");
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.collect_keys(&entry.path(), &format!("{key}/"), keys)?;
            } else if file_type.is_file() && self.is_object(&entry.path()) {
                keys.push(key);
            }
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.config.root.clone(), |path, part| path.join(part))
    }
}

impl UsageStore for FileUsageStore {
    fn list(&self, query: &UsageQuery) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        self.collect_keys(&self.config.root, "", &mut keys)?;
        keys.retain(|key| query.contains(key));
        keys.sort();
        debug!(
            start = %query.start_offset,
            end = %query.end_offset,
            objects = keys.len(),
            "listed usage objects"
        );
        Ok(keys)
    }

    fn read(&self, key: &str) -> Result<Vec<UsageEvent>> {
        let file = fs::File::open(self.key_path(key))?;
        let mut events = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|source| UsageError::Parse {
                key: key.to_string(),
                line: idx + 1,
                source,
            })?;
            events.push(event);
        }
        trace!(key, events = events.len(), "read usage object");
        Ok(events)
    }
}
