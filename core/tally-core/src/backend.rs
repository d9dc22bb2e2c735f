//! String key-value persistence behind the session store.
//!
//! The store only ever needs `get`/`set` on named string values (plus `remove`
//! for cleanup), so this is the whole contract. Two backends ship:
//!
//! - [`MemoryBackend`]: a `HashMap`, for tests and embedders with their own persistence.
//! - [`FileBackend`]: one JSON object file mapping key → string value.
//!
//! # File Format
//!
//! ```json
//! { "dataset": "{\"https://.../game/1\":{\"type\":\"Expert\",\"counts\":[...]}}" }
//! ```
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so a crash mid-write leaves the previous file intact.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{Result, TallyError};

pub trait KeyValueBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-memory Backend
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Starts with one value already present, as if written by an earlier run.
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_string(), value.to_string());
        MemoryBackend { values }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// File Backend
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FileBackend {
    file_path: PathBuf,
}

impl FileBackend {
    pub fn new(file_path: &Path) -> Self {
        FileBackend {
            file_path: file_path.to_path_buf(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Reads the whole value map. Missing, empty, or corrupt files read as empty.
    fn read_values(&self) -> Result<BTreeMap<String, String>> {
        if !self.file_path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = fs_err::read_to_string(&self.file_path)
            .map_err(|e| TallyError::io("Failed to read storage file", e))?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(values) => Ok(values),
            Err(e) => {
                warn!(
                    path = %self.file_path.display(),
                    error = %e,
                    "Storage file is corrupt, treating as empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_values(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(values)
            .map_err(|e| TallyError::json("Failed to serialize storage file", e))?;

        let parent_dir = self
            .file_path
            .parent()
            .ok_or_else(|| TallyError::Backend("Storage file path has no parent".to_string()))?;
        fs_err::create_dir_all(parent_dir)
            .map_err(|e| TallyError::io("Failed to create storage directory", e))?;

        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .map_err(|e| TallyError::io("Failed to create temp storage file", e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| TallyError::io("Failed to write temp storage file", e))?;
        temp_file
            .flush()
            .map_err(|e| TallyError::io("Failed to flush temp storage file", e))?;
        temp_file
            .persist(&self.file_path)
            .map_err(|e| TallyError::io("Failed to replace storage file", e.error))?;

        Ok(())
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_values()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_values()?;
        values.insert(key.to_string(), value.to_string());
        self.write_values(&values)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.read_values()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write_values(&values)
    }
}
