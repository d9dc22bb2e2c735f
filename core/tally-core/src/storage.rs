//! Storage paths for Tile Tally.
//!
//! All path decisions live here. Production code uses [`StorageConfig::new`],
//! which points at `~/.tile-tally/`; tests use [`StorageConfig::with_root`].

use std::path::{Path, PathBuf};

use crate::error::{Result, TallyError};

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all Tile Tally data (default: ~/.tile-tally)
    root: PathBuf,
}

impl StorageConfig {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(TallyError::HomeDirNotFound)?;
        Ok(Self {
            root: home.join(".tile-tally"),
        })
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Key-value file backing the session store.
    pub fn storage_file(&self) -> PathBuf {
        self.root.join("storage.json")
    }

    /// Optional TOML configuration.
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Where a renderer may drop its current view for [`crate::SnapshotFileSensor`].
    pub fn view_snapshot_file(&self) -> PathBuf {
        self.root.join("view.json")
    }
}
