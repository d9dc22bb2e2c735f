//! Runtime configuration, read from an optional TOML file.
//!
//! ```toml
//! poll_interval_ms = 200
//! dataset_key = "dataset"
//! export_file_name = "games.csv"
//! export_dir = "/Users/me/Downloads"
//! ```
//!
//! Every field is optional. A missing file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};
use crate::export::DEFAULT_EXPORT_FILE_NAME;
use crate::storage::StorageConfig;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const DEFAULT_DATASET_KEY: &str = "dataset";

/// Backend key of the export cache older versions kept. Removed on clear.
pub const LEGACY_EXPORT_KEY: &str = "minesweeper_csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub poll_interval_ms: u64,
    pub dataset_key: String,
    pub export_file_name: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            dataset_key: DEFAULT_DATASET_KEY.to_string(),
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            export_dir: None,
        }
    }
}

impl TallyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn export_dir_or(&self, storage: &StorageConfig) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| storage.root().to_path_buf())
    }
}

pub fn load_config(path: &Path) -> Result<TallyConfig> {
    if !path.exists() {
        return Ok(TallyConfig::default());
    }

    let content = fs_err::read_to_string(path)
        .map_err(|e| TallyError::io(format!("Failed to read config {}", path.display()), e))?;
    toml::from_str::<TallyConfig>(&content).map_err(|e| TallyError::ConfigMalformed {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}
