//! # tally-core
//!
//! Watches a Minesweeper board through a polled view, notices when a game has
//! been won, and records its tile counts exactly once per game.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime. [`poller`] drives ticks on a plain thread.
//! - **Not thread-safe**: The engine expects serialized access; share it through
//!   [`poller::SharedEngine`].
//! - **Graceful degradation**: A missing indicator or corrupt stored state reads as
//!   a safe default, never as an error.
//! - **At most once**: An identity enters the store once and stays until a clear.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally_core::{DetectionEngine, FileBackend, SessionStore, SnapshotFileSensor, StorageConfig};
//!
//! let storage = StorageConfig::new()?;
//! let store = SessionStore::load(Box::new(FileBackend::new(&storage.storage_file())), "dataset")?;
//! let mut engine = DetectionEngine::new(SnapshotFileSensor::new(storage.view_snapshot_file()), store);
//! engine.tick();
//! ```

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod patterns;
pub mod poller;
pub mod sensor;
pub mod status;
pub mod storage;
pub mod store;
pub mod types;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use config::{load_config, TallyConfig};
pub use engine::{DetectionEngine, TickOutcome};
pub use error::{Result, TallyError};
pub use export::{format_csv, parse_csv, ExportSink, FileExportSink};
pub use poller::{spawn_poller, spawn_poller_with, PollerHandle, SharedEngine};
pub use sensor::{LevelIndicator, Observation, SnapshotFileSensor, ViewSensor, ViewSnapshot};
pub use status::PanelStatus;
pub use storage::StorageConfig;
pub use store::{SessionMap, SessionStore};
pub use types::*;
