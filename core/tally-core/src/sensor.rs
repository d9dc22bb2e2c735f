//! Read-only access to the live game view.
//!
//! The view is owned by someone else and may be mid-transition at any poll, so
//! nothing here fails: a missing location reads as no identity, a missing indicator
//! reads as unknown, a missing face reads as [`CompletionState::Unfinished`], missing
//! tiles read as zero.
//!
//! # Sources
//!
//! - [`ViewSnapshot`]: one structured capture of the page. Implements
//!   [`ViewSensor`] directly, which is what tests and the diagnostic binary use.
//! - [`SnapshotFileSensor`]: re-reads a JSON [`ViewSnapshot`] from disk on every
//!   observation, for a renderer that dumps its view to a file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::patterns::{FACE_LOSE_CLASS, FACE_WIN_CLASS, RE_LEVEL_SELECT_ID, RE_TILE_STATE_CLASS};
use crate::types::{
    CompletionState, MeasurementVector, SessionCategory, SessionIdentity, TILE_STATE_COUNT,
};

/// Everything the engine reads in one poll, captured from a single view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// `None` while the view has no location, e.g. between pages.
    pub identity: Option<SessionIdentity>,
    pub category: Option<SessionCategory>,
    pub completion: CompletionState,
    pub measurements: MeasurementVector,
    pub category_label: Option<String>,
}

/// Read-only view over the current game. Each call reflects the view as it is now.
pub trait ViewSensor {
    fn current_identity(&self) -> Option<SessionIdentity>;

    fn current_category(&self) -> Option<SessionCategory>;

    fn completion_state(&self) -> CompletionState;

    /// Meaningless while the game is unfinished; callers discard it then.
    fn measurement_vector(&self) -> MeasurementVector;

    /// Visible text of the active level selector, for display only.
    fn category_label(&self) -> Option<String> {
        self.current_category().map(|c| c.label().to_string())
    }

    /// Reads all signals together. Sources that re-fetch per call override this
    /// so every value comes from the same capture.
    fn observe(&self) -> Observation {
        Observation {
            identity: self.current_identity(),
            category: self.current_category(),
            completion: self.completion_state(),
            measurements: self.measurement_vector(),
            category_label: self.category_label(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// View Snapshot
// ═══════════════════════════════════════════════════════════════════════════════

/// The active entry of the level selector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelIndicator {
    /// Element id, e.g. `level_select_3`.
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// A capture of the parts of the page the tally cares about.
///
/// ```json
/// {
///   "location": "https://minesweeper.online/game/123?ref=x",
///   "level_select": { "id": "level_select_3", "label": "Expert" },
///   "face": ["top-area-face", "hd_top-area-face-win"],
///   "tiles": ["cell hd_opened hd_type1", "cell hd_closed"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewSnapshot {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub level_select: Option<LevelIndicator>,
    /// Class list of the face indicator; `None` when the face is not on the page.
    #[serde(default)]
    pub face: Option<Vec<String>>,
    /// Class attribute of every tile element, space separated.
    #[serde(default)]
    pub tiles: Vec<String>,
}

impl ViewSnapshot {
    /// Reads a snapshot file. Returns `None` for a missing or unreadable capture.
    pub fn read_from(path: &Path) -> Option<Self> {
        let content = fs_err::read_to_string(path).ok()?;
        if content.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&content).ok()
    }
}

fn level_number(id: &str) -> Option<u32> {
    RE_LEVEL_SELECT_ID
        .captures(id.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn count_tile_states(tiles: &[String]) -> MeasurementVector {
    let mut counts = [0u32; TILE_STATE_COUNT];
    for tile in tiles {
        // An element carrying the same class twice still counts once.
        let mut seen = [false; TILE_STATE_COUNT];
        for token in tile.split_whitespace() {
            let Some(index) = RE_TILE_STATE_CLASS
                .captures(token)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<usize>().ok())
            else {
                continue;
            };
            seen[index] = true;
        }
        for (count, hit) in counts.iter_mut().zip(seen) {
            if hit {
                *count = count.saturating_add(1);
            }
        }
    }
    MeasurementVector::new(counts)
}

impl ViewSensor for ViewSnapshot {
    fn current_identity(&self) -> Option<SessionIdentity> {
        SessionIdentity::from_location(&self.location)
    }

    fn current_category(&self) -> Option<SessionCategory> {
        let indicator = self.level_select.as_ref()?;
        level_number(&indicator.id).and_then(SessionCategory::from_level_number)
    }

    fn completion_state(&self) -> CompletionState {
        let Some(classes) = self.face.as_ref() else {
            return CompletionState::Unfinished;
        };
        // Lose is checked first: a board showing both is never treated as won.
        if classes.iter().any(|c| c == FACE_LOSE_CLASS) {
            CompletionState::Lost
        } else if classes.iter().any(|c| c == FACE_WIN_CLASS) {
            CompletionState::Won
        } else {
            CompletionState::Unfinished
        }
    }

    fn measurement_vector(&self) -> MeasurementVector {
        count_tile_states(&self.tiles)
    }

    fn category_label(&self) -> Option<String> {
        let indicator = self.level_select.as_ref()?;
        indicator
            .label
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .or_else(|| self.current_category().map(|c| c.label().to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// File-backed Sensor
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads a [`ViewSnapshot`] file on every call. No caching.
#[derive(Debug, Clone)]
pub struct SnapshotFileSensor {
    path: PathBuf,
}

impl SnapshotFileSensor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotFileSensor { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn capture(&self) -> ViewSnapshot {
        ViewSnapshot::read_from(&self.path).unwrap_or_default()
    }
}

impl ViewSensor for SnapshotFileSensor {
    fn current_identity(&self) -> Option<SessionIdentity> {
        self.capture().current_identity()
    }

    fn current_category(&self) -> Option<SessionCategory> {
        self.capture().current_category()
    }

    fn completion_state(&self) -> CompletionState {
        self.capture().completion_state()
    }

    fn measurement_vector(&self) -> MeasurementVector {
        self.capture().measurement_vector()
    }

    fn category_label(&self) -> Option<String> {
        self.capture().category_label()
    }

    fn observe(&self) -> Observation {
        self.capture().observe()
    }
}
