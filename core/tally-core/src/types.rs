//! Core types shared by the sensor, store, engine and exporter.
//!
//! The serialized shapes here are the on-disk format: a record is stored as
//! `{ "type": "Expert", "counts": [9 integers] }` keyed by its identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of categorical tile states counted per board (`hd_type0` .. `hd_type8`).
pub const TILE_STATE_COUNT: usize = 9;

// ═══════════════════════════════════════════════════════════════════════════════
// Session Identity
// ═══════════════════════════════════════════════════════════════════════════════

/// Stable key of one game, derived from the page location without its query string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        SessionIdentity(value.into())
    }

    /// Strips everything from the first `?` onward.
    ///
    /// Falls back to the raw location when stripping would leave nothing. A blank
    /// location names no game and yields `None`.
    pub fn from_location(location: &str) -> Option<Self> {
        let location = location.trim();
        if location.is_empty() {
            return None;
        }
        let stripped = location.split('?').next().unwrap_or_default();
        if stripped.is_empty() {
            Some(SessionIdentity(location.to_string()))
        } else {
            Some(SessionIdentity(stripped.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for SessionIdentity {
    fn from(value: &str) -> Self {
        SessionIdentity::new(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session Category
// ═══════════════════════════════════════════════════════════════════════════════

/// Difficulty of a game. Standard boards first, then the no-guessing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionCategory {
    Beginner,
    Intermediate,
    Expert,
    Easy,
    Medium,
    Hard,
    Evil,
}

impl SessionCategory {
    pub const ALL: [SessionCategory; 7] = [
        SessionCategory::Beginner,
        SessionCategory::Intermediate,
        SessionCategory::Expert,
        SessionCategory::Easy,
        SessionCategory::Medium,
        SessionCategory::Hard,
        SessionCategory::Evil,
    ];

    /// Maps the numeric suffix of a `level_select_<n>` element.
    ///
    /// Standard: 1-beginner, 2-intermediate, 3-expert, 4-custom.
    /// No-guessing: 11-easy, 12-medium, 13-hard, 14-evil, 15-custom.
    /// Custom boards have no category.
    pub fn from_level_number(level: u32) -> Option<Self> {
        match level {
            1 => Some(SessionCategory::Beginner),
            2 => Some(SessionCategory::Intermediate),
            3 => Some(SessionCategory::Expert),
            11 => Some(SessionCategory::Easy),
            12 => Some(SessionCategory::Medium),
            13 => Some(SessionCategory::Hard),
            14 => Some(SessionCategory::Evil),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionCategory::Beginner => "Beginner",
            SessionCategory::Intermediate => "Intermediate",
            SessionCategory::Expert => "Expert",
            SessionCategory::Easy => "Easy",
            SessionCategory::Medium => "Medium",
            SessionCategory::Hard => "Hard",
            SessionCategory::Evil => "Evil",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for SessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Completion State
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompletionState {
    #[default]
    Unfinished,
    Won,
    Lost,
}

impl CompletionState {
    pub fn is_over(&self) -> bool {
        !matches!(self, CompletionState::Unfinished)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Measurements
// ═══════════════════════════════════════════════════════════════════════════════

/// Tile counts per state index at the moment a game is confirmed won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementVector([u32; TILE_STATE_COUNT]);

impl MeasurementVector {
    pub fn new(counts: [u32; TILE_STATE_COUNT]) -> Self {
        MeasurementVector(counts)
    }

    pub fn zeros() -> Self {
        MeasurementVector::default()
    }

    pub fn counts(&self) -> &[u32; TILE_STATE_COUNT] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }
}

impl From<[u32; TILE_STATE_COUNT]> for MeasurementVector {
    fn from(counts: [u32; TILE_STATE_COUNT]) -> Self {
        MeasurementVector(counts)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session Record
// ═══════════════════════════════════════════════════════════════════════════════

/// What gets stored for one finished game. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub category: SessionCategory,
    #[serde(rename = "counts")]
    pub measurements: MeasurementVector,
}

impl SessionRecord {
    pub fn new(category: SessionCategory, measurements: MeasurementVector) -> Self {
        SessionRecord {
            category,
            measurements,
        }
    }
}
