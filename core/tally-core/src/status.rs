//! What a control panel shows on each refresh.
//!
//! Built from the same sensor and store the engine uses; rendering it is the
//! panel's business.

use serde::Serialize;

use crate::sensor::ViewSensor;
use crate::store::SessionStore;
use crate::types::{CompletionState, MeasurementVector};

pub const UNKNOWN_DIFFICULTY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelStatus {
    pub total_logged: usize,
    /// The game on screen is in the store.
    pub current_logged: bool,
    /// The game on screen shows the win face.
    pub finished: bool,
    pub difficulty: String,
    /// Stored counts for the game on screen, when it is logged.
    pub tile_counts: Option<MeasurementVector>,
}

impl PanelStatus {
    /// `0:5, 1:3, ..., 8:1`, or `-` when there is nothing to show.
    pub fn tile_counts_text(&self) -> String {
        match &self.tile_counts {
            Some(counts) => counts
                .counts()
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}:{}", i, c))
                .collect::<Vec<_>>()
                .join(", "),
            None => "-".to_string(),
        }
    }
}

/// Builds the status from one capture of the view.
pub fn panel_status<S: ViewSensor>(sensor: &S, store: &SessionStore) -> PanelStatus {
    let observation = sensor.observe();
    let completion = observation.completion;
    let difficulty = observation
        .category_label
        .unwrap_or_else(|| UNKNOWN_DIFFICULTY.to_string());

    // A game still in progress never shows as logged, even if its location was.
    if !completion.is_over() {
        return PanelStatus {
            total_logged: store.len(),
            current_logged: false,
            finished: false,
            difficulty,
            tile_counts: None,
        };
    }

    let stored = observation
        .identity
        .as_ref()
        .and_then(|identity| store.get(identity));
    PanelStatus {
        total_logged: store.len(),
        current_logged: stored.is_some(),
        finished: completion == CompletionState::Won,
        difficulty,
        tile_counts: stored.map(|record| record.measurements),
    }
}
