//! DetectionEngine - decides when the game on screen gets recorded.
//!
//! Each identity moves through two states, `Unrecorded → Recorded`, and the move
//! happens on the first poll where all of these hold:
//!
//! 0. the view names a game at all (a blank location skips the poll),
//! 1. the identity is not in the store,
//! 2. the face shows a win (a loss or an unfinished board never records),
//! 3. the difficulty is known (an unknown one skips the poll, it is not stored as unknown).
//!
//! `Recorded` is terminal. A board that is reset and won again under the same
//! location is not recorded a second time.
//!
//! The engine is synchronous and not thread-safe; drivers serialize access
//! (see [`crate::poller`]).

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::LEGACY_EXPORT_KEY;
use crate::error::Result;
use crate::export::{format_csv, parse_csv, ExportSink};
use crate::sensor::ViewSensor;
use crate::status::{panel_status, PanelStatus};
use crate::store::{SessionMap, SessionStore};
use crate::types::{CompletionState, SessionIdentity, SessionRecord};

/// Result of one detection attempt. Everything except `Recorded` leaves the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Recorded {
        identity: SessionIdentity,
        record: SessionRecord,
    },
    /// The view has no location, so there is no game to check.
    NoIdentity,
    AlreadyLogged,
    NotWon(CompletionState),
    UnknownCategory,
    /// The record could not be flushed; the next poll tries again.
    PersistFailed,
}

impl TickOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, TickOutcome::Recorded { .. })
    }
}

pub struct DetectionEngine<S: ViewSensor> {
    sensor: S,
    store: SessionStore,
}

impl<S: ViewSensor> DetectionEngine<S> {
    pub fn new(sensor: S, store: SessionStore) -> Self {
        Self { sensor, store }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// One detection attempt. Safe to call at any cadence; never fails.
    pub fn tick(&mut self) -> TickOutcome {
        let observation = self.sensor.observe();

        let Some(identity) = observation.identity else {
            return TickOutcome::NoIdentity;
        };
        if self.store.contains(&identity) {
            return TickOutcome::AlreadyLogged;
        }
        if observation.completion != CompletionState::Won {
            return TickOutcome::NotWon(observation.completion);
        }
        let Some(category) = observation.category else {
            return TickOutcome::UnknownCategory;
        };

        let record = SessionRecord::new(category, observation.measurements);
        match self.store.insert(identity.clone(), record) {
            Ok(()) => {
                info!(
                    identity = %identity,
                    category = %category,
                    tiles = record.measurements.total(),
                    total = self.store.len(),
                    "Recorded finished game"
                );
                TickOutcome::Recorded { identity, record }
            }
            Err(e) => {
                warn!(
                    identity = %identity,
                    error = %e,
                    "Failed to persist finished game, will retry"
                );
                TickOutcome::PersistFailed
            }
        }
    }

    pub fn is_logged(&self, identity: &SessionIdentity) -> bool {
        self.store.contains(identity)
    }

    pub fn snapshot_count(&self) -> usize {
        self.store.len()
    }

    pub fn record_for(&self, identity: &SessionIdentity) -> Option<&SessionRecord> {
        self.store.get(identity)
    }

    /// Erases every record, then polls once so a game sitting on a win screen
    /// right now is captured again instead of lost.
    ///
    /// Fails only if the empty store cannot be flushed. Removing the legacy
    /// export cache is best-effort.
    pub fn clear_all(&mut self) -> Result<TickOutcome> {
        let cleared = self.store.len();
        self.store.clear()?;

        if let Err(e) = self.store.remove_backend_value(LEGACY_EXPORT_KEY) {
            warn!(error = %e, "Failed to remove legacy export cache");
        }

        info!(cleared, "Cleared all recorded games");
        Ok(self.tick())
    }

    pub fn export_csv(&self) -> Result<String> {
        format_csv(self.store.snapshot())
    }

    /// Formats every record and hands the document to `sink`.
    pub fn export_all(&self, sink: &mut dyn ExportSink) -> Result<PathBuf> {
        let content = self.export_csv()?;
        let path = sink.save(&content)?;
        info!(path = %path.display(), rows = self.store.len(), "Exported recorded games");
        Ok(path)
    }

    /// Replaces the store with the rows of an earlier export. Returns the row count.
    pub fn import_csv(&mut self, text: &str) -> Result<usize> {
        let sessions = parse_csv(text)?;
        let count = sessions.len();
        self.replace_all(sessions)?;
        Ok(count)
    }

    pub fn replace_all(&mut self, sessions: SessionMap) -> Result<()> {
        self.store.replace_all(sessions)
    }

    pub fn status(&self) -> PanelStatus {
        panel_status(&self.sensor, &self.store)
    }
}
