//! Background driver that polls the engine at a fixed cadence.
//!
//! The engine is shared as `Arc<Mutex<_>>`. The poll thread and any UI-triggered
//! call (clear, export) take the same lock, so a clear can never interleave
//! with an in-flight insert. A poisoned lock is recovered rather than ending
//! the loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::engine::{DetectionEngine, TickOutcome};
use crate::error::{Result, TallyError};
use crate::sensor::ViewSensor;
use crate::status::PanelStatus;

pub type SharedEngine<S> = Arc<Mutex<DetectionEngine<S>>>;

pub fn shared<S: ViewSensor>(engine: DetectionEngine<S>) -> SharedEngine<S> {
    Arc::new(Mutex::new(engine))
}

pub fn lock_engine<S: ViewSensor>(
    engine: &Mutex<DetectionEngine<S>>,
) -> MutexGuard<'_, DetectionEngine<S>> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Running poll thread. Dropping the handle stops it.
#[derive(Debug)]
pub struct PollerHandle {
    stop: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Polls completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub fn spawn_poller<S>(engine: SharedEngine<S>, interval: Duration) -> Result<PollerHandle>
where
    S: ViewSensor + Send + 'static,
{
    spawn_poller_with(engine, interval, |_, _| {})
}

/// Like [`spawn_poller`], calling `on_poll` after every tick with the outcome and
/// the refreshed panel status (still under the lock).
pub fn spawn_poller_with<S, F>(
    engine: SharedEngine<S>,
    interval: Duration,
    mut on_poll: F,
) -> Result<PollerHandle>
where
    S: ViewSensor + Send + 'static,
    F: FnMut(&TickOutcome, &PanelStatus) + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let ticks = Arc::new(AtomicU64::new(0));

    let thread_stop = Arc::clone(&stop);
    let thread_ticks = Arc::clone(&ticks);
    let thread = thread::Builder::new()
        .name("tally-poller".to_string())
        .spawn(move || {
            debug!(interval_ms = interval.as_millis() as u64, "Poller started");
            while !thread_stop.load(Ordering::SeqCst) {
                {
                    let mut engine = lock_engine(&engine);
                    let outcome = engine.tick();
                    let status = engine.status();
                    on_poll(&outcome, &status);
                }
                thread_ticks.fetch_add(1, Ordering::SeqCst);
                thread::park_timeout(interval);
            }
            debug!("Poller stopped");
        })
        .map_err(|e| TallyError::io("Failed to spawn poller thread", e))?;

    Ok(PollerHandle {
        stop,
        ticks,
        thread: Some(thread),
    })
}
