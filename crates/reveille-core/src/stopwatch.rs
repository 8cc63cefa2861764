//! Stopwatch model.
//!
//! Wall-clock based, no internal thread: the host polls
//! [`Stopwatch::elapsed_ms`] at whatever rate it renders. Pausing folds the
//! running span into an accumulator so elapsed time survives stop/start
//! cycles, and the whole model can be snapshotted to storage and resumed.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::storage::{KeyValueStore, STOPWATCH_KEY};

/// One recorded lap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapTime {
    pub id: Uuid,
    /// 1-based lap number.
    pub number: u32,
    /// Elapsed time at the moment the lap was recorded.
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stopwatch {
    running: bool,
    /// Elapsed time folded in by previous runs.
    accumulated_ms: u64,
    /// Wall-clock start of the current run (epoch milliseconds).
    #[serde(default)]
    started_at_ms: Option<u64>,
    #[serde(default)]
    laps: Vec<LapTime>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total elapsed milliseconds, including the current run.
    pub fn elapsed_ms(&self) -> u64 {
        let current = self
            .started_at_ms
            .map(|started| now_ms().saturating_sub(started))
            .unwrap_or(0);
        self.accumulated_ms + current
    }

    pub fn laps(&self) -> &[LapTime] {
        &self.laps
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.started_at_ms = Some(now_ms());
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(started) = self.started_at_ms.take() {
            self.accumulated_ms += now_ms().saturating_sub(started);
        }
        self.running = false;
    }

    /// Stop and clear elapsed time and laps.
    pub fn reset(&mut self) {
        self.stop();
        self.accumulated_ms = 0;
        self.laps.clear();
    }

    /// Record the current elapsed time as the next lap.
    pub fn record_lap(&mut self) -> LapTime {
        let lap = LapTime {
            id: Uuid::new_v4(),
            number: self.laps.len() as u32 + 1,
            elapsed_ms: self.elapsed_ms(),
        };
        self.laps.push(lap.clone());
        lap
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Snapshot to storage. Failures are logged and swallowed; the
    /// in-memory model stays authoritative.
    pub fn save(&self, storage: &dyn KeyValueStore) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "encoding stopwatch failed, skipping write");
                return;
            }
        };
        if let Err(err) = storage.write(STOPWATCH_KEY, &json) {
            warn!(error = %err, "persisting stopwatch failed");
        }
    }

    /// Restore a snapshot, or `None` when nothing usable is stored.
    pub fn load(storage: &dyn KeyValueStore) -> Option<Self> {
        match storage.read(STOPWATCH_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(model) => Some(model),
                Err(err) => {
                    warn!(error = %err, "stopwatch blob undecodable");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "reading stopwatch failed");
                None
            }
        }
    }

    /// Drop the stored snapshot.
    pub fn clear_saved(storage: &dyn KeyValueStore) {
        if let Err(err) = storage.remove(STOPWATCH_KEY) {
            warn!(error = %err, "clearing stopwatch snapshot failed");
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
