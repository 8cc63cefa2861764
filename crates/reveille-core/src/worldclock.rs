//! World-clock board.
//!
//! Holds an ordered list of cities and renders each as a display row: the
//! city's local time on a 12-hour clock plus a relative-day and GMT-offset
//! caption ("Today, +9h"). The platform time-zone database is an external
//! collaborator; entries carry the resolved UTC offset.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alarm::twelve_hour_parts;
use crate::observer::{lock, ObserverId, Observers};
use crate::storage::{KeyValueStore, WORLD_CLOCK_KEY};

/// A city pinned to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClockEntry {
    pub city: String,
    #[serde(rename = "timezoneID")]
    pub timezone_id: String,
    /// UTC offset resolved for this zone, in seconds.
    pub utc_offset_secs: i32,
}

/// A rendered row: "Seoul / Today, +9h / PM / 9:04".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldClockDisplay {
    pub city: String,
    pub gmt: String,
    pub meridiem: String,
    pub time: String,
}

pub struct WorldClockBoard {
    entries: Mutex<Vec<WorldClockEntry>>,
    observers: Mutex<Observers<Vec<WorldClockEntry>>>,
    storage: Arc<dyn KeyValueStore>,
}

impl WorldClockBoard {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            observers: Mutex::new(Observers::new()),
            storage,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<WorldClockEntry> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Render every entry relative to the observer's own offset.
    pub fn render(&self, home_offset_secs: i32, now: DateTime<Utc>) -> Vec<WorldClockDisplay> {
        self.snapshot()
            .iter()
            .map(|entry| render_entry(entry, home_offset_secs, now))
            .collect()
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(
        &self,
        observer: impl Fn(&Vec<WorldClockEntry>) + Send + 'static,
    ) -> ObserverId {
        lock(&self.observers).subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        lock(&self.observers).unsubscribe(id)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Pin a city. A city already on the board (by name) is a no-op.
    pub fn add(&self, entry: WorldClockEntry) {
        let snapshot = {
            let mut entries = lock(&self.entries);
            if entries.iter().any(|existing| existing.city == entry.city) {
                return;
            }
            entries.push(entry);
            entries.clone()
        };
        self.commit(snapshot);
    }

    pub fn remove_at(&self, index: usize) {
        let snapshot = {
            let mut entries = lock(&self.entries);
            if index >= entries.len() {
                return;
            }
            entries.remove(index);
            entries.clone()
        };
        self.commit(snapshot);
    }

    pub fn move_item(&self, from: usize, to: usize) {
        let snapshot = {
            let mut entries = lock(&self.entries);
            if from >= entries.len() || to >= entries.len() {
                return;
            }
            let entry = entries.remove(from);
            entries.insert(to, entry);
            entries.clone()
        };
        self.commit(snapshot);
    }

    // ── Loading ──────────────────────────────────────────────────────

    pub fn load(&self) {
        let loaded = match self.storage.read(WORLD_CLOCK_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<WorldClockEntry>>(&json) {
                Ok(list) => list,
                Err(err) => {
                    warn!(error = %err, "world clock blob undecodable, keeping in-memory state");
                    return;
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "reading world clock failed, keeping in-memory state");
                return;
            }
        };

        let snapshot = {
            let mut entries = lock(&self.entries);
            *entries = loaded;
            entries.clone()
        };
        lock(&self.observers).notify(&snapshot);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&self, snapshot: Vec<WorldClockEntry>) {
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(err) = self.storage.write(WORLD_CLOCK_KEY, &json) {
                    warn!(error = %err, "persisting world clock failed, in-memory state stays authoritative");
                }
            }
            Err(err) => warn!(error = %err, "encoding world clock failed, skipping write"),
        }
        lock(&self.observers).notify(&snapshot);
    }
}

/// "Yesterday" / "Today" / "Tomorrow" for the target zone's civil date
/// relative to the observer's. Offsets keep the difference within one day.
pub fn relative_day_label(
    home_offset_secs: i32,
    target_offset_secs: i32,
    now: DateTime<Utc>,
) -> &'static str {
    let home_date = (now + Duration::seconds(home_offset_secs as i64)).date_naive();
    let target_date = (now + Duration::seconds(target_offset_secs as i64)).date_naive();
    let diff = (target_date - home_date).num_days();
    match diff.clamp(-1, 1) {
        -1 => "Yesterday",
        1 => "Tomorrow",
        _ => "Today",
    }
}

/// Signed whole-hour offset from GMT, e.g. "+9h" or "-4h".
pub fn gmt_offset_label(target_offset_secs: i32) -> String {
    let sign = if target_offset_secs >= 0 { '+' } else { '-' };
    let hours = target_offset_secs.abs() / 3600;
    format!("{sign}{hours}h")
}

fn render_entry(
    entry: &WorldClockEntry,
    home_offset_secs: i32,
    now: DateTime<Utc>,
) -> WorldClockDisplay {
    let local = now + Duration::seconds(entry.utc_offset_secs as i64);
    let (meridiem, hour, minute) = twelve_hour_parts(local.time());
    WorldClockDisplay {
        city: entry.city.clone(),
        gmt: format!(
            "{}, {}",
            relative_day_label(home_offset_secs, entry.utc_offset_secs, now),
            gmt_offset_label(entry.utc_offset_secs)
        ),
        meridiem: meridiem.to_string(),
        time: format!("{hour}:{minute:02}"),
    }
}
