//! Tick-driven countdown ledger.
//!
//! The ledger owns the timer collection and is the source of truth over
//! any UI snapshot. It has no internal thread: the host calls [`TimerLedger::tick`]
//! once per second. Records reaching zero are removed and handed back so
//! the caller can fire a completion notification exactly once each.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::warn;
use uuid::Uuid;

use super::record::TimerRecord;
use crate::notify::{TriggerContent, TriggerFire, TriggerRequest, TriggerScheduler};
use crate::observer::{lock, ObserverId, Observers};
use crate::storage::{Config, KeyValueStore, TIMERS_KEY};

pub struct TimerLedger {
    records: Mutex<Vec<TimerRecord>>,
    /// Record ids with a pending external trigger, to keep registration
    /// and cancellation in step with the active flags.
    scheduled: Mutex<HashSet<Uuid>>,
    observers: Mutex<Observers<Vec<TimerRecord>>>,
    storage: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn TriggerScheduler>,
    notifications_enabled: bool,
    sound: String,
}

impl TimerLedger {
    pub fn new(storage: Arc<dyn KeyValueStore>, scheduler: Arc<dyn TriggerScheduler>) -> Self {
        Self::with_config(storage, scheduler, &Config::default())
    }

    pub fn with_config(
        storage: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn TriggerScheduler>,
        config: &Config,
    ) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            scheduled: Mutex::new(HashSet::new()),
            observers: Mutex::new(Observers::new()),
            storage,
            scheduler,
            notifications_enabled: config.notifications.enabled,
            sound: config.notifications.sound.clone(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<TimerRecord> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(&self, observer: impl Fn(&Vec<TimerRecord>) + Send + 'static) -> ObserverId {
        lock(&self.observers).subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        lock(&self.observers).unsubscribe(id)
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Hydrate from storage. Call [`TimerLedger::resync`] afterward to
    /// re-register triggers for the loaded active records.
    pub fn load(&self) {
        let loaded = match self.storage.read(TIMERS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<TimerRecord>>(&json) {
                Ok(list) => list,
                Err(err) => {
                    warn!(error = %err, "timers blob undecodable, keeping in-memory state");
                    return;
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "reading timers failed, keeping in-memory state");
                return;
            }
        };

        let snapshot = {
            let mut records = lock(&self.records);
            *records = loaded;
            records.clone()
        };
        lock(&self.observers).notify(&snapshot);
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create a timer, active by default, with its external trigger
    /// registered `max(1, remaining)` seconds out.
    pub fn add(&self, duration_secs: f64, label: impl Into<String>) -> TimerRecord {
        let record = TimerRecord::new(duration_secs, label);
        let snapshot = {
            let mut records = lock(&self.records);
            records.push(record.clone());
            records.clone()
        };
        self.schedule_record(&record);
        self.commit(snapshot);
        record
    }

    /// Advance every active timer by one second.
    ///
    /// Records reaching exactly zero are removed from the ledger, their
    /// pending triggers cancelled, and returned. The caller fires the
    /// completion notification exactly once per returned record.
    pub fn tick(&self) -> Vec<TimerRecord> {
        let (snapshot, finished) = {
            let mut records = lock(&self.records);
            let mut finished = Vec::new();
            let mut changed = false;
            for record in records.iter_mut() {
                if record.is_active && record.time > 0.0 {
                    record.time -= 1.0;
                    changed = true;
                    if record.time <= 0.0 {
                        record.time = 0.0;
                        finished.push(record.clone());
                    }
                }
            }
            if !changed {
                return Vec::new();
            }
            if !finished.is_empty() {
                let gone: HashSet<Uuid> = finished.iter().map(|record| record.id).collect();
                records.retain(|record| !gone.contains(&record.id));
            }
            (records.clone(), finished)
        };

        for record in &finished {
            self.scheduler.cancel_prefix(&record.id.to_string());
            lock(&self.scheduled).remove(&record.id);
        }
        self.commit(snapshot);
        finished
    }

    /// Flip the active flag. Activating registers the external trigger;
    /// deactivating cancels it and re-sorts the ledger by remaining time
    /// ascending, ties broken by id ascending.
    pub fn toggle_active(&self, id: Uuid) {
        let (snapshot, toggled) = {
            let mut records = lock(&self.records);
            let Some(index) = records.iter().position(|record| record.id == id) else {
                return;
            };
            records[index].is_active = !records[index].is_active;
            let toggled = records[index].clone();
            if !toggled.is_active {
                records.sort_by(compare_records);
            }
            (records.clone(), toggled)
        };

        if toggled.is_active {
            self.schedule_record(&toggled);
        } else {
            self.scheduler.cancel_prefix(&id.to_string());
            lock(&self.scheduled).remove(&id);
        }
        self.commit(snapshot);
    }

    pub fn remove(&self, id: Uuid) {
        let snapshot = {
            let mut records = lock(&self.records);
            let before = records.len();
            records.retain(|record| record.id != id);
            if records.len() == before {
                return;
            }
            records.clone()
        };
        self.scheduler.cancel_prefix(&id.to_string());
        lock(&self.scheduled).remove(&id);
        self.commit(snapshot);
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// Foreground-resume sweep: timers whose trigger already fired while
    /// the process was backgrounded have notified the user, so drop them
    /// from the ledger and clear the scheduler's delivered list for them.
    pub fn sweep_delivered(&self) {
        let fired: Vec<Uuid> = self
            .scheduler
            .delivered_ids()
            .iter()
            .filter_map(|id| Uuid::parse_str(id).ok())
            .collect();
        if fired.is_empty() {
            return;
        }

        let snapshot = {
            let mut records = lock(&self.records);
            records.retain(|record| !fired.contains(&record.id));
            records.clone()
        };

        let id_strings: Vec<String> = fired.iter().map(|id| id.to_string()).collect();
        self.scheduler.remove_delivered(&id_strings);
        {
            let mut tracked = lock(&self.scheduled);
            for id in &fired {
                tracked.remove(id);
            }
        }
        self.commit(snapshot);
    }

    /// Bring trigger registrations in step with the active flags:
    /// register active records that have none, cancel registrations whose
    /// record is inactive or gone. Run after [`TimerLedger::load`].
    pub fn resync(&self) {
        let snapshot = self.snapshot();
        let active: HashSet<Uuid> = snapshot
            .iter()
            .filter(|record| record.is_active && record.time > 0.0)
            .map(|record| record.id)
            .collect();
        let tracked = lock(&self.scheduled).clone();

        for record in snapshot
            .iter()
            .filter(|record| active.contains(&record.id) && !tracked.contains(&record.id))
        {
            self.schedule_record(record);
        }
        for id in tracked.difference(&active) {
            self.scheduler.cancel_prefix(&id.to_string());
        }
        *lock(&self.scheduled) = active;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn schedule_record(&self, record: &TimerRecord) {
        if !self.notifications_enabled {
            return;
        }
        let request = TriggerRequest {
            id: record.id.to_string(),
            content: TriggerContent {
                title: "Timer".into(),
                body: record.label.clone(),
                sound: Some(self.sound.clone()),
            },
            fire: TriggerFire::After {
                delay_secs: record.remaining_secs().max(1),
            },
        };
        if let Err(err) = self.scheduler.schedule(request) {
            warn!(timer = %record.id, error = %err, "trigger rejected");
            return;
        }
        lock(&self.scheduled).insert(record.id);
    }

    fn commit(&self, snapshot: Vec<TimerRecord>) {
        self.persist(&snapshot);
        lock(&self.observers).notify(&snapshot);
    }

    fn persist(&self, snapshot: &[TimerRecord]) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "encoding timers failed, skipping write");
                return;
            }
        };
        if let Err(err) = self.storage.write(TIMERS_KEY, &json) {
            warn!(error = %err, "persisting timers failed, in-memory state stays authoritative");
        }
    }
}

/// Ledger ordering after a deactivation: remaining ascending, ties broken
/// by id string ascending.
fn compare_records(a: &TimerRecord, b: &TimerRecord) -> Ordering {
    match a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.id.to_string().cmp(&b.id.to_string()),
        other => other,
    }
}
