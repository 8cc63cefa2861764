//! Ordered alarm collection with persistence and trigger upkeep.
//!
//! The store owns the collection. Every mutation runs inside one critical
//! section, persists the full collection afterward, and then publishes an
//! immutable snapshot to observers in registration order. Operations keyed
//! by an unknown identifier or an out-of-range position are silent no-ops.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::record::Alarm;
use crate::notify::{self, TriggerContent, TriggerScheduler};
use crate::observer::{lock, ObserverId, Observers};
use crate::rule;
use crate::storage::{Config, KeyValueStore, ALARMS_KEY};

pub struct AlarmStore {
    alarms: Mutex<Vec<Alarm>>,
    observers: Mutex<Observers<Vec<Alarm>>>,
    storage: Arc<dyn KeyValueStore>,
    scheduler: Arc<dyn TriggerScheduler>,
    notifications_enabled: bool,
    sound: String,
}

impl AlarmStore {
    /// Store with default notification preferences.
    pub fn new(storage: Arc<dyn KeyValueStore>, scheduler: Arc<dyn TriggerScheduler>) -> Self {
        Self::with_config(storage, scheduler, &Config::default())
    }

    /// Store honoring the host's notification preferences: when
    /// notifications are disabled no triggers are registered, the on/off
    /// flags still behave normally.
    pub fn with_config(
        storage: Arc<dyn KeyValueStore>,
        scheduler: Arc<dyn TriggerScheduler>,
        config: &Config,
    ) -> Self {
        Self {
            alarms: Mutex::new(Vec::new()),
            observers: Mutex::new(Observers::new()),
            storage,
            scheduler,
            notifications_enabled: config.notifications.enabled,
            sound: config.notifications.sound.clone(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Vec<Alarm> {
        lock(&self.alarms).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.alarms).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.alarms).is_empty()
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(&self, observer: impl Fn(&Vec<Alarm>) + Send + 'static) -> ObserverId {
        lock(&self.observers).subscribe(observer)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        lock(&self.observers).unsubscribe(id)
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Hydrate from storage. A missing key yields an empty collection; an
    /// unreadable blob leaves the in-memory state untouched.
    pub fn load(&self) {
        let loaded = match self.storage.read(ALARMS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Alarm>>(&json) {
                Ok(list) => list,
                Err(err) => {
                    warn!(error = %err, "alarms blob undecodable, keeping in-memory state");
                    return;
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "reading alarms failed, keeping in-memory state");
                return;
            }
        };

        let snapshot = {
            let mut alarms = lock(&self.alarms);
            *alarms = loaded;
            alarms.clone()
        };
        lock(&self.observers).notify(&snapshot);
    }

    /// Seed the collection with the stock sample alarms.
    pub fn load_sample_data(&self) {
        let snapshot = {
            let mut alarms = lock(&self.alarms);
            *alarms = vec![
                Alarm::new("AM 9:00", rule::TOKEN_WEEKDAYS, false),
                Alarm::new("AM 11:00", rule::TOKEN_WEEKDAYS, false),
                Alarm::new("PM 2:00", rule::TOKEN_WEEKDAYS, false),
                Alarm::new("PM 8:00", rule::TOKEN_WEEKDAYS, false),
            ];
            alarms.clone()
        };
        self.commit(snapshot);
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Create an alarm with a fresh identifier and append it.
    pub fn add(
        &self,
        time: impl Into<String>,
        subtitle: impl Into<String>,
        is_on: bool,
    ) -> Alarm {
        let alarm = Alarm::new(time, subtitle, is_on);
        let snapshot = {
            let mut alarms = lock(&self.alarms);
            alarms.push(alarm.clone());
            alarms.clone()
        };
        if alarm.is_on {
            self.schedule_alarm(&alarm);
        }
        self.commit(snapshot);
        alarm
    }

    /// Replace the stored record with a matching identifier. Unknown id
    /// leaves the collection untouched.
    pub fn update(&self, alarm: Alarm) {
        let snapshot = {
            let mut alarms = lock(&self.alarms);
            let Some(slot) = alarms.iter_mut().find(|a| a.id == alarm.id) else {
                return;
            };
            *slot = alarm.clone();
            alarms.clone()
        };
        self.scheduler.cancel_prefix(&notify::alarm_key_prefix(alarm.id));
        if alarm.is_on {
            self.schedule_alarm(&alarm);
        }
        self.commit(snapshot);
    }

    pub fn remove(&self, id: Uuid) {
        let snapshot = {
            let mut alarms = lock(&self.alarms);
            let before = alarms.len();
            alarms.retain(|a| a.id != id);
            if alarms.len() == before {
                return;
            }
            alarms.clone()
        };
        self.scheduler.cancel_prefix(&notify::alarm_key_prefix(id));
        self.commit(snapshot);
    }

    pub fn remove_at(&self, index: usize) {
        let (snapshot, removed) = {
            let mut alarms = lock(&self.alarms);
            if index >= alarms.len() {
                return;
            }
            let removed = alarms.remove(index);
            (alarms.clone(), removed)
        };
        self.scheduler
            .cancel_prefix(&notify::alarm_key_prefix(removed.id));
        self.commit(snapshot);
    }

    /// Flip the on/off flag, registering or cancelling triggers to match.
    pub fn toggle(&self, id: Uuid) {
        let (snapshot, toggled) = {
            let mut alarms = lock(&self.alarms);
            let Some(slot) = alarms.iter_mut().find(|a| a.id == id) else {
                return;
            };
            slot.is_on = !slot.is_on;
            let toggled = slot.clone();
            (alarms.clone(), toggled)
        };
        self.scheduler.cancel_prefix(&notify::alarm_key_prefix(id));
        if toggled.is_on {
            self.schedule_alarm(&toggled);
        }
        self.commit(snapshot);
    }

    /// Reposition within the ordered collection. Display order only, no
    /// scheduling effect.
    pub fn move_item(&self, from: usize, to: usize) {
        let snapshot = {
            let mut alarms = lock(&self.alarms);
            if from >= alarms.len() || to >= alarms.len() {
                return;
            }
            let item = alarms.remove(from);
            alarms.insert(to, item);
            alarms.clone()
        };
        self.commit(snapshot);
    }

    // ── Trigger upkeep ───────────────────────────────────────────────

    /// Rebuild every alarm trigger from current state: clear all pending
    /// and delivered alarm triggers, then re-register the enabled alarms.
    /// Run after process restart to undo drift between persisted state and
    /// the external scheduler.
    pub fn resync(&self) {
        self.scheduler.cancel_prefix("alarm.");
        let delivered: Vec<String> = self
            .scheduler
            .delivered_ids()
            .into_iter()
            .filter(|id| id.starts_with("alarm."))
            .collect();
        if !delivered.is_empty() {
            self.scheduler.remove_delivered(&delivered);
        }
        for alarm in self.snapshot().iter().filter(|a| a.is_on) {
            self.schedule_alarm(alarm);
        }
    }

    fn schedule_alarm(&self, alarm: &Alarm) {
        if !self.notifications_enabled {
            debug!(alarm = %alarm.id, "notifications disabled, alarm left unscheduled");
            return;
        }
        let Some(time) = alarm.time_of_day() else {
            warn!(alarm = %alarm.id, time = %alarm.time, "unparseable display time, alarm left unscheduled");
            return;
        };
        let rules = rule::decode(&alarm.subtitle);
        let content = TriggerContent {
            title: "Alarm".into(),
            body: alarm.time.clone(),
            sound: Some(self.sound.clone()),
        };
        for request in notify::plan_triggers(alarm.id, time, rules, Utc::now(), content) {
            if let Err(err) = self.scheduler.schedule(request) {
                warn!(alarm = %alarm.id, error = %err, "trigger rejected");
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn commit(&self, snapshot: Vec<Alarm>) {
        self.persist(&snapshot);
        lock(&self.observers).notify(&snapshot);
    }

    fn persist(&self, snapshot: &[Alarm]) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "encoding alarms failed, skipping write");
                return;
            }
        };
        if let Err(err) = self.storage.write(ALARMS_KEY, &json) {
            warn!(error = %err, "persisting alarms failed, in-memory state stays authoritative");
        }
    }
}
