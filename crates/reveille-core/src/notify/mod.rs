//! Notification trigger model and scheduling adapter.
//!
//! The external notification scheduler is an opaque collaborator: it takes
//! schedule requests keyed by a string identifier, cancels by identifier
//! prefix, and can report which identifiers have already fired. This module
//! defines that boundary ([`TriggerScheduler`]), the pure planning step that
//! turns an alarm's repeat rule into concrete trigger requests, and an
//! in-memory scheduler for tests and headless hosts.
//!
//! Trigger keys:
//! - one-shot alarm: `alarm.<id>.once`
//! - repeating alarm: `alarm.<id>.weekday.<calendar_index>`, one per day
//! - countdown timer: the bare record uuid
//!
//! Cancelling by the `alarm.<id>.` prefix therefore covers the one-shot and
//! all seven possible weekday triggers in one call.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::SchedulerError;
use crate::observer::lock;
use crate::rule::RuleSet;
use crate::weekday::Weekday;

/// Default notification sound file.
pub const DEFAULT_SOUND: &str = "radial.caf";

/// What the notification presents when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContent {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub sound: Option<String>,
}

/// When the trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TriggerFire {
    /// Fire once at an absolute timestamp.
    At { when: DateTime<Utc> },
    /// Fire once after a delay.
    After { delay_secs: u64 },
    /// Fire weekly on a calendar weekday (1 = Sunday .. 7 = Saturday).
    Weekly {
        calendar_weekday: u8,
        time: NaiveTime,
    },
}

/// A schedule request handed to the external scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub id: String,
    pub content: TriggerContent,
    pub fire: TriggerFire,
}

/// The external notification scheduler boundary.
pub trait TriggerScheduler: Send + Sync {
    /// Register a trigger. A request reusing an existing id replaces it.
    fn schedule(&self, request: TriggerRequest) -> Result<(), SchedulerError>;

    /// Cancel every pending trigger whose id starts with `prefix`.
    /// Cancelling ids with no pending trigger is not an error.
    fn cancel_prefix(&self, prefix: &str);

    /// Identifiers of triggers that have already fired.
    fn delivered_ids(&self) -> Vec<String>;

    /// Drop fired identifiers from the delivered list.
    fn remove_delivered(&self, ids: &[String]);
}

/// Key prefix shared by every trigger belonging to one alarm.
pub fn alarm_key_prefix(id: Uuid) -> String {
    format!("alarm.{id}.")
}

/// Key of an alarm's one-shot trigger.
pub fn once_key(id: Uuid) -> String {
    format!("alarm.{id}.once")
}

/// Key of an alarm's weekly trigger for one repeat day.
pub fn weekday_key(id: Uuid, day: Weekday) -> String {
    format!("alarm.{id}.weekday.{}", day.calendar_index())
}

/// Trigger requests for an enabled alarm.
///
/// An empty rule set yields a single non-repeating trigger at the next
/// future occurrence of the time-of-day: today if the time is still ahead,
/// otherwise tomorrow. A non-empty rule set yields one weekly trigger per
/// repeat day.
pub fn plan_triggers(
    id: Uuid,
    time: NaiveTime,
    rules: RuleSet,
    now: DateTime<Utc>,
    content: TriggerContent,
) -> Vec<TriggerRequest> {
    if rules.is_empty() {
        let today = now.date_naive().and_time(time).and_utc();
        let when = if today > now {
            today
        } else {
            today + Duration::days(1)
        };
        return vec![TriggerRequest {
            id: once_key(id),
            content,
            fire: TriggerFire::At { when },
        }];
    }

    rules
        .iter()
        .map(|day| TriggerRequest {
            id: weekday_key(id, day),
            content: content.clone(),
            fire: TriggerFire::Weekly {
                calendar_weekday: day.calendar_index(),
                time,
            },
        })
        .collect()
}

#[derive(Default)]
struct SchedulerState {
    pending: BTreeMap<String, TriggerRequest>,
    delivered: Vec<String>,
    schedule_calls: usize,
    cancel_calls: usize,
}

/// In-memory [`TriggerScheduler`].
///
/// Keeps pending and delivered triggers behind a mutex and counts
/// schedule/cancel calls so tests can assert net scheduling behavior.
/// Hosts without a platform notification center can use it as-is and poll
/// [`InMemoryScheduler::due`].
#[derive(Default)]
pub struct InMemoryScheduler {
    state: Mutex<SchedulerState>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending trigger ids, sorted.
    pub fn pending_ids(&self) -> Vec<String> {
        lock(&self.state).pending.keys().cloned().collect()
    }

    pub fn pending_len(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Pending requests, sorted by id.
    pub fn pending_requests(&self) -> Vec<TriggerRequest> {
        lock(&self.state).pending.values().cloned().collect()
    }

    pub fn schedule_call_count(&self) -> usize {
        lock(&self.state).schedule_calls
    }

    pub fn cancel_call_count(&self) -> usize {
        lock(&self.state).cancel_calls
    }

    /// Absolute-time triggers whose fire time has passed; moves them from
    /// pending to delivered and returns them.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<TriggerRequest> {
        let mut state = lock(&self.state);
        let due_ids: Vec<String> = state
            .pending
            .iter()
            .filter(|(_, request)| match request.fire {
                TriggerFire::At { when } => when <= now,
                TriggerFire::After { .. } | TriggerFire::Weekly { .. } => false,
            })
            .map(|(id, _)| id.clone())
            .collect();

        let mut fired = Vec::with_capacity(due_ids.len());
        for id in due_ids {
            if let Some(request) = state.pending.remove(&id) {
                state.delivered.push(id);
                fired.push(request);
            }
        }
        fired
    }

    /// Force a pending trigger into the delivered list. Returns `false`
    /// when the id has no pending trigger.
    pub fn mark_delivered(&self, id: &str) -> bool {
        let mut state = lock(&self.state);
        if state.pending.remove(id).is_some() {
            state.delivered.push(id.to_string());
            true
        } else {
            false
        }
    }
}

impl TriggerScheduler for InMemoryScheduler {
    fn schedule(&self, request: TriggerRequest) -> Result<(), SchedulerError> {
        let mut state = lock(&self.state);
        state.schedule_calls += 1;
        state.pending.insert(request.id.clone(), request);
        Ok(())
    }

    fn cancel_prefix(&self, prefix: &str) {
        let mut state = lock(&self.state);
        state.cancel_calls += 1;
        state.pending.retain(|id, _| !id.starts_with(prefix));
    }

    fn delivered_ids(&self) -> Vec<String> {
        lock(&self.state).delivered.clone()
    }

    fn remove_delivered(&self, ids: &[String]) {
        lock(&self.state)
            .delivered
            .retain(|id| !ids.iter().any(|gone| gone == id));
    }
}
