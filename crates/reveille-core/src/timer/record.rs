//! Countdown timer record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single countdown timer.
///
/// `time` is the remaining duration in seconds; the persisted form is a
/// float but the value is integer-valued in practice and decremented one
/// whole second per tick. The JSON shape matches the persisted form under
/// the `savedTimers` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: Uuid,
    pub time: f64,
    pub label: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl TimerRecord {
    /// New record, active by default.
    pub fn new(duration_secs: f64, label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: duration_secs.max(0.0),
            label: label.into(),
            is_active: true,
        }
    }

    /// Remaining whole seconds, floored at zero.
    pub fn remaining_secs(&self) -> u64 {
        if self.time <= 0.0 {
            0
        } else {
            self.time as u64
        }
    }
}
