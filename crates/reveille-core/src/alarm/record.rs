//! Alarm record and display-time handling.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single alarm row.
///
/// The identifier is assigned at creation and survives edits; time,
/// subtitle and the on/off flag may change, the id never does. The JSON
/// shape matches the persisted form under the `alarms` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: Uuid,
    /// Display time on a 12-hour clock ("AM 6:00").
    pub time: String,
    /// Repeat rule rendered for display ("Weekdays", "Thu, Fri", ...).
    pub subtitle: String,
    #[serde(rename = "isOn")]
    pub is_on: bool,
}

impl Alarm {
    pub fn new(time: impl Into<String>, subtitle: impl Into<String>, is_on: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: time.into(),
            subtitle: subtitle.into(),
            is_on,
        }
    }

    /// Time-of-day parsed from the display string, if well-formed.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        parse_display_time(&self.time)
    }
}

/// Parse a "AM 6:00" / "PM 11:30" display string.
///
/// The meridiem tokens are pinned literals; anything else is a parse miss
/// and yields `None`.
pub fn parse_display_time(s: &str) -> Option<NaiveTime> {
    let mut parts = s.split_whitespace();
    let meridiem = parts.next()?;
    let clock = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (hour_text, minute_text) = clock.split_once(':')?;
    let hour: u32 = hour_text.parse().ok()?;
    let minute: u32 = minute_text.parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let hour24 = match meridiem {
        "AM" => hour % 12,
        "PM" => hour % 12 + 12,
        _ => return None,
    };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

/// Render a time-of-day as the "AM 6:00" display form.
pub fn format_display_time(time: NaiveTime) -> String {
    let (meridiem, hour, minute) = twelve_hour_parts(time);
    format!("{meridiem} {hour}:{minute:02}")
}

/// Split a time-of-day into its 12-hour clock parts.
pub fn twelve_hour_parts(time: NaiveTime) -> (&'static str, u32, u32) {
    let (is_pm, hour) = time.hour12();
    (if is_pm { "PM" } else { "AM" }, hour, time.minute())
}
