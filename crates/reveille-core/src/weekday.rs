//! Weekday vocabulary.
//!
//! Monday-based ordinals (Mon = 0 .. Sun = 6) with a mapping to the
//! external notification scheduler's 1-based Sunday-first calendar index
//! (Sun = 1 .. Sat = 7). All conversions are total over their valid input
//! ranges.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Fixed Monday-first sequence. Display ordering always follows this,
    /// never a set's natural iteration order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn from_ordinal(ordinal: u8) -> Option<Weekday> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// Monday-based ordinal, 0..=6.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn short_label(self) -> &'static str {
        ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"][self as usize]
    }

    pub fn full_label(self) -> &'static str {
        [
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ][self as usize]
    }

    /// Calendar index used by the external scheduler (1 = Sunday .. 7 = Saturday).
    pub fn calendar_index(self) -> u8 {
        [2, 3, 4, 5, 6, 7, 1][self as usize]
    }

    /// Inverse of [`Weekday::calendar_index`]. Returns `None` outside 1..=7.
    pub fn from_calendar_index(index: u8) -> Option<Weekday> {
        match index {
            1 => Some(Weekday::Sun),
            2 => Some(Weekday::Mon),
            3 => Some(Weekday::Tue),
            4 => Some(Weekday::Wed),
            5 => Some(Weekday::Thu),
            6 => Some(Weekday::Fri),
            7 => Some(Weekday::Sat),
            _ => None,
        }
    }

    /// Weekday of a civil date.
    pub fn of_date(date: chrono::NaiveDate) -> Weekday {
        Self::ALL[date.weekday().num_days_from_monday() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_ordinal(day.ordinal()), Some(day));
        }
        assert_eq!(Weekday::from_ordinal(7), None);
    }

    #[test]
    fn calendar_index_roundtrip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_calendar_index(day.calendar_index()), Some(day));
        }
    }

    #[test]
    fn calendar_index_is_sunday_first() {
        assert_eq!(Weekday::Sun.calendar_index(), 1);
        assert_eq!(Weekday::Mon.calendar_index(), 2);
        assert_eq!(Weekday::Sat.calendar_index(), 7);
        assert_eq!(Weekday::from_calendar_index(0), None);
        assert_eq!(Weekday::from_calendar_index(8), None);
    }

    #[test]
    fn of_date_matches_known_dates() {
        // 2026-08-06 is a Thursday.
        let date = chrono::NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(Weekday::of_date(date), Weekday::Thu);
        assert_eq!(Weekday::of_date(date.succ_opt().unwrap()), Weekday::Fri);
    }
}
