//! Alarm records, display-time handling and the alarm store.

mod record;
mod store;

pub use record::{format_display_time, parse_display_time, twelve_hour_parts, Alarm};
pub use store::AlarmStore;

use crate::rule::{self, RuleSet};
use crate::storage::Config;

/// Subtitle for a freshly created alarm: the encoded selection, or the
/// configured default when no day is selected.
pub fn subtitle_for_new_alarm(selection: RuleSet, config: &Config) -> String {
    if selection.is_empty() {
        config.alarm.default_subtitle.clone()
    } else {
        rule::encode(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::Weekday;

    #[test]
    fn empty_selection_falls_back_to_configured_default() {
        let config = Config::default();
        assert_eq!(subtitle_for_new_alarm(RuleSet::EMPTY, &config), "Weekdays");
    }

    #[test]
    fn non_empty_selection_is_encoded() {
        let config = Config::default();
        let selection = RuleSet::single(Weekday::Sat);
        assert_eq!(
            subtitle_for_new_alarm(selection, &config),
            "Saturday every week"
        );
    }
}
