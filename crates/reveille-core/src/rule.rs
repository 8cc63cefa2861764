//! Repeat rules and the subtitle codec.
//!
//! An alarm's repeat rule is a set of weekdays. The rule is not persisted
//! directly -- it is rendered into the alarm's subtitle text ("Weekdays",
//! "Thu, Fri", "Monday every week") and parsed back out when the alarm is
//! scheduled or edited. The empty set means the alarm fires once.
//!
//! Token literals are pinned: the codec matches exact English labels from
//! the weekday vocabulary, never locale-dependent fuzzy matching.

use serde::{Deserialize, Serialize};

use crate::weekday::Weekday;

/// Subtitle shown for a one-shot alarm.
pub const TOKEN_TODAY: &str = "Today";
/// Subtitle shown for the canonical Mon..Fri rule.
pub const TOKEN_WEEKDAYS: &str = "Weekdays";
/// Subtitle shown for the canonical Sat/Sun rule.
pub const TOKEN_WEEKEND: &str = "Weekend";

const SUFFIX_EVERY_WEEK: &str = "every week";

/// Set of weekdays an alarm repeats on. Empty means "fire once".
///
/// Backed by a bitmask; iteration always yields the fixed Monday-first
/// order regardless of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(u8);

impl RuleSet {
    pub const EMPTY: RuleSet = RuleSet(0);
    /// Mon..Fri.
    pub const WEEKDAYS: RuleSet = RuleSet(0b0001_1111);
    /// Sat and Sun.
    pub const WEEKEND: RuleSet = RuleSet(0b0110_0000);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn single(day: Weekday) -> Self {
        let mut rules = Self::EMPTY;
        rules.insert(day);
        rules
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.ordinal()) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.ordinal();
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !(1 << day.ordinal());
    }

    pub fn toggle(&mut self, day: Weekday) {
        self.0 ^= 1 << day.ordinal();
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Days in fixed Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut rules = RuleSet::EMPTY;
        for day in iter {
            rules.insert(day);
        }
        rules
    }
}

/// Render a rule set into its display subtitle.
pub fn encode(rules: RuleSet) -> String {
    if rules.is_empty() {
        return TOKEN_TODAY.to_string();
    }
    if rules == RuleSet::WEEKDAYS {
        return TOKEN_WEEKDAYS.to_string();
    }
    if rules == RuleSet::WEEKEND {
        return TOKEN_WEEKEND.to_string();
    }
    if rules.len() == 1 {
        if let Some(day) = rules.iter().next() {
            return format!("{} {}", day.full_label(), SUFFIX_EVERY_WEEK);
        }
    }
    let names: Vec<&str> = rules.iter().map(Weekday::short_label).collect();
    names.join(", ")
}

/// Parse a display subtitle back into its rule set.
///
/// "Today" decodes to the empty set: `encode(EMPTY)` produces "Today", and
/// the round-trip law `decode(encode(r)) == r` leaves no other choice. The
/// concrete same-day firing for a one-shot alarm is computed by the
/// scheduling adapter at schedule time.
///
/// Any other text is scanned token by token against the weekday vocabulary;
/// unrecognized tokens (including the "every week" suffix) are silently
/// ignored, so text with no day tokens yields the empty set.
pub fn decode(subtitle: &str) -> RuleSet {
    if subtitle.contains(TOKEN_WEEKDAYS) {
        return RuleSet::WEEKDAYS;
    }
    if subtitle.contains(TOKEN_WEEKEND) {
        return RuleSet::WEEKEND;
    }
    if subtitle.contains(TOKEN_TODAY) {
        return RuleSet::EMPTY;
    }
    subtitle
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .filter_map(match_day_token)
        .collect()
}

fn match_day_token(token: &str) -> Option<Weekday> {
    Weekday::ALL
        .into_iter()
        .find(|day| token == day.short_label() || token == day.full_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_canonical_labels() {
        assert_eq!(encode(RuleSet::EMPTY), "Today");
        assert_eq!(encode(RuleSet::WEEKDAYS), "Weekdays");
        assert_eq!(encode(RuleSet::WEEKEND), "Weekend");
    }

    #[test]
    fn encode_single_day() {
        assert_eq!(encode(RuleSet::single(Weekday::Mon)), "Monday every week");
        assert_eq!(encode(RuleSet::single(Weekday::Sun)), "Sunday every week");
    }

    #[test]
    fn encode_multi_day_is_monday_first() {
        // Insertion order must not leak into the rendering.
        let rules: RuleSet = [Weekday::Fri, Weekday::Thu].into_iter().collect();
        assert_eq!(encode(rules), "Thu, Fri");

        let rules: RuleSet = [Weekday::Sun, Weekday::Wed, Weekday::Mon].into_iter().collect();
        assert_eq!(encode(rules), "Mon, Wed, Sun");
    }

    #[test]
    fn decode_canonical_labels() {
        assert_eq!(decode("Weekdays"), RuleSet::WEEKDAYS);
        assert_eq!(decode("Weekend"), RuleSet::WEEKEND);
        assert_eq!(decode("Today"), RuleSet::EMPTY);
        assert_eq!(decode(""), RuleSet::EMPTY);
    }

    #[test]
    fn decode_day_lists() {
        let expected: RuleSet = [Weekday::Thu, Weekday::Fri].into_iter().collect();
        assert_eq!(decode("Thu, Fri"), expected);
        // Spacing variations parse the same.
        assert_eq!(decode("Thu,Fri"), expected);
    }

    #[test]
    fn decode_single_day_with_suffix() {
        assert_eq!(decode("Monday every week"), RuleSet::single(Weekday::Mon));
    }

    #[test]
    fn decode_ignores_unrecognized_tokens() {
        assert_eq!(decode("sometime soon"), RuleSet::EMPTY);
        assert_eq!(decode("Mon and also breakfast"), RuleSet::single(Weekday::Mon));
    }

    #[test]
    fn roundtrip_holds_for_every_rule_set() {
        for bits in 0u8..=0b0111_1111 {
            let rules = RuleSet(bits);
            assert_eq!(decode(&encode(rules)), rules, "bits {bits:#09b}");
        }
    }

    proptest! {
        #[test]
        fn decode_never_panics_and_is_stable(s in ".{0,64}") {
            let first = decode(&s);
            // Re-encoding a decoded rule and decoding again is a fixpoint.
            prop_assert_eq!(decode(&encode(first)), first);
        }
    }
}
