//! Date and amount classification of span text.

use std::collections::HashSet;

use regex::{NoExpand, Regex};

use super::dates::DateFinder;
use super::patterns::{AMOUNT, DATE_DAY_FIRST, DATE_YEAR_FIRST, MULTI_SPACE};
use crate::clock::{Clock, SystemClock};
use crate::models::config::DateOrder;
use crate::models::{FieldKind, DATE_FORMAT};

/// Classifies text as a date or an amount.
///
/// Detection is deliberately loose: a span only has to contain something
/// date- or amount-shaped. For the `date` tag, [`detect`](Self::detect) and
/// [`find`](Self::find) go through free-text date discovery and drop dates
/// later than the clock's today, while [`replace`](Self::replace) uses the
/// explicit day-first and year-first numeric patterns instead.
#[derive(Debug, Clone, Default)]
pub struct FieldPatternMatcher<C = SystemClock> {
    clock: C,
    finder: DateFinder,
}

impl FieldPatternMatcher<SystemClock> {
    /// Matcher reading the system clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> FieldPatternMatcher<C> {
    /// Matcher evaluating "now" through `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            finder: DateFinder::default(),
        }
    }

    /// Set the preferred reading of ambiguous numeric dates.
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.finder = DateFinder::new(order);
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether `text` contains a value of kind `tag`.
    pub fn detect(&self, text: &str, tag: &FieldKind) -> bool {
        match tag {
            FieldKind::Date => !self.finder.find_past_dates(text, self.clock.today()).is_empty(),
            FieldKind::Amount => AMOUNT.is_match(text),
            FieldKind::Other(_) => false,
        }
    }

    /// Every value of kind `tag` in `text`.
    ///
    /// Dates come back as `MM-DD-YYYY` in discovery order. Amounts come back
    /// as the matched substrings, without duplicates.
    pub fn find(&self, text: &str, tag: &FieldKind) -> Vec<String> {
        match tag {
            FieldKind::Date => self
                .finder
                .find_past_dates(text, self.clock.today())
                .into_iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
            FieldKind::Amount => {
                let mut seen = HashSet::new();
                AMOUNT
                    .find_iter(text)
                    .map(|m| m.as_str())
                    .filter(|s| seen.insert(*s))
                    .map(str::to_string)
                    .collect()
            }
            FieldKind::Other(_) => Vec::new(),
        }
    }

    /// Replace every `tag` match in `text` with `substitute` and squeeze
    /// repeated spaces. Unknown tags return `text` untouched.
    pub fn replace(&self, text: &str, tag: &FieldKind, substitute: &str) -> String {
        let patterns: Vec<&Regex> = match tag {
            FieldKind::Date => vec![&*DATE_DAY_FIRST, &*DATE_YEAR_FIRST],
            FieldKind::Amount => vec![&*AMOUNT],
            FieldKind::Other(_) => return text.to_string(),
        };

        let mut replaced = text.to_string();
        for pattern in patterns {
            replaced = pattern.replace_all(&replaced, NoExpand(substitute)).into_owned();
        }
        MULTI_SPACE.replace_all(&replaced, " ").into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use pretty_assertions::assert_eq;

    fn matcher(year: i32, month: u32, day: u32) -> FieldPatternMatcher<FixedClock> {
        FieldPatternMatcher::with_clock(FixedClock::ymd(year, month, day).unwrap())
    }

    #[test]
    fn test_future_date_rejected() {
        let text = "Invoice date: 2021-09-01";
        assert!(!matcher(2021, 8, 1).detect(text, &FieldKind::Date));
        assert!(matcher(2021, 9, 2).detect(text, &FieldKind::Date));
    }

    #[test]
    fn test_date_on_evaluation_day_accepted() {
        assert!(matcher(2021, 9, 1).detect("2021-09-01", &FieldKind::Date));
    }

    #[test]
    fn test_find_dates_discovery_order() {
        let m = matcher(2022, 1, 1);
        assert_eq!(
            m.find("Due 12/31/2021, issued 1 December 2021", &FieldKind::Date),
            vec!["12-31-2021".to_string(), "12-01-2021".to_string()]
        );
    }

    #[test]
    fn test_find_dates_drops_future() {
        let m = matcher(2021, 12, 15);
        assert_eq!(
            m.find("Due 12/31/2021, issued 1 December 2021", &FieldKind::Date),
            vec!["12-01-2021".to_string()]
        );
    }

    #[test]
    fn test_invalid_date_fragment_is_no_match() {
        let m = matcher(2022, 1, 1);
        assert!(!m.detect("99/99/2021", &FieldKind::Date));
        assert!(m.find("ref 31/02/2021", &FieldKind::Date).is_empty());
    }

    #[test]
    fn test_date_next_to_invalid_fragment() {
        let m = matcher(2021, 9, 2);
        for text in [
            "Paid 2021-08-30 ref 31/02/2021",
            "2021-08-30 v1.2.3",
            "2021-08-30 45 Sep",
        ] {
            assert!(m.detect(text, &FieldKind::Date), "{}", text);
            assert_eq!(m.find(text, &FieldKind::Date), vec!["08-30-2021".to_string()]);
        }
    }

    #[test]
    fn test_detect_amount() {
        let m = matcher(2022, 1, 1);
        assert!(m.detect("Total: 1,234.56", &FieldKind::Amount));
        assert!(!m.detect("Qty 12", &FieldKind::Amount));
    }

    #[test]
    fn test_find_amount_distinct() {
        let m = matcher(2022, 1, 1);
        let found = m.find("10.00 + 10.00 = 20.00", &FieldKind::Amount);
        assert_eq!(found, vec!["10.00".to_string(), "20.00".to_string()]);
    }

    #[test]
    fn test_unknown_tag() {
        let m = matcher(2022, 1, 1);
        let tag = FieldKind::from("unknown_tag");
        let text = "Total:   1,234.56  on 2021-09-01";
        assert!(!m.detect(text, &tag));
        assert!(m.find(text, &tag).is_empty());
        assert_eq!(m.replace(text, &tag, "X"), text);
    }

    #[test]
    fn test_replace_amount_collapses_spaces() {
        let m = matcher(2022, 1, 1);
        assert_eq!(
            m.replace("Total:  1,234.56   USD", &FieldKind::Amount, "<amount>"),
            "Total: <amount> USD"
        );
    }

    #[test]
    fn test_replace_substitute_is_literal() {
        let m = matcher(2022, 1, 1);
        assert_eq!(m.replace("cost 5.00", &FieldKind::Amount, "$1"), "cost $1");
    }

    // Detection of dates ignores the explicit numeric patterns, substitution
    // uses only them. Both directions are pinned here.
    #[test]
    fn test_date_tag_asymmetry() {
        let m = matcher(2022, 1, 1);

        // Textual date: detected, but the numeric patterns leave it alone.
        let textual = "Issued September 1, 2021";
        assert!(m.detect(textual, &FieldKind::Date));
        assert_eq!(m.replace(textual, &FieldKind::Date, "<date>"), textual);

        // Comma-separated numerics: not a date to discovery, replaced anyway.
        let numeric = "Ref 01,02,2021";
        assert!(!m.detect(numeric, &FieldKind::Date));
        assert_eq!(m.replace(numeric, &FieldKind::Date, "<date>"), "Ref <date>");
    }

    #[test]
    fn test_replace_date_both_patterns() {
        let m = matcher(2022, 1, 1);
        assert_eq!(
            m.replace("from 01/02/2021 to 2021/3/4", &FieldKind::Date, "D"),
            "from D to D"
        );
    }
}
