//! Free-text date discovery.

use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use tracing::trace;

use super::patterns::{month_number, DAY_MONTH_YEAR, MONTH_DAY_YEAR, MONTH_YEAR, NUMERIC_DATE};
use crate::error::PatternParseError;
use crate::models::config::DateOrder;

/// Raw components of a date expression before calendar validation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DateParts {
    /// `a<sep>b<sep>c`, digits as written.
    Numeric(String, String, String),
    /// Textual month with optional day and year.
    Named {
        day: Option<u32>,
        month: u32,
        year: Option<String>,
    },
}

#[derive(Debug)]
struct Candidate {
    start: usize,
    end: usize,
    priority: usize,
    fragment: String,
    parts: DateParts,
}

/// Scans text for date expressions and resolves them to calendar dates.
///
/// Dates come back in the order they appear in the text. Missing years and
/// days are taken from `today`, the day capped at the end of the month.
/// Fragments that look like dates but name no calendar day are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFinder {
    order: DateOrder,
}

impl DateFinder {
    pub fn new(order: DateOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> DateOrder {
        self.order
    }

    /// Discover every date in `text`.
    ///
    /// Overlapping fragments are resolved left to right; a fragment that is
    /// not a real date (`31/02/2021`, `13/13/2021`, `1.2.3`) does not claim
    /// its text, so a valid reading starting inside it can still match.
    pub fn find_dates(&self, text: &str, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut claimed = 0;
        for candidate in scan(text) {
            if candidate.start < claimed {
                continue;
            }
            match self.resolve(&candidate, today) {
                Ok(date) => {
                    trace!("date {:?} -> {}", candidate.fragment, date);
                    dates.push(date);
                    claimed = candidate.end;
                }
                Err(e) => trace!("skipping fragment: {}", e),
            }
        }
        dates
    }

    /// Dates in `text` not later than `today`.
    pub fn find_past_dates(&self, text: &str, today: NaiveDate) -> Vec<NaiveDate> {
        self.find_dates(text, today)
            .into_iter()
            .filter(|d| *d <= today)
            .collect()
    }

    fn resolve(&self, candidate: &Candidate, today: NaiveDate) -> Result<NaiveDate, PatternParseError> {
        let invalid = || PatternParseError {
            fragment: candidate.fragment.clone(),
        };

        let (year, month, day) = match &candidate.parts {
            DateParts::Numeric(a, b, c) => self.resolve_numeric(a, b, c).ok_or_else(invalid)?,
            DateParts::Named { day, month, year } => {
                let year = match year {
                    Some(y) => expand_year(y).ok_or_else(invalid)?,
                    None => today.year(),
                };
                let day = match day {
                    Some(d) => *d,
                    None => today.day().min(last_day_of_month(year, *month).ok_or_else(invalid)?),
                };
                (year, *month, day)
            }
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    /// Assign year/month/day to three numeric groups.
    fn resolve_numeric(&self, a: &str, b: &str, c: &str) -> Option<(i32, u32, u32)> {
        let b: u32 = b.parse().ok()?;

        if a.len() == 4 {
            if c.len() > 2 {
                return None;
            }
            let year: i32 = a.parse().ok()?;
            let c: u32 = c.parse().ok()?;
            let (month, day) = prefer_valid_month(b, c);
            return Some((year, month, day));
        }

        if a.len() > 2 || !(c.len() == 2 || c.len() == 4) {
            return None;
        }
        let a: u32 = a.parse().ok()?;
        let year = expand_year(c)?;
        let (month, day) = match self.order {
            DateOrder::MonthFirst => prefer_valid_month(a, b),
            DateOrder::DayFirst => prefer_valid_month(b, a),
        };
        Some((year, month, day))
    }
}

/// `(month, day)`, swapped when `month` cannot be a month but `day` can.
fn prefer_valid_month(month: u32, day: u32) -> (u32, u32) {
    if month > 12 && day <= 12 {
        (day, month)
    } else {
        (month, day)
    }
}

/// Number of the last day of `month` in `year`.
fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

/// Two-digit years: 00-50 -> 2000s, 51-99 -> 1900s.
fn expand_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    match s.len() {
        2 if year <= 50 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

/// All date-shaped fragments in textual order, overlaps included.
fn scan(text: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for caps in NUMERIC_DATE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if touches_digit(text, m.start(), m.end()) {
            continue;
        }
        candidates.push(Candidate {
            start: m.start(),
            end: m.end(),
            priority: 0,
            fragment: m.as_str().to_string(),
            parts: DateParts::Numeric(caps[1].to_string(), caps[2].to_string(), caps[3].to_string()),
        });
    }

    collect_named(&mut candidates, &DAY_MONTH_YEAR, text, 1, |caps| {
        Some((caps[1].parse().ok(), month_number(&caps[2])?, caps.get(3)))
    });
    collect_named(&mut candidates, &MONTH_DAY_YEAR, text, 2, |caps| {
        Some((caps[2].parse().ok(), month_number(&caps[1])?, caps.get(3)))
    });
    collect_named(&mut candidates, &MONTH_YEAR, text, 3, |caps| {
        Some((None, month_number(&caps[1])?, caps.get(2)))
    });

    // Earliest start first; on ties the longer, then the higher-priority pattern.
    candidates.sort_by(|x, y| {
        x.start
            .cmp(&y.start)
            .then(y.end.cmp(&x.end))
            .then(x.priority.cmp(&y.priority))
    });
    candidates
}

fn collect_named<'t, F>(candidates: &mut Vec<Candidate>, regex: &Regex, text: &'t str, priority: usize, parts: F)
where
    F: Fn(&Captures<'t>) -> Option<(Option<u32>, u32, Option<regex::Match<'t>>)>,
{
    for caps in regex.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let Some((day, month, year)) = parts(&caps) else {
            continue;
        };
        candidates.push(Candidate {
            start: m.start(),
            end: m.end(),
            priority,
            fragment: m.as_str().to_string(),
            parts: DateParts::Named {
                day,
                month,
                year: year.map(|y| y.as_str().to_string()),
            },
        });
    }
}

/// Whether the match at `start..end` is glued to a longer digit run.
fn touches_digit(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}
