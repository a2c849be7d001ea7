//! Common regex patterns for candidate classification.

use lazy_static::lazy_static;
use regex::Regex;

/// English month names, full or abbreviated, captured as one group.
macro_rules! month {
    () => {
        r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?"
    };
}

lazy_static! {
    // Amount: integer part (optionally comma-grouped), a point, and a fraction
    pub static ref AMOUNT: Regex = Regex::new(
        r"\d+[,\d]*\.\d+"
    ).unwrap();

    // Explicit numeric date shapes, used for substitution only
    pub static ref DATE_DAY_FIRST: Regex = Regex::new(
        r"\d{1,2}[/\\.,-]\d{1,2}[/\\.,-]\d{2,4}"
    ).unwrap();

    pub static ref DATE_YEAR_FIRST: Regex = Regex::new(
        r"\d{2,4}[/\\.,-]\d{1,2}[/\\.,-]\d{1,2}"
    ).unwrap();

    // Free-text date discovery
    pub static ref NUMERIC_DATE: Regex = Regex::new(
        r"(\d{1,4})[/\\.\-](\d{1,2})[/\\.\-](\d{1,4})"
    ).unwrap();

    // "1 September 2021", "1st of Sep, 2021", "01-Sep-21"
    pub static ref DAY_MONTH_YEAR: Regex = Regex::new(concat!(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?(?:\s+of)?[\s.,/-]*",
        month!(),
        r"(?:[\s.,/-]*(\d{4}|\d{2})\b)?"
    )).unwrap();

    // "September 1, 2021", "Sep 1st 2021", "Sept. 1"
    pub static ref MONTH_DAY_YEAR: Regex = Regex::new(concat!(
        r"(?i)\b",
        month!(),
        r"[\s.,/-]*(\d{1,2})(?:st|nd|rd|th)?\b(?:[\s.,/-]+(\d{4})\b)?"
    )).unwrap();

    // "September 2021"
    pub static ref MONTH_YEAR: Regex = Regex::new(concat!(
        r"(?i)\b",
        month!(),
        r"[\s.,/-]*(\d{4})\b"
    )).unwrap();

    // Two or more consecutive spaces
    pub static ref MULTI_SPACE: Regex = Regex::new(
        r" {2,}"
    ).unwrap();
}

/// Month number for an English month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
