//! Word spans and their classified values.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::word::{union_box, Word};

/// Canonical date format for parsed values.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Tag selecting the pattern family for matching and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    /// Calendar date.
    Date,
    /// Monetary amount.
    Amount,
    /// Any other tag name, kept verbatim.
    Other(String),
}

impl FieldKind {
    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Date => "date",
            FieldKind::Amount => "amount",
            FieldKind::Other(name) => name,
        }
    }

    /// Whether the matcher has patterns for this tag.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldKind::Other(_))
    }
}

impl FromStr for FieldKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "date" => FieldKind::Date,
            "amount" => FieldKind::Amount,
            other => FieldKind::Other(other.to_string()),
        })
    }
}

impl From<&str> for FieldKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<String> for FieldKind {
    fn from(s: String) -> Self {
        FieldKind::from(s.as_str())
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified value in canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsedValue {
    /// Date as `MM-DD-YYYY`.
    Date(String),
    /// Unsigned decimal with two fraction digits.
    Amount(String),
}

impl ParsedValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            ParsedValue::Date(_) => FieldKind::Date,
            ParsedValue::Amount(_) => FieldKind::Amount,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParsedValue::Date(s) | ParsedValue::Amount(s) => s,
        }
    }

    /// Typed date, if this is a date parse.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ParsedValue::Date(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).ok(),
            ParsedValue::Amount(_) => None,
        }
    }

    /// Typed amount, if this is an amount parse.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            ParsedValue::Amount(s) => Decimal::from_str(s).ok(),
            ParsedValue::Date(_) => None,
        }
    }
}

/// A contiguous span of words from one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NGram {
    /// Words in reading order.
    pub words: Vec<Word>,
    /// At most one classified value; date wins over amount.
    #[serde(default)]
    pub parses: Option<ParsedValue>,
}

impl NGram {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            parses: None,
        }
    }

    /// Word texts joined with single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Union box of the span as `(left, top, right, bottom)`.
    pub fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        union_box(&self.words)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
