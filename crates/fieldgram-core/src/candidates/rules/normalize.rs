//! Canonical string forms for matched values.

use super::dates::DateFinder;
use crate::clock::{Clock, SystemClock};
use crate::models::config::DateOrder;
use crate::models::{field_type, FieldKind, DATE_FORMAT};

/// Rewrites raw matches into canonical form.
///
/// Amounts become `<integer>.<two digits>` with grouping commas removed and
/// extra fraction digits truncated. Every other tag is treated as a date and
/// becomes `MM-DD-YYYY` when a non-future date is found.
#[derive(Debug, Clone, Default)]
pub struct Normalizer<C = SystemClock> {
    clock: C,
    finder: DateFinder,
}

impl Normalizer<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Normalizer<C> {
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

    pub fn normalize(&self, text: &str, tag: &FieldKind) -> String {
        match tag {
            FieldKind::Amount => normalize_amount(text),
            _ => self.normalize_date(text),
        }
    }

    /// Normalize a value for a named invoice field.
    ///
    /// Free-text fields and names missing from the catalog pass through.
    pub fn normalize_field(&self, text: &str, field: &str) -> String {
        match field_type(field).and_then(|t| t.tag()) {
            Some(tag) => self.normalize(text, &tag),
            None => text.to_string(),
        }
    }

    fn normalize_date(&self, text: &str) -> String {
        match self.finder.find_past_dates(text, self.clock.today()).first() {
            Some(date) => date.format(DATE_FORMAT).to_string(),
            None => text.to_string(),
        }
    }
}

/// `1,234.5` -> `1234.50`, `1234` -> `1234.00`, `1,000.999` -> `1000.99`.
pub fn normalize_amount(text: &str) -> String {
    let cleaned = text.replace(',', "");
    let mut parts = cleaned.split('.');
    let integer = parts.next().unwrap_or_default();

    match parts.next() {
        None => format!("{}.00", integer),
        Some(fraction) => {
            let mut cents: String = fraction.chars().take(2).collect();
            while cents.chars().count() < 2 {
                cents.push('0');
            }
            format!("{}.{}", integer, cents)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use pretty_assertions::assert_eq;

    fn normalizer() -> Normalizer<FixedClock> {
        Normalizer::with_clock(FixedClock::ymd(2021, 9, 2).unwrap())
    }

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1,234.5"), "1234.50");
        assert_eq!(normalize_amount("1234"), "1234.00");
        assert_eq!(normalize_amount("1,000.999"), "1000.99");
        assert_eq!(normalize_amount("12.34"), "12.34");
        assert_eq!(normalize_amount("1,234,567.891"), "1234567.89");
    }

    #[test]
    fn test_normalize_amount_tag() {
        let n = normalizer();
        assert_eq!(n.normalize("1,000.999", &FieldKind::Amount), "1000.99");
    }

    #[test]
    fn test_normalize_date() {
        let n = normalizer();
        assert_eq!(n.normalize("Sep 1, 2021", &FieldKind::Date), "09-01-2021");
        assert_eq!(n.normalize("2021/08/30 or 2021/08/31", &FieldKind::Date), "08-30-2021");
    }

    #[test]
    fn test_future_date_left_unchanged() {
        let n = normalizer();
        assert_eq!(n.normalize("2021-09-03", &FieldKind::Date), "2021-09-03");
    }

    #[test]
    fn test_other_tags_treated_as_date() {
        let n = normalizer();
        assert_eq!(n.normalize("2021-09-01", &FieldKind::from("issued_on")), "09-01-2021");
        assert_eq!(n.normalize("ACME Corp", &FieldKind::from("contractor")), "ACME Corp");
    }

    #[test]
    fn test_invalid_date_fragment() {
        let n = normalizer();
        assert_eq!(n.normalize("31/02/2021", &FieldKind::Date), "31/02/2021");
        assert_eq!(
            n.normalize("31/02/2021 or 2021-08-30", &FieldKind::Date),
            "08-30-2021"
        );
    }

    #[test]
    fn test_normalize_field() {
        let n = normalizer();
        assert_eq!(n.normalize_field("2,500.1", "gross_amount"), "2500.10");
        assert_eq!(n.normalize_field("August 30, 2021", "issued_on"), "08-30-2021");
        assert_eq!(n.normalize_field("2021-08-30", "document_number"), "2021-08-30");
        assert_eq!(n.normalize_field("2021-08-30", "not_a_field"), "2021-08-30");
    }
}
