//! Invoice field catalog.

use serde::{Deserialize, Serialize};

use super::ngram::FieldKind;

/// How a downstream model treats a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text copied from the document.
    General,
    /// Free text that may be absent.
    Optional,
    /// Monetary amount.
    Amount,
    /// Calendar date.
    Date,
}

impl FieldType {
    /// Tag used to normalize values of this type, if any.
    pub fn tag(self) -> Option<FieldKind> {
        match self {
            FieldType::Amount => Some(FieldKind::Amount),
            FieldType::Date => Some(FieldKind::Date),
            FieldType::General | FieldType::Optional => None,
        }
    }
}

/// Invoice fields in the order downstream models expect them.
pub const INVOICE_FIELDS: &[(&str, FieldType)] = &[
    ("document_number", FieldType::General),
    ("contractor", FieldType::General),
    ("tax_number", FieldType::General),
    ("bank_account", FieldType::General),
    ("issued_on", FieldType::Date),
    ("sale_date", FieldType::Date),
    ("date_of_payment", FieldType::Date),
    ("currency", FieldType::General),
    ("net_amount", FieldType::Amount),
    ("gross_amount", FieldType::Amount),
    ("vat", FieldType::Optional),
];

/// Look up a field's type by name.
pub fn field_type(name: &str) -> Option<FieldType> {
    INVOICE_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, kind)| *kind)
}
