//! Raw records, result pages and resolved rows
//!
//! A [`RawRecord`] is what the record store hands back: per field, a stored
//! value and optionally a human-readable display text (a coded reference
//! resolved to its label). A [`Page`] is one bounded batch of records tagged
//! with its position among all pages of a query execution. A [`ResolvedRow`]
//! is the fully formatted cell sequence that goes to the serializer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One field of a raw record: the stored value plus optional display text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldValue {
    /// Raw stored value, absent if the store returned nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Human-readable display text, e.g. a reference resolved to its label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl FieldValue {
    /// A field with only a raw value
    pub fn raw(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            text: None,
        }
    }

    /// A field with a raw value and display text
    pub fn with_text(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            text: Some(text.into()),
        }
    }
}

/// One raw result record: field name to field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct RawRecord {
    fields: HashMap<String, FieldValue>,
}

impl RawRecord {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Builder-style field setter
    pub fn field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a field; absent fields are simply `None`
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no populated fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One bounded batch of records from a query execution
///
/// Pages are disjoint and their concatenation in `index` order is the full
/// result set exactly once, given a stable query during the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based position among all pages of this execution
    pub index: usize,

    /// Records of this page, in result-set order
    pub records: Vec<RawRecord>,
}

impl Page {
    /// Creates a page at the given position
    pub fn new(index: usize, records: Vec<RawRecord>) -> Self {
        Self { index, records }
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One fully formatted output row, cells in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    cells: Vec<String>,
}

impl ResolvedRow {
    /// Creates a row from formatted cells
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// The formatted cells, in column order
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Number of cells; always equals the job's column count
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a row with no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl From<Vec<String>> for ResolvedRow {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_raw() {
        let field = FieldValue::raw("1234.5");
        assert_eq!(field.value.as_deref(), Some("1234.5"));
        assert_eq!(field.text, None);
    }

    #[test]
    fn test_field_value_with_text() {
        let field = FieldValue::with_text("7", "EUR");
        assert_eq!(field.value.as_deref(), Some("7"));
        assert_eq!(field.text.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_record_get_missing_field() {
        let record = RawRecord::new();
        assert!(record.get("absent").is_none());
    }

    #[test]
    fn test_record_builder() {
        let record = RawRecord::new()
            .field("tranid", FieldValue::raw("INV-1"))
            .field("currency", FieldValue::with_text("1", "EUR"));
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("tranid").unwrap().value.as_deref(), Some("INV-1"));
    }

    #[test]
    fn test_record_json_round_trip() {
        let record = RawRecord::new().field("amount", FieldValue::raw("10"));
        let json = serde_json::to_string(&record).unwrap();
        let back: RawRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_record_deserializes_wire_shape() {
        let json = r#"{"tranid": {"value": "INV-1"}, "currency": {"value": "1", "text": "EUR"}}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.get("currency").unwrap().text.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_page_accessors() {
        let page = Page::new(3, vec![RawRecord::new()]);
        assert_eq!(page.index, 3);
        assert_eq!(page.len(), 1);
        assert!(!page.is_empty());
    }

    #[test]
    fn test_resolved_row_preserves_order() {
        let row = ResolvedRow::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(row.cells(), ["a", "b"]);
        assert_eq!(row.len(), 2);
    }
}
