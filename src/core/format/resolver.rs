//! Field value resolution
//!
//! Selects the cell value for a (record, column) pair. The fallback order is
//! fixed for every column: display text if the field carries one, otherwise
//! the raw stored value, otherwise empty. A missing field never errors; it
//! resolves to empty.

use crate::domain::column::{ColumnKind, ColumnSpec};
use crate::domain::record::{RawRecord, ResolvedRow};

use super::formatter::{format_date, format_number, FormatOptions};

/// Resolves one cell following the text → value → empty fallback
///
/// The fallback is per cell: different columns of the same row may use
/// different branches.
pub fn resolve<'a>(record: &'a RawRecord, column: &ColumnSpec) -> &'a str {
    match record.get(&column.name) {
        Some(field) => field
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(field.value.as_deref())
            .unwrap_or(""),
        None => "",
    }
}

/// Resolves and formats every column of a record into an output row
///
/// Cells come out in column order; the row length always equals the column
/// count regardless of which fields the record actually carries.
pub fn resolve_row(
    record: &RawRecord,
    columns: &[ColumnSpec],
    options: &FormatOptions,
) -> ResolvedRow {
    let cells = columns
        .iter()
        .map(|column| {
            let value = resolve(record, column);
            match column.kind {
                ColumnKind::Text => value.to_string(),
                ColumnKind::Date => {
                    format_date((!value.is_empty()).then_some(value), &options.date_pattern)
                }
                ColumnKind::Number => {
                    format_number((!value.is_empty()).then_some(value), options.number_locale)
                }
            }
        })
        .collect();

    ResolvedRow::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FieldValue;

    fn record() -> RawRecord {
        RawRecord::new()
            .field("currency", FieldValue::with_text("1", "EUR"))
            .field("tranid", FieldValue::raw("INV-42"))
            .field("empty_text", FieldValue {
                value: Some("fallback".to_string()),
                text: Some(String::new()),
            })
    }

    #[test]
    fn test_resolve_prefers_display_text() {
        assert_eq!(resolve(&record(), &ColumnSpec::new("currency")), "EUR");
    }

    #[test]
    fn test_resolve_falls_back_to_raw_value() {
        assert_eq!(resolve(&record(), &ColumnSpec::new("tranid")), "INV-42");
    }

    #[test]
    fn test_resolve_empty_text_falls_back_to_value() {
        assert_eq!(resolve(&record(), &ColumnSpec::new("empty_text")), "fallback");
    }

    #[test]
    fn test_resolve_missing_field_is_empty() {
        assert_eq!(resolve(&record(), &ColumnSpec::new("nope")), "");
    }

    #[test]
    fn test_fallback_is_per_cell_not_per_row() {
        let columns = vec![ColumnSpec::new("currency"), ColumnSpec::new("tranid")];
        let row = resolve_row(&record(), &columns, &FormatOptions::default());
        // text branch for one column, raw branch for the other, same row
        assert_eq!(row.cells(), ["EUR", "INV-42"]);
    }

    #[test]
    fn test_resolve_row_length_matches_columns() {
        let columns = vec![
            ColumnSpec::new("tranid"),
            ColumnSpec::new("missing_a"),
            ColumnSpec::new("missing_b"),
        ];
        let row = resolve_row(&record(), &columns, &FormatOptions::default());
        assert_eq!(row.len(), 3);
        assert_eq!(row.cells(), ["INV-42", "", ""]);
    }

    #[test]
    fn test_resolve_row_formats_number_and_date_cells() {
        use crate::domain::column::ColumnKind;

        let record = RawRecord::new()
            .field("fxamount", FieldValue::raw("1234.5"))
            .field("trandate", FieldValue::raw("2024-02-29"));
        let columns = vec![
            ColumnSpec::new("fxamount").with_kind(ColumnKind::Number),
            ColumnSpec::new("trandate").with_kind(ColumnKind::Date),
            ColumnSpec::new("absent").with_kind(ColumnKind::Number),
        ];
        let row = resolve_row(&record, &columns, &FormatOptions::default());
        assert_eq!(row.cells(), ["1.234,50", "29.02.2024", "0,00"]);
    }
}
