//! Parameterized request boundary
//!
//! Callers of the dynamic export variants pass raw string parameters:
//! an entity type, JSON-encoded filter and column arrays, and `ddmmyyyy`
//! date-range bounds. [`ExportRequest::into_job`] validates all of it into
//! an [`ExportJob`]. Every rejection is a validation error with a message
//! fit to show the caller; nothing here panics or leaks internals, and no
//! query executes before validation passes.

use crate::config::ExportConfig;
use crate::core::export::{ExportJob, ExportJobBuilder};
use crate::core::format::parse_request_date;
use crate::domain::column::ColumnSpec;
use crate::domain::filter::FilterDescriptor;
use crate::domain::{Result, TabulaError};
use serde_json::Value;

/// Raw parameters of one export request
///
/// All fields are optional at this layer; which ones are required is decided
/// during conversion, so absence produces a readable message rather than a
/// deserialization fault.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    /// Entity type to query; required
    pub entity_type: Option<String>,

    /// JSON-encoded array of filter descriptors
    pub filters: Option<String>,

    /// JSON-encoded array of exclusion filter descriptors
    pub exclusion_filters: Option<String>,

    /// JSON-encoded array of `{name, label}` column objects; required
    pub columns: Option<String>,

    /// Range start in `ddmmyyyy` form
    pub start_date: Option<String>,

    /// Range end in `ddmmyyyy` form
    pub end_date: Option<String>,

    /// Field the date range applies to
    pub date_field: Option<String>,

    /// Output format: "delimited" or "workbook"
    pub format: Option<String>,

    /// Field separator for delimited output
    pub delimiter: Option<String>,

    /// Sheet name for workbook output
    pub sheet_name: Option<String>,

    /// File name of the produced document
    pub file_name: Option<String>,

    /// Records per page during retrieval
    pub page_size: Option<usize>,
}

impl ExportRequest {
    /// Validates the request into an export job, filling gaps from `defaults`
    ///
    /// # Errors
    ///
    /// Returns a validation error with a human-readable message when a
    /// required parameter is absent or a present parameter is malformed.
    pub fn into_job(self, defaults: &ExportConfig) -> Result<ExportJob> {
        let entity_type = self
            .entity_type
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                TabulaError::Validation("the entityType parameter is required".to_string())
            })?;

        let columns = parse_columns(self.columns.as_deref())?;
        let mut filters = parse_filters(self.filters.as_deref(), "filters")?;
        let exclusions = parse_filters(self.exclusion_filters.as_deref(), "exclusionFilters")?;

        if let Some(range) = parse_date_range(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            self.date_field.as_deref(),
        )? {
            filters.push(range);
        }

        let format = self
            .format
            .unwrap_or_else(|| defaults.format.clone())
            .to_lowercase();

        let mut builder = ExportJobBuilder::new()
            .entity_type(entity_type)
            .columns(columns)
            .filters(filters)
            .exclusions(exclusions)
            .page_size(self.page_size.unwrap_or(1000))
            .date_pattern(defaults.date_pattern.clone())
            .number_locale(defaults.number_locale);

        builder = match format.as_str() {
            "delimited" => {
                let delimiter = match self.delimiter {
                    Some(raw) => single_char_delimiter(&raw)?,
                    None => defaults.delimiter_char(),
                };
                builder.delimited(delimiter)
            }
            "workbook" => builder.workbook(
                self.sheet_name
                    .unwrap_or_else(|| defaults.sheet_name.clone()),
            ),
            other => {
                return Err(TabulaError::Validation(format!(
                    "unknown output format '{other}': expected 'delimited' or 'workbook'"
                )))
            }
        };

        if let Some(file_name) = self.file_name {
            builder = builder.file_name(file_name);
        }

        builder.build()
    }
}

/// Parses the JSON-encoded column array
fn parse_columns(raw: Option<&str>) -> Result<Vec<ColumnSpec>> {
    let raw = raw.filter(|s| !s.trim().is_empty()).ok_or_else(|| {
        TabulaError::Validation("the columns parameter is required".to_string())
    })?;

    serde_json::from_str::<Vec<ColumnSpec>>(raw).map_err(|e| {
        TabulaError::Validation(format!("the columns parameter is not a valid column array: {e}"))
    })
}

/// Parses a JSON-encoded filter descriptor array; absent means none
fn parse_filters(raw: Option<&str>, parameter: &str) -> Result<Vec<FilterDescriptor>> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    let values: Vec<Value> = serde_json::from_str(raw).map_err(|e| {
        TabulaError::Validation(format!("the {parameter} parameter is not a JSON array: {e}"))
    })?;

    values
        .iter()
        .map(|value| {
            FilterDescriptor::parse_raw(value).map_err(|e| {
                TabulaError::Validation(format!("invalid entry in {parameter}: {e}"))
            })
        })
        .collect()
}

/// Turns the date-range parameters into a `within` descriptor
///
/// Both bounds and the field name are required as soon as either bound is
/// present; the bounds are validated before any query executes.
fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    field: Option<&str>,
) -> Result<Option<FilterDescriptor>> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let field = field.filter(|f| !f.trim().is_empty()).ok_or_else(|| {
                TabulaError::Validation(
                    "the dateField parameter is required with a date range".to_string(),
                )
            })?;
            let start = parse_request_date(start).map_err(TabulaError::Validation)?;
            let end = parse_request_date(end).map_err(TabulaError::Validation)?;
            Ok(Some(FilterDescriptor::with_values(
                field,
                "within",
                vec![
                    start.format("%Y-%m-%d").to_string(),
                    end.format("%Y-%m-%d").to_string(),
                ],
            )))
        }
        _ => Err(TabulaError::Validation(
            "both startdate and enddate are required for a date range".to_string(),
        )),
    }
}

/// Checks a delimiter parameter is exactly one character
fn single_char_delimiter(raw: &str) -> Result<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(TabulaError::Validation(format!(
            "the delimiter parameter must be a single character, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::OutputFormat;

    fn defaults() -> ExportConfig {
        ExportConfig::default()
    }

    fn valid_request() -> ExportRequest {
        ExportRequest {
            entity_type: Some("invoice".to_string()),
            columns: Some(r#"[{"name":"tranid","label":"Invoice Number"},{"name":"currency"}]"#.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_valid_request() {
        let job = valid_request().into_job(&defaults()).unwrap();
        assert_eq!(job.query.entity_type.as_str(), "invoice");
        assert_eq!(job.query.columns.len(), 2);
        assert_eq!(job.query.columns[0].header(), "Invoice Number");
        assert_eq!(job.format, OutputFormat::Delimited { delimiter: ';' });
    }

    #[test]
    fn test_missing_entity_type_is_readable_error() {
        let mut request = valid_request();
        request.entity_type = None;
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(matches!(err, TabulaError::Validation(_)));
        assert!(err.to_string().contains("entityType"));
    }

    #[test]
    fn test_missing_columns_is_readable_error() {
        let mut request = valid_request();
        request.columns = None;
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(err.to_string().contains("columns"));
    }

    #[test]
    fn test_malformed_columns_json_rejected() {
        let mut request = valid_request();
        request.columns = Some("not json".to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(matches!(err, TabulaError::Validation(_)));
    }

    #[test]
    fn test_filters_accept_legacy_array_shape() {
        let mut request = valid_request();
        request.filters = Some(r#"[["mainline","is","T"]]"#.to_string());
        let job = request.into_job(&defaults()).unwrap();
        assert_eq!(job.query.filter.leaf_count(), 1);
    }

    #[test]
    fn test_exclusions_are_negated_in_composed_tree() {
        use crate::domain::FilterTree;

        let mut request = valid_request();
        request.filters = Some(r#"[["mainline","is","T"]]"#.to_string());
        request.exclusion_filters = Some(r#"[["status","is","voided"]]"#.to_string());
        let job = request.into_job(&defaults()).unwrap();

        let FilterTree::All(children) = &job.query.filter else {
            panic!("expected conjunction");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[1], FilterTree::Not(_)));
    }

    #[test]
    fn test_malformed_exclusion_entry_rejected() {
        let mut request = valid_request();
        request.exclusion_filters = Some(r#"[["onlyfield"]]"#.to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(err.to_string().contains("exclusionFilters"));
    }

    #[test]
    fn test_date_range_becomes_within_filter() {
        let mut request = valid_request();
        request.start_date = Some("01012024".to_string());
        request.end_date = Some("31012024".to_string());
        request.date_field = Some("trandate".to_string());
        let job = request.into_job(&defaults()).unwrap();
        assert_eq!(job.query.filter.leaf_count(), 1);

        use crate::domain::FilterTree;
        let FilterTree::All(children) = &job.query.filter else {
            panic!("expected conjunction");
        };
        let FilterTree::Leaf(descriptor) = &children[0] else {
            panic!("expected leaf");
        };
        assert_eq!(descriptor.operator, "within");
        assert_eq!(descriptor.values, vec!["2024-01-01", "2024-01-31"]);
    }

    #[test]
    fn test_invalid_date_rejected_before_query() {
        let mut request = valid_request();
        request.start_date = Some("31042024".to_string()); // April 31
        request.end_date = Some("01052024".to_string());
        request.date_field = Some("trandate".to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(matches!(err, TabulaError::Validation(_)));
    }

    #[test]
    fn test_half_open_date_range_rejected() {
        let mut request = valid_request();
        request.start_date = Some("01012024".to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(err.to_string().contains("enddate"));
    }

    #[test]
    fn test_workbook_format_with_sheet_name() {
        let mut request = valid_request();
        request.format = Some("workbook".to_string());
        request.sheet_name = Some("Invoices".to_string());
        request.file_name = Some("invoices.xlsx".to_string());
        let job = request.into_job(&defaults()).unwrap();
        assert_eq!(
            job.format,
            OutputFormat::Workbook {
                sheet_name: "Invoices".to_string()
            }
        );
        assert_eq!(job.file_name, "invoices.xlsx");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut request = valid_request();
        request.format = Some("pdf".to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn test_multi_char_delimiter_rejected() {
        let mut request = valid_request();
        request.delimiter = Some("||".to_string());
        let err = request.into_job(&defaults()).unwrap_err();
        assert!(err.to_string().contains("delimiter"));
    }
}
