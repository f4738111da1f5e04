//! Export job definition
//!
//! An [`ExportJob`] is the validated input of one export: the query spec,
//! the output encoding, pagination and formatting settings, and the name of
//! the produced document. Jobs are built once and never reused across two
//! query executions.

use crate::core::format::{FormatOptions, NumberLocale};
use crate::domain::column::{validate_columns, ColumnSpec};
use crate::domain::filter::{compose, FilterDescriptor};
use crate::domain::ids::{EntityType, JobId};
use crate::domain::query::QuerySpec;
use crate::domain::{Result, TabulaError};

/// Output encoding of an export job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    /// Streamed delimiter-separated text
    Delimited {
        /// Field separator, e.g. `;` or `,`
        delimiter: char,
    },
    /// Buffered single-sheet xlsx workbook
    Workbook {
        /// Name of the single sheet
        sheet_name: String,
    },
}

/// Validated input of one export
#[derive(Debug, Clone)]
pub struct ExportJob {
    /// Unique id of this job and its single query execution
    pub id: JobId,

    /// What to query
    pub query: QuerySpec,

    /// How to encode the output
    pub format: OutputFormat,

    /// Records per page during retrieval
    pub page_size: usize,

    /// Name of the produced document
    pub file_name: String,

    /// Job-wide date pattern and number locale
    pub format_options: FormatOptions,
}

/// Builder for [`ExportJob`]
///
/// # Example
///
/// ```
/// use tabula::core::export::ExportJobBuilder;
/// use tabula::domain::ColumnSpec;
///
/// # fn example() -> tabula::domain::Result<()> {
/// let job = ExportJobBuilder::new()
///     .entity_type("invoice")
///     .columns(vec![
///         ColumnSpec::new("tranid").with_label("Invoice Number"),
///         ColumnSpec::new("currency").with_label("Currency"),
///     ])
///     .delimited(';')
///     .file_name("invoice_report.csv")
///     .build()?;
/// assert_eq!(job.query.columns.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExportJobBuilder {
    entity_type: Option<String>,
    filters: Vec<FilterDescriptor>,
    exclusions: Vec<FilterDescriptor>,
    columns: Vec<ColumnSpec>,
    format: Option<OutputFormat>,
    page_size: Option<usize>,
    file_name: Option<String>,
    date_pattern: Option<String>,
    number_locale: Option<NumberLocale>,
}

impl ExportJobBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity type to query
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Sets the base filters
    pub fn filters(mut self, filters: Vec<FilterDescriptor>) -> Self {
        self.filters = filters;
        self
    }

    /// Adds one base filter
    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the exclusion filters; each is negated during composition
    pub fn exclusions(mut self, exclusions: Vec<FilterDescriptor>) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the ordered column projection
    pub fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    /// Selects streamed delimited-text output
    pub fn delimited(mut self, delimiter: char) -> Self {
        self.format = Some(OutputFormat::Delimited { delimiter });
        self
    }

    /// Selects buffered workbook output with the given sheet name
    pub fn workbook(mut self, sheet_name: impl Into<String>) -> Self {
        self.format = Some(OutputFormat::Workbook {
            sheet_name: sheet_name.into(),
        });
        self
    }

    /// Sets the page size used during retrieval
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Sets the produced document's file name
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the job-wide date pattern
    pub fn date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_pattern = Some(pattern.into());
        self
    }

    /// Sets the job-wide number locale
    pub fn number_locale(mut self, locale: NumberLocale) -> Self {
        self.number_locale = Some(locale);
        self
    }

    /// Builds the job, validating entity type, columns and filters
    ///
    /// # Errors
    ///
    /// Returns a validation error with a readable message for any missing or
    /// malformed input. The page-size ceiling is checked later by the driver
    /// against its pagination options.
    pub fn build(self) -> Result<ExportJob> {
        let entity_type = match self.entity_type {
            Some(raw) => EntityType::new(raw).map_err(TabulaError::Validation)?,
            None => {
                return Err(TabulaError::Validation(
                    "entity type is required".to_string(),
                ))
            }
        };

        validate_columns(&self.columns).map_err(TabulaError::Validation)?;

        let filter =
            compose(&self.filters, &self.exclusions).map_err(TabulaError::Validation)?;

        let query =
            QuerySpec::new(entity_type, filter, self.columns).map_err(TabulaError::Validation)?;

        let format = self.format.unwrap_or(OutputFormat::Delimited { delimiter: ';' });

        let file_name = self.file_name.unwrap_or_else(|| match &format {
            OutputFormat::Delimited { .. } => format!("{}_report.csv", query.entity_type),
            OutputFormat::Workbook { .. } => format!("{}_report.xlsx", query.entity_type),
        });

        let mut format_options = FormatOptions::default();
        if let Some(pattern) = self.date_pattern {
            format_options.date_pattern = pattern;
        }
        if let Some(locale) = self.number_locale {
            format_options.number_locale = locale;
        }

        Ok(ExportJob {
            id: JobId::generate(),
            query,
            format,
            page_size: self.page_size.unwrap_or(1000),
            file_name,
            format_options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_entity_type() {
        let err = ExportJobBuilder::new()
            .columns(vec![ColumnSpec::new("a")])
            .build()
            .unwrap_err();
        assert!(matches!(err, TabulaError::Validation(_)));
        assert!(err.to_string().contains("entity type"));
    }

    #[test]
    fn test_build_requires_columns() {
        let err = ExportJobBuilder::new()
            .entity_type("invoice")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("column"));
    }

    #[test]
    fn test_build_rejects_malformed_exclusion() {
        let err = ExportJobBuilder::new()
            .entity_type("invoice")
            .columns(vec![ColumnSpec::new("a")])
            .exclusions(vec![FilterDescriptor::with_values("", "is", vec![])])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("exclusion"));
    }

    #[test]
    fn test_build_defaults() {
        let job = ExportJobBuilder::new()
            .entity_type("invoice")
            .columns(vec![ColumnSpec::new("tranid")])
            .build()
            .unwrap();

        assert_eq!(job.page_size, 1000);
        assert_eq!(job.format, OutputFormat::Delimited { delimiter: ';' });
        assert_eq!(job.file_name, "invoice_report.csv");
    }

    #[test]
    fn test_build_workbook_default_file_name() {
        let job = ExportJobBuilder::new()
            .entity_type("timetrack")
            .columns(vec![ColumnSpec::new("badge")])
            .workbook("Time Track")
            .build()
            .unwrap();
        assert_eq!(job.file_name, "timetrack_report.xlsx");
    }

    #[test]
    fn test_build_composes_filters_with_exclusions() {
        let job = ExportJobBuilder::new()
            .entity_type("invoice")
            .columns(vec![ColumnSpec::new("tranid")])
            .filter(FilterDescriptor::new("mainline", "is", "T"))
            .exclusions(vec![FilterDescriptor::new("status", "is", "voided")])
            .build()
            .unwrap();
        assert_eq!(job.query.filter.leaf_count(), 2);
    }

    #[test]
    fn test_jobs_get_distinct_ids() {
        let build = || {
            ExportJobBuilder::new()
                .entity_type("invoice")
                .columns(vec![ColumnSpec::new("a")])
                .build()
                .unwrap()
        };
        assert_ne!(build().id, build().id);
    }
}
