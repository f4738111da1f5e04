//! Column projection types
//!
//! A query projects an ordered sequence of columns. The order is load-bearing:
//! it fixes header order and per-row cell order end to end, so everything that
//! touches rows iterates the same `Vec<ColumnSpec>`.

use serde::{Deserialize, Serialize};

/// How a column's resolved value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Pass the resolved value through unchanged
    #[default]
    Text,
    /// Render with the job-wide date pattern
    Date,
    /// Render with the job-wide number locale, two decimal places
    Number,
}

/// One projected column of an export
///
/// `name` addresses the field on the raw record; `label`, when present, is
/// used for the header row instead of the name.
///
/// # Examples
///
/// ```
/// use tabula::domain::column::ColumnSpec;
///
/// let col = ColumnSpec::new("tranid").with_label("Invoice Number");
/// assert_eq!(col.header(), "Invoice Number");
/// assert_eq!(ColumnSpec::new("currency").header(), "currency");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Field name on the raw record; unique within a job
    pub name: String,

    /// Header label; defaults to `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Rendering rule for this column
    #[serde(default)]
    pub kind: ColumnKind,
}

impl ColumnSpec {
    /// Creates a text column with no explicit label
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: ColumnKind::Text,
        }
    }

    /// Sets the header label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the rendering kind
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// The header cell for this column: label if given, otherwise name
    pub fn header(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Validates a column projection: non-empty, non-blank names, no duplicates
///
/// # Errors
///
/// Returns a readable message naming the offending column.
pub fn validate_columns(columns: &[ColumnSpec]) -> Result<(), String> {
    if columns.is_empty() {
        return Err("at least one column is required".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    for column in columns {
        if column.name.trim().is_empty() {
            return Err("column name cannot be empty".to_string());
        }
        if !seen.insert(column.name.as_str()) {
            return Err(format!("duplicate column name: {}", column.name));
        }
    }

    Ok(())
}
