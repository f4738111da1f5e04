//! Filter descriptors and the composed filter expression tree
//!
//! Callers describe conditions as flat descriptors plus an optional exclusion
//! list. [`compose`] turns those into one validated [`FilterTree`]: the
//! conjunction of every base filter with a negation wrapped around each
//! exclusion. Exclusions never appear un-negated in a composed tree.
//!
//! The tree is an explicit tagged variant. Wire shapes that overload arrays
//! as both leaf tuples and logical groupings are converted at the boundary by
//! [`FilterDescriptor::parse_raw`]; nothing downstream sniffs shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One condition test on a field
///
/// `values` is multi-valued to carry range operators: `("trandate", "within",
/// [start, end])` is a single descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Field the condition applies to
    pub field: String,

    /// Comparison operator, e.g. `is`, `after`, `within`
    pub operator: String,

    /// Operand values; may be empty for operators like `isempty`
    #[serde(default)]
    pub values: Vec<String>,
}

impl FilterDescriptor {
    /// Creates a descriptor with a single operand
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values: vec![value.into()],
        }
    }

    /// Creates a descriptor with an arbitrary operand list
    pub fn with_values(
        field: impl Into<String>,
        operator: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values,
        }
    }

    /// Checks the descriptor is a usable condition: field and operator set
    ///
    /// # Errors
    ///
    /// Returns a readable message describing what is missing.
    pub fn validate(&self) -> Result<(), String> {
        if self.field.trim().is_empty() {
            return Err("filter field cannot be empty".to_string());
        }
        if self.operator.trim().is_empty() {
            return Err(format!(
                "filter on field '{}' is missing an operator",
                self.field
            ));
        }
        Ok(())
    }

    /// Converts a raw JSON descriptor into the typed form
    ///
    /// Accepts the array shape used by legacy callers,
    /// `["field", "operator", "value", ...]`, and the object shape
    /// `{"field": ..., "operator": ..., "values": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns a readable message quoting the offending entry.
    pub fn parse_raw(raw: &Value) -> Result<Self, String> {
        match raw {
            Value::Array(items) => {
                if items.len() < 2 {
                    return Err(format!(
                        "filter {} must have at least a field and an operator",
                        raw
                    ));
                }
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => parts.push(s.to_string()),
                        None => {
                            return Err(format!(
                                "filter {} contains a non-string element: {}",
                                raw, item
                            ))
                        }
                    }
                }
                let field = parts.remove(0);
                let operator = parts.remove(0);
                let descriptor = Self {
                    field,
                    operator,
                    values: parts,
                };
                descriptor.validate().map_err(|e| format!("{e} in {raw}"))?;
                Ok(descriptor)
            }
            Value::Object(_) => {
                let descriptor: FilterDescriptor = serde_json::from_value(raw.clone())
                    .map_err(|e| format!("filter {} is malformed: {}", raw, e))?;
                descriptor.validate().map_err(|e| format!("{e} in {raw}"))?;
                Ok(descriptor)
            }
            other => Err(format!("filter must be an array or object, got {}", other)),
        }
    }
}

/// Composed filter expression tree
///
/// Either a leaf condition, a conjunction of subtrees, or a negation of a
/// subtree. An empty conjunction matches every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTree {
    /// A single condition
    Leaf(FilterDescriptor),
    /// All subtrees must hold
    All(Vec<FilterTree>),
    /// The subtree must not hold
    Not(Box<FilterTree>),
}

impl FilterTree {
    /// True when the tree places no constraint on the result set
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, FilterTree::All(children) if children.is_empty())
    }

    /// Number of leaf conditions in the tree
    pub fn leaf_count(&self) -> usize {
        match self {
            FilterTree::Leaf(_) => 1,
            FilterTree::All(children) => children.iter().map(FilterTree::leaf_count).sum(),
            FilterTree::Not(child) => child.leaf_count(),
        }
    }

    /// Checks every leaf descriptor in the tree is well-formed
    ///
    /// # Errors
    ///
    /// Returns a readable message naming the first malformed descriptor.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            FilterTree::Leaf(descriptor) => descriptor.validate(),
            FilterTree::All(children) => children.iter().try_for_each(FilterTree::validate),
            FilterTree::Not(child) => child.validate(),
        }
    }
}

/// Composes base filters and exclusions into one validated tree
///
/// The result is `(base_1 AND base_2 AND ...) AND NOT(excl_1) AND NOT(excl_2)
/// AND ...`, preserving the given order of both lists so the output is
/// deterministic.
///
/// # Errors
///
/// Returns a validation message naming the offending descriptor if any base
/// filter or exclusion is malformed.
pub fn compose(
    base: &[FilterDescriptor],
    exclusions: &[FilterDescriptor],
) -> Result<FilterTree, String> {
    let mut children = Vec::with_capacity(base.len() + exclusions.len());

    for descriptor in base {
        descriptor
            .validate()
            .map_err(|e| format!("invalid filter: {e}"))?;
        children.push(FilterTree::Leaf(descriptor.clone()));
    }

    for descriptor in exclusions {
        descriptor
            .validate()
            .map_err(|e| format!("invalid exclusion filter: {e}"))?;
        children.push(FilterTree::Not(Box::new(FilterTree::Leaf(
            descriptor.clone(),
        ))));
    }

    Ok(FilterTree::All(children))
}
