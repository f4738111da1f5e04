//! Query specification
//!
//! A [`QuerySpec`] is the validated description of one query execution:
//! entity type, composed filter tree and column projection. It is immutable
//! once built; an export job never reuses a spec across two executions.

use serde::{Deserialize, Serialize};

use super::column::{validate_columns, ColumnSpec};
use super::filter::FilterTree;
use super::ids::EntityType;

/// Validated description of one query execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Category of business record being queried
    pub entity_type: EntityType,

    /// Composed filter expression; an empty conjunction matches everything
    pub filter: FilterTree,

    /// Ordered column projection; fixes header and cell order end to end
    pub columns: Vec<ColumnSpec>,
}

impl QuerySpec {
    /// Builds a spec, enforcing the invariants required before any query
    /// executes: non-empty entity type (guaranteed by [`EntityType`]) and a
    /// valid, non-empty column projection.
    ///
    /// # Errors
    ///
    /// Returns a readable message for an invalid column projection.
    pub fn new(
        entity_type: EntityType,
        filter: FilterTree,
        columns: Vec<ColumnSpec>,
    ) -> Result<Self, String> {
        validate_columns(&columns)?;
        Ok(Self {
            entity_type,
            filter,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::compose;

    #[test]
    fn test_query_spec_requires_columns() {
        let entity = EntityType::new("invoice").unwrap();
        let filter = compose(&[], &[]).unwrap();
        let err = QuerySpec::new(entity, filter, vec![]).unwrap_err();
        assert!(err.contains("at least one column"));
    }

    #[test]
    fn test_query_spec_valid() {
        let entity = EntityType::new("invoice").unwrap();
        let filter = compose(&[], &[]).unwrap();
        let columns = vec![ColumnSpec::new("tranid"), ColumnSpec::new("currency")];
        let spec = QuerySpec::new(entity, filter, columns).unwrap();
        assert_eq!(spec.columns.len(), 2);
        assert_eq!(spec.entity_type.as_str(), "invoice");
    }
}
