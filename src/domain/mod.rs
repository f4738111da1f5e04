//! Domain models and types for Tabula.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`EntityType`], [`JobId`])
//! - **Query building blocks** ([`ColumnSpec`], [`FilterDescriptor`],
//!   [`FilterTree`], [`QuerySpec`])
//! - **Result data** ([`RawRecord`], [`Page`], [`ResolvedRow`])
//! - **Error types** ([`TabulaError`], [`QueryError`]) and the [`Result`]
//!   alias
//!
//! # Type Safety
//!
//! Tabula uses the newtype pattern for identifiers so an entity type can't be
//! confused with an arbitrary string:
//!
//! ```rust
//! use tabula::domain::EntityType;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entity = EntityType::new("invoice")?;
//! assert_eq!(entity.as_str(), "invoice");
//! # Ok(())
//! # }
//! ```
//!
//! # Filter composition
//!
//! Filters arrive as flat descriptors and an exclusion list; composition
//! produces one validated tree with every exclusion negated:
//!
//! ```rust
//! use tabula::domain::filter::{compose, FilterDescriptor};
//!
//! let base = vec![FilterDescriptor::new("mainline", "is", "T")];
//! let exclusions = vec![FilterDescriptor::new("status", "is", "voided")];
//! let tree = compose(&base, &exclusions).unwrap();
//! assert_eq!(tree.leaf_count(), 2);
//! ```

pub mod column;
pub mod errors;
pub mod filter;
pub mod ids;
pub mod query;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use column::{ColumnKind, ColumnSpec};
pub use errors::{QueryError, TabulaError};
pub use filter::{FilterDescriptor, FilterTree};
pub use ids::{EntityType, JobId};
pub use query::QuerySpec;
pub use record::{FieldValue, Page, RawRecord, ResolvedRow};
pub use result::Result;
