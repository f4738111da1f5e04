//! Domain identifier types with validation
//!
//! Newtype wrappers for record-store identifiers. Each type ensures the
//! identifier is usable before any query executes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type newtype wrapper
///
/// Represents the category of business record being queried, e.g.
/// `invoice` or `customrecordtimetrack`. Must be non-empty.
///
/// # Examples
///
/// ```
/// use tabula::domain::ids::EntityType;
/// use std::str::FromStr;
///
/// let entity = EntityType::from_str("invoice").unwrap();
/// assert_eq!(entity.as_str(), "invoice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Creates a new EntityType from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type is empty or whitespace-only
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Entity type cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the entity type as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for EntityType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Export job identifier
///
/// Each job gets a fresh id at creation; jobs are never reused across two
/// query executions, so the id also identifies the execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(uuid::Uuid);

impl JobId {
    /// Generates a new random job id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::generate()
    }
}
