//! Domain Layer - Core Entity Trait
//!
//! Every synchronized record has a server-assigned id and belongs to exactly
//! one remote collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// The three remote collections mirrored by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Tasks,
    Teams,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Projects, Collection::Tasks, Collection::Teams];

    /// Collection name, used both as the endpoint path and the cache key
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Tasks => "tasks",
            Collection::Teams => "teams",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core trait for all synchronized entities
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Remote collection this entity lives in
    const COLLECTION: Collection;

    /// Server-assigned identifier
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Client-side errors raised before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Trim a required text field, rejecting it when nothing is left
pub(crate) fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, collapsing blank input to `None`
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required("name", "  Alpha "), Ok("Alpha".to_string()));
        assert!(matches!(required("name", "   "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_optional_collapses_blank() {
        assert_eq!(optional(Some("  ")), None);
        assert_eq!(optional(Some(" notes ")), Some("notes".to_string()));
        assert_eq!(optional(None), None);
    }
}
