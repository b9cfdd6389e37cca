//! Error types shared across the engine
//!
//! - [`StoreError`]: failures reported by external collaborators
//! - [`EngineError`]: errors surfaced to callers of engine operations
//!
//! Traversal bounds (depth, chain length, fan-out) are never errors; they
//! are reported as flags on the results.

use crate::config::ConfigError;
use crate::ids::RecipeId;
use std::fmt;

/// Collaborator (store or sink) failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend failed to answer
    #[error("store backend error: {0}")]
    Backend(String),

    /// Backend temporarily unreachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Write targeted a record that does not exist
    #[error("record missing: {0}")]
    RecordMissing(String),
}

impl StoreError {
    /// Whether retrying later could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Kind of entity a lookup failed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Recipe
    Recipe,
    /// Parent of a fork
    ParentRecipe,
    /// User flavor profile
    FlavorProfile,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Recipe => "recipe",
            Self::ParentRecipe => "parent recipe",
            Self::FlavorProfile => "flavor profile",
        };
        f.write_str(s)
    }
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Lookup failed
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was looked up
        entity: EntityKind,
        /// Identifier that was requested
        id: String,
    },

    /// Unknown auto-fork template
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Recipe payload could not be decoded
    #[error("malformed recipe: {0}")]
    MalformedRecipe(String),

    /// Operation needs a fork but the recipe has no parent
    #[error("recipe {0} is not a fork")]
    NotAFork(RecipeId),

    /// Collaborator failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Recipe lookup failed
    #[inline]
    #[must_use]
    pub fn recipe_not_found(id: RecipeId) -> Self {
        Self::NotFound {
            entity: EntityKind::Recipe,
            id: id.to_string(),
        }
    }

    /// Whether this is a `NotFound`
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

/// Engine result alias
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = EngineError::recipe_not_found(RecipeId::from_u128(9));
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("recipe not found"));
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(EngineError::from(StoreError::Unavailable("down".into())).is_retryable());
        assert!(!EngineError::from(StoreError::Backend("boom".into())).is_retryable());
        assert!(!EngineError::InvalidTemplate("x".into()).is_retryable());
    }
}
