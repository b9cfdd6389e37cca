//! Collaborator seams
//!
//! The engine owns no persistence. Everything it reads or writes goes
//! through these traits, held as `Arc<dyn Trait>`.

use crate::error::StoreError;
use crate::events::ForkEvent;
use crate::ids::{RecipeId, UserId};
use crate::profile::FlavorProfile;
use crate::recipe::Recipe;
use crate::trial::CookTrial;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering requested from [`RecipeStore::list_children`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// Most-forked first, then oldest first
    #[default]
    PopularityThenAge,
    /// Oldest first
    CreatedAsc,
}

impl ChildOrder {
    /// Comparator implementing the ordering; ties fall back to id
    #[must_use]
    pub fn compare(self, a: &Recipe, b: &Recipe) -> Ordering {
        let primary = match self {
            Self::PopularityThenAge => b
                .fork_count
                .cmp(&a.fork_count)
                .then_with(|| a.created_at.cmp(&b.created_at)),
            Self::CreatedAsc => a.created_at.cmp(&b.created_at),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// Fields the engine may write back onto a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForkMetadataUpdate {
    /// Replacement fork tags
    pub fork_tags: Option<Vec<String>>,
    /// Replacement changelog summary
    pub changelog_summary: Option<String>,
}

impl ForkMetadataUpdate {
    /// Nothing to write
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fork_tags.is_none() && self.changelog_summary.is_none()
    }
}

/// Recipe store
#[async_trait::async_trait]
pub trait RecipeStore: Send + Sync {
    /// Lookup by id
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Direct children of `parent_id`, ordered and limited
    async fn list_children(
        &self,
        parent_id: RecipeId,
        order: ChildOrder,
        limit: usize,
    ) -> Result<Vec<Recipe>, StoreError>;

    /// Number of recipes whose root pointer is `root_id`
    async fn count_by_root(&self, root_id: RecipeId) -> Result<usize, StoreError>;

    /// Write back tags/changelog
    async fn update_fork_metadata(
        &self,
        id: RecipeId,
        update: ForkMetadataUpdate,
    ) -> Result<(), StoreError>;
}

/// Cook-trial store
#[async_trait::async_trait]
pub trait TrialStore: Send + Sync {
    /// All trials recorded for a recipe
    async fn list_trials(&self, recipe_id: RecipeId) -> Result<Vec<CookTrial>, StoreError>;
}

/// Flavor-profile store
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profile for a user, if one was recorded
    async fn get_flavor_profile(&self, user_id: UserId) -> Result<Option<FlavorProfile>, StoreError>;
}

/// Notification sink
///
/// Delivery is fire-and-forget: callers log failures and carry on.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver an event
    async fn emit(&self, event: ForkEvent) -> Result<(), StoreError>;
}

/// Sink that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait::async_trait]
impl NotificationSink for NullSink {
    async fn emit(&self, _event: ForkEvent) -> Result<(), StoreError> {
        Ok(())
    }
}
