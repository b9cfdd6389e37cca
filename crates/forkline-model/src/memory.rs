//! In-memory collaborator implementations
//!
//! Backs the CLI (snapshot files) and the test suites. Lock-free reads via
//! `DashMap`; no ordering guarantees beyond what [`ChildOrder`] imposes.

use crate::error::StoreError;
use crate::ids::{RecipeId, UserId};
use crate::profile::FlavorProfile;
use crate::recipe::Recipe;
use crate::store::{ChildOrder, ForkMetadataUpdate, ProfileStore, RecipeStore, TrialStore};
use crate::trial::CookTrial;
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Serializable dump of everything the in-memory store holds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Recipes
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    /// Cook trials
    #[serde(default)]
    pub trials: Vec<CookTrial>,
    /// Flavor profiles
    #[serde(default)]
    pub profiles: Vec<FlavorProfile>,
}

/// Recipe, trial and profile store held in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    recipes: DashMap<RecipeId, Recipe>,
    trials: DashMap<RecipeId, Vec<CookTrial>>,
    profiles: DashMap<UserId, FlavorProfile>,
}

impl InMemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for recipe in snapshot.recipes {
            store.insert_recipe(recipe);
        }
        for trial in snapshot.trials {
            store.insert_trial(trial);
        }
        for profile in snapshot.profiles {
            store.insert_profile(profile);
        }
        store
    }

    /// Insert or replace a recipe
    pub fn insert_recipe(&self, recipe: Recipe) {
        self.recipes.insert(recipe.id, recipe);
    }

    /// Record a trial against its recipe
    pub fn insert_trial(&self, trial: CookTrial) {
        self.trials.entry(trial.recipe_id).or_default().push(trial);
    }

    /// Insert or replace a profile
    pub fn insert_profile(&self, profile: FlavorProfile) {
        self.profiles.insert(profile.user_id, profile);
    }

    /// Copy of a stored recipe
    #[must_use]
    pub fn recipe(&self, id: RecipeId) -> Option<Recipe> {
        self.recipes.get(&id).map(|r| r.value().clone())
    }

    /// Number of stored recipes
    #[must_use]
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

#[async_trait::async_trait]
impl RecipeStore for InMemoryStore {
    async fn get_recipe(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipe(id))
    }

    async fn list_children(
        &self,
        parent_id: RecipeId,
        order: ChildOrder,
        limit: usize,
    ) -> Result<Vec<Recipe>, StoreError> {
        let mut children: Vec<Recipe> = self
            .recipes
            .iter()
            .filter(|entry| entry.parent_id == Some(parent_id))
            .map(|entry| entry.value().clone())
            .collect();
        children.sort_by(|a, b| order.compare(a, b));
        children.truncate(limit);
        Ok(children)
    }

    async fn count_by_root(&self, root_id: RecipeId) -> Result<usize, StoreError> {
        Ok(self
            .recipes
            .iter()
            .filter(|entry| entry.root_id == Some(root_id))
            .count())
    }

    async fn update_fork_metadata(
        &self,
        id: RecipeId,
        update: ForkMetadataUpdate,
    ) -> Result<(), StoreError> {
        let mut recipe = self
            .recipes
            .get_mut(&id)
            .ok_or_else(|| StoreError::RecordMissing(id.to_string()))?;
        if let Some(tags) = update.fork_tags {
            recipe.fork_tags = tags;
        }
        if let Some(summary) = update.changelog_summary {
            recipe.changelog_summary = Some(summary);
        }
        recipe.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait::async_trait]
impl TrialStore for InMemoryStore {
    async fn list_trials(&self, recipe_id: RecipeId) -> Result<Vec<CookTrial>, StoreError> {
        Ok(self
            .trials
            .get(&recipe_id)
            .map(|t| t.value().clone())
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_flavor_profile(&self, user_id: UserId) -> Result<Option<FlavorProfile>, StoreError> {
        Ok(self.profiles.get(&user_id).map(|p| p.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn recipe(id: u128, parent: Option<&Recipe>, forks: u32, age_minutes: i64) -> Recipe {
        let user = UserId::from_u128(1);
        let mut r = match parent {
            Some(p) => Recipe::fork_of(p, RecipeId::from_u128(id), format!("r{id}"), user),
            None => Recipe::new(RecipeId::from_u128(id), format!("r{id}"), user),
        };
        r.fork_count = forks;
        r.created_at = Utc::now() - Duration::minutes(age_minutes);
        r
    }

    #[tokio::test]
    async fn children_sorted_by_popularity_then_age() {
        let store = InMemoryStore::new();
        let root = recipe(1, None, 3, 100);
        store.insert_recipe(root.clone());
        store.insert_recipe(recipe(2, Some(&root), 0, 10));
        store.insert_recipe(recipe(3, Some(&root), 5, 5));
        store.insert_recipe(recipe(4, Some(&root), 0, 50));

        let children = store
            .list_children(root.id, ChildOrder::PopularityThenAge, 10)
            .await
            .unwrap();
        let ids: Vec<_> = children.iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec![RecipeId::from_u128(3), RecipeId::from_u128(4), RecipeId::from_u128(2)]
        );

        let limited = store
            .list_children(root.id, ChildOrder::PopularityThenAge, 1)
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn update_missing_recipe_fails() {
        let store = InMemoryStore::new();
        let err = store
            .update_fork_metadata(RecipeId::from_u128(9), ForkMetadataUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::RecordMissing(_)));
    }

    #[tokio::test]
    async fn update_writes_summary_and_tags() {
        let store = InMemoryStore::new();
        let root = recipe(1, None, 0, 0);
        store.insert_recipe(root.clone());
        store
            .update_fork_metadata(
                root.id,
                ForkMetadataUpdate {
                    fork_tags: Some(vec!["vegan".into()]),
                    changelog_summary: Some("Minor adjustments".into()),
                },
            )
            .await
            .unwrap();
        let stored = store.recipe(root.id).unwrap();
        assert_eq!(stored.fork_tags, vec!["vegan".to_string()]);
        assert_eq!(stored.changelog_summary.as_deref(), Some("Minor adjustments"));
    }
}
