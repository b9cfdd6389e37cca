//! Changelog cache using moka
//!
//! Diffs are pure, so they can be cached. The key carries both recipes'
//! `updated_at`, so editing either side produces a new key and the stale
//! entry simply ages out.

use crate::changelog::Changelog;
use crate::differ::ChangelogDiffer;
use chrono::{DateTime, Utc};
use forkline_model::{CacheConfig, Recipe, RecipeId};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cache key for one fork/parent pair at specific revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangelogKey {
    /// Fork
    pub fork_id: RecipeId,
    /// Parent
    pub parent_id: RecipeId,
    /// Fork revision
    pub fork_updated_at: DateTime<Utc>,
    /// Parent revision
    pub parent_updated_at: DateTime<Utc>,
}

impl ChangelogKey {
    /// Key for a pair of recipes
    #[inline]
    #[must_use]
    pub fn for_pair(fork: &Recipe, parent: &Recipe) -> Self {
        Self {
            fork_id: fork.id,
            parent_id: parent.id,
            fork_updated_at: fork.updated_at,
            parent_updated_at: parent.updated_at,
        }
    }
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Concurrent changelog cache
#[derive(Debug, Clone)]
pub struct ChangelogCache {
    inner: Cache<ChangelogKey, Arc<Changelog>>,
    differ: ChangelogDiffer,
}

impl ChangelogCache {
    /// Create cache with max capacity and no expiry
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64, differ: ChangelogDiffer) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            differ,
        }
    }

    /// Create cache from configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig, differ: ChangelogDiffer) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.changelog_capacity)
                .time_to_live(Duration::from_secs(config.changelog_ttl_secs))
                .build(),
            differ,
        }
    }

    /// Cached diff of `fork` against `parent`, computing it on a miss
    pub async fn get_or_diff(&self, fork: &Recipe, parent: &Recipe) -> Arc<Changelog> {
        let key = ChangelogKey::for_pair(fork, parent);
        self.inner
            .get_with(key, async {
                tracing::debug!("Changelog cache miss for {} vs {}", fork.id, parent.id);
                Arc::new(self.differ.diff(fork, parent))
            })
            .await
    }

    /// Cached entry, if present
    pub async fn get(&self, key: &ChangelogKey) -> Option<Arc<Changelog>> {
        self.inner.get(key).await
    }

    /// Drop one entry
    pub async fn invalidate(&self, key: &ChangelogKey) {
        self.inner.invalidate(key).await;
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Flush moka's pending maintenance so counts are exact
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use forkline_model::Ingredient;
    use forkline_test_utils::{sample_recipe, RecipeBuilder};

    #[tokio::test]
    async fn second_lookup_hits_cache() {
        let cache = ChangelogCache::new(16, ChangelogDiffer::new());
        let parent = sample_recipe(1);
        let fork = RecipeBuilder::fork(&parent, 2, "fork").build();

        let first = cache.get_or_diff(&fork, &parent).await;
        let second = cache.get_or_diff(&fork, &parent).await;
        assert!(Arc::ptr_eq(&first, &second));

        cache.sync().await;
        assert_eq!(cache.stats().entry_count, 1);
    }

    #[tokio::test]
    async fn editing_either_side_misses() {
        let cache = ChangelogCache::new(16, ChangelogDiffer::new());
        let parent = sample_recipe(1);
        let mut fork = RecipeBuilder::fork(&parent, 2, "fork").build();

        let before = cache.get_or_diff(&fork, &parent).await;
        assert!(before.is_empty());

        fork.components[0].ingredients.push(Ingredient::new("vanilla"));
        fork.updated_at = fork.updated_at + ChronoDuration::seconds(1);

        let after = cache.get_or_diff(&fork, &parent).await;
        assert_eq!(after.ingredients_added.len(), 1);
        assert!(cache.get(&ChangelogKey::for_pair(&fork, &parent)).await.is_some());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = ChangelogCache::from_config(&CacheConfig::default(), ChangelogDiffer::new());
        let parent = sample_recipe(1);
        let fork = RecipeBuilder::fork(&parent, 2, "fork").build();
        let key = ChangelogKey::for_pair(&fork, &parent);

        cache.get_or_diff(&fork, &parent).await;
        cache.invalidate(&key).await;
        assert!(cache.get(&key).await.is_none());
    }
}
