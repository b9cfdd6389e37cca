//! Fork engine
//!
//! Wires the collaborator stores, the notification sink and the pure
//! components (walker, differ, aggregator, predictor, ranker, auto-fork)
//! behind one request-scoped API.

use crate::genealogy::Genealogy;
use forkline_autofork::{AutoForkApplier, AutoForkPreview, AutoForkResult};
use forkline_changelog::{Changelog, ChangelogCache, ChangelogDiffer, StepDiffMode};
use forkline_lineage::{GenealogyNode, TreeRequest, TreeWalker};
use forkline_model::{
    ChildOrder, CookTrial, EngineConfig, EngineError, EngineResult, EntityKind, ForkEvent,
    ForkEventKind, ForkMetadataUpdate, ForkTag, NotificationSink, NullSink, ProfileStore, Recipe,
    RecipeId, RecipeStore, TrialStore, UserId,
};
use forkline_prediction::{OutcomePredictor, Prediction, Suggestion, SuggestionRanker};
use forkline_validation::{ValidationAggregator, ValidationReport};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Engine over a recipe graph and its cook trials
pub struct ForkEngine {
    recipes: Arc<dyn RecipeStore>,
    trials: Arc<dyn TrialStore>,
    profiles: Arc<dyn ProfileStore>,
    sink: Arc<dyn NotificationSink>,
    config: EngineConfig,
    walker: TreeWalker,
    differ: ChangelogDiffer,
    cache: Option<ChangelogCache>,
    aggregator: ValidationAggregator,
    predictor: OutcomePredictor,
    ranker: SuggestionRanker,
    autofork: AutoForkApplier,
}

impl std::fmt::Debug for ForkEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForkEngine")
            .field("config", &self.config)
            .field("differ", &self.differ)
            .field("cache", &self.cache.as_ref().map(ChangelogCache::stats))
            .finish_non_exhaustive()
    }
}

impl ForkEngine {
    /// Create engine from separate collaborators
    ///
    /// # Errors
    /// `Config` when the configuration fails validation
    pub fn new(
        config: EngineConfig,
        recipes: Arc<dyn RecipeStore>,
        trials: Arc<dyn TrialStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let differ = ChangelogDiffer::new();
        let cache = config
            .cache
            .enabled
            .then(|| ChangelogCache::from_config(&config.cache, differ));
        Ok(Self {
            walker: TreeWalker::with_limits(Arc::clone(&recipes), config.traversal),
            aggregator: ValidationAggregator::new(config.validation),
            predictor: OutcomePredictor::new(config.prediction, config.validation),
            ranker: SuggestionRanker::new(config.ranking),
            autofork: AutoForkApplier::new(),
            sink: Arc::new(NullSink),
            recipes,
            trials,
            profiles,
            differ,
            cache,
            config,
        })
    }

    /// Create engine over one store that serves recipes, trials and profiles
    ///
    /// # Errors
    /// `Config` when the configuration fails validation
    pub fn from_store<S>(config: EngineConfig, store: Arc<S>) -> EngineResult<Self>
    where
        S: RecipeStore + TrialStore + ProfileStore + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    /// With notification sink
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// With step diff mode; resets the changelog cache
    #[must_use]
    pub fn with_step_mode(mut self, mode: StepDiffMode) -> Self {
        self.differ = self.differ.with_step_mode(mode);
        if self.cache.is_some() {
            self.cache = Some(ChangelogCache::from_config(&self.config.cache, self.differ));
        }
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Changelog cache, when enabled
    #[inline]
    #[must_use]
    pub fn cache(&self) -> Option<&ChangelogCache> {
        self.cache.as_ref()
    }

    /// Ancestors, root path and descendant tree for a recipe
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn genealogy(&self, recipe_id: RecipeId, request: TreeRequest) -> EngineResult<Genealogy> {
        info!("Genealogy for {}", recipe_id);
        let root_id = self.walker.resolve_root(recipe_id).await?;

        let (ancestry, path, tree, total_forks) = futures::try_join!(
            self.walker.ancestors(recipe_id),
            self.walker.path_to_node(root_id, recipe_id),
            self.walker.descendant_tree_with(root_id, request),
            async { Ok::<_, EngineError>(self.recipes.count_by_root(root_id).await?) },
        )?;

        if ancestry.truncated {
            warn!("Ancestors of {} truncated at {}", recipe_id, ancestry.len());
        }
        let ancestors = ancestry
            .chain
            .iter()
            .enumerate()
            .map(|(depth, r)| GenealogyNode::from_recipe(r, depth))
            .collect();

        Ok(Genealogy::assemble(
            root_id,
            recipe_id,
            ancestors,
            ancestry.truncated,
            path,
            tree,
            total_forks,
        ))
    }

    async fn fork_and_parent(&self, fork_id: RecipeId) -> EngineResult<(Recipe, Recipe)> {
        let fork = self.walker.load(fork_id).await?;
        let parent_id = fork.parent_id.ok_or(EngineError::NotAFork(fork_id))?;
        let parent = self
            .recipes
            .get_recipe(parent_id)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                entity: EntityKind::ParentRecipe,
                id: parent_id.to_string(),
            })?;
        Ok((fork, parent))
    }

    async fn diff(&self, fork: &Recipe, parent: &Recipe) -> Arc<Changelog> {
        match &self.cache {
            Some(cache) => cache.get_or_diff(fork, parent).await,
            None => Arc::new(self.differ.diff(fork, parent)),
        }
    }

    /// Changelog of a fork against its parent
    ///
    /// # Errors
    /// `NotFound` for an unknown fork or parent, `NotAFork` for a root
    /// recipe, or store failure
    pub async fn changelog(&self, fork_id: RecipeId) -> EngineResult<Arc<Changelog>> {
        let (fork, parent) = self.fork_and_parent(fork_id).await?;
        Ok(self.diff(&fork, &parent).await)
    }

    /// Recompute a fork's changelog and persist its summary and
    /// normalized fork tags
    ///
    /// # Errors
    /// As [`Self::changelog`], plus store failure on write
    pub async fn refresh_changelog(&self, fork_id: RecipeId) -> EngineResult<Arc<Changelog>> {
        let (fork, parent) = self.fork_and_parent(fork_id).await?;
        let changelog = self.diff(&fork, &parent).await;

        let update = ForkMetadataUpdate {
            fork_tags: Some(normalize_tags(&fork.fork_tags)),
            changelog_summary: Some(changelog.summary.clone()),
        };
        self.recipes.update_fork_metadata(fork_id, update).await?;
        info!("Refreshed changelog for {}: {}", fork_id, changelog.summary);
        Ok(changelog)
    }

    async fn trials_with_parent(&self, recipe: &Recipe) -> EngineResult<(Vec<CookTrial>, Option<Vec<CookTrial>>)> {
        let own = async { Ok::<_, EngineError>(self.trials.list_trials(recipe.id).await?) };
        let parent = async {
            match recipe.parent_id {
                Some(parent_id) => Ok::<_, EngineError>(Some(self.trials.list_trials(parent_id).await?)),
                None => Ok(None),
            }
        };
        futures::try_join!(own, parent)
    }

    /// Trial stats, badges and parent comparison for a recipe
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn validation(&self, recipe_id: RecipeId) -> EngineResult<ValidationReport> {
        let recipe = self.walker.load(recipe_id).await?;
        let (trials, parent_trials) = self.trials_with_parent(&recipe).await?;
        let report = self.aggregator.report(&trials, parent_trials.as_deref());
        debug!(
            "Validation for {}: {} cooks, {} badge(s)",
            recipe_id,
            report.stats.total_cooks,
            report.badges.len()
        );
        Ok(report)
    }

    /// Predicted outcome of cooking a recipe
    ///
    /// Forks whose parent is gone are predicted without a changelog or
    /// comparison.
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn predict(&self, recipe_id: RecipeId) -> EngineResult<Prediction> {
        let recipe = self.walker.load(recipe_id).await?;

        let parent = match recipe.parent_id {
            Some(parent_id) => {
                let parent = self.recipes.get_recipe(parent_id).await?;
                if parent.is_none() {
                    warn!("Parent {} of {} is missing", parent_id, recipe_id);
                }
                parent
            }
            None => None,
        };
        let changelog = match &parent {
            Some(parent) => Some(self.diff(&recipe, parent).await),
            None => None,
        };

        let (trials, parent_trials) = self.trials_with_parent(&recipe).await?;
        let parent_trials = parent.as_ref().and(parent_trials);
        let prediction = self
            .predictor
            .predict(&trials, changelog.as_deref(), parent_trials.as_deref());
        info!(
            "Prediction for {}: {:?} risk, {}% confidence",
            recipe_id, prediction.risk_level, prediction.confidence
        );
        Ok(prediction)
    }

    /// Forks of a recipe ranked for a user
    ///
    /// A missing profile ranks on popularity alone.
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn suggestions(&self, recipe_id: RecipeId, user_id: Option<UserId>) -> EngineResult<Vec<Suggestion>> {
        let recipe = self.walker.load(recipe_id).await?;
        let forks = self
            .recipes
            .list_children(
                recipe.id,
                ChildOrder::PopularityThenAge,
                self.config.traversal.max_children_per_node,
            )
            .await?;
        let profile = match user_id {
            Some(user_id) => self.profiles.get_flavor_profile(user_id).await?,
            None => None,
        };
        let ranked = self.ranker.rank(&forks, profile.as_ref());
        debug!("Ranked {} of {} forks of {}", ranked.len(), forks.len(), recipe_id);
        Ok(ranked)
    }

    /// Changes a template would make to a recipe
    ///
    /// # Errors
    /// `InvalidTemplate` for an unknown template, `NotFound` for an
    /// unknown recipe, or store failure
    pub async fn auto_fork_preview(&self, recipe_id: RecipeId, template_id: &str) -> EngineResult<AutoForkPreview> {
        let template = self.autofork.template(template_id)?;
        let recipe = self.walker.load(recipe_id).await?;
        Ok(self.autofork.preview(&recipe, template))
    }

    /// Derived fork payload for a recipe and template
    ///
    /// Nothing is written; the caller persists the payload.
    ///
    /// # Errors
    /// As [`Self::auto_fork_preview`]
    pub async fn auto_fork_apply(&self, recipe_id: RecipeId, template_id: &str) -> EngineResult<AutoForkResult> {
        let template = self.autofork.template(template_id)?;
        let recipe = self.walker.load(recipe_id).await?;
        let result = self.autofork.apply(&recipe, template);
        info!(
            "Auto-fork {} of {}: {} ingredient(s), {} step(s)",
            template_id, recipe_id, result.ingredients_changed, result.steps_changed
        );
        Ok(result)
    }

    async fn deliver(&self, event: ForkEvent) -> bool {
        match self.sink.emit(event).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification delivery failed: {}", e);
                false
            }
        }
    }

    /// Tell the parent's author about a new fork
    ///
    /// Best effort: lookup and delivery failures are logged and reported
    /// as `false`. Forking your own recipe notifies nobody.
    pub async fn notify_fork_created(&self, fork_id: RecipeId) -> bool {
        let (fork, parent) = match self.fork_and_parent(fork_id).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Skipping fork notification for {}: {}", fork_id, e);
                return false;
            }
        };
        if fork.author_id == parent.author_id {
            return false;
        }
        let event = ForkEvent::new(
            parent.author_id,
            ForkEventKind::ForkCreated {
                fork_id,
                parent_id: parent.id,
                forked_by: fork.author_id,
            },
        );
        self.deliver(event).await
    }

    /// Tell a recipe's author about a vote
    ///
    /// Best effort, as [`Self::notify_fork_created`]. Self-votes notify
    /// nobody.
    pub async fn notify_vote(&self, recipe_id: RecipeId, voter_id: UserId) -> bool {
        let recipe = match self.walker.load(recipe_id).await {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!("Skipping vote notification for {}: {}", recipe_id, e);
                return false;
            }
        };
        if recipe.author_id == voter_id {
            return false;
        }
        let event = ForkEvent::new(recipe.author_id, ForkEventKind::VoteCast { recipe_id, voter_id });
        self.deliver(event).await
    }
}

/// Canonical, de-duplicated fork tags; unknown tags are dropped
#[must_use]
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        match ForkTag::parse_lenient(tag) {
            Some(known) if !normalized.iter().any(|t| t == known.as_str()) => {
                normalized.push(known.as_str().to_string());
            }
            Some(_) => {}
            None => debug!("Dropping unknown fork tag {:?}", tag),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_tags_canonicalizes_and_dedupes() {
        let tags = vec![
            "Gluten-Free".to_string(),
            "gluten_free".to_string(),
            "made-up".to_string(),
            "AIR FRYER".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["gluten_free", "air_fryer"]);
    }

    proptest! {
        #[test]
        fn normalized_tags_are_canonical_and_unique(
            tags in prop::collection::vec(
                prop_oneof![
                    prop::sample::select(ForkTag::ALL.to_vec()).prop_map(|t| t.label().to_string()),
                    "[a-z]{3,8}",
                ],
                0..8,
            )
        ) {
            let normalized = normalize_tags(&tags);
            prop_assert_eq!(normalize_tags(&normalized), normalized.clone());
            for (i, tag) in normalized.iter().enumerate() {
                prop_assert!(ForkTag::ALL.iter().any(|t| t.as_str() == tag));
                prop_assert!(!normalized[..i].contains(tag));
            }
        }
    }
}
