//! Testing utilities for the Forkline workspace
//!
//! Shared fixtures, builders and collaborator doubles.

#![allow(missing_docs)]

use chrono::{Duration, Utc};
use forkline_model::{
    ComponentSection, CookTrial, Difficulty, FlavorProfile, ForkEvent, InMemoryStore, Ingredient,
    NotificationSink, Recipe, RecipeId, RecipeMetadata, StoreError, UserId, QUICK_EASY_TAG,
    TIME_CONSUMING_TAG,
};
use parking_lot::Mutex;

pub fn user(n: u128) -> UserId {
    UserId::from_u128(n)
}

/// Builder over [`Recipe`] with deterministic ids
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    recipe: Recipe,
}

impl RecipeBuilder {
    pub fn root(id: u128, title: &str) -> Self {
        Self {
            recipe: Recipe::new(RecipeId::from_u128(id), title, user(1)),
        }
    }

    pub fn fork(parent: &Recipe, id: u128, title: &str) -> Self {
        Self {
            recipe: Recipe::fork_of(parent, RecipeId::from_u128(id), title, user(2)),
        }
    }

    pub fn parent(mut self, id: u128) -> Self {
        self.recipe.parent_id = Some(RecipeId::from_u128(id));
        self
    }

    pub fn root_pointer(mut self, id: u128) -> Self {
        self.recipe.root_id = Some(RecipeId::from_u128(id));
        self
    }

    pub fn author(mut self, n: u128) -> Self {
        self.recipe.author_id = user(n);
        self
    }

    pub fn forks(mut self, n: u32) -> Self {
        self.recipe.fork_count = n;
        self
    }

    pub fn votes(mut self, n: u32) -> Self {
        self.recipe.vote_count = n;
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.recipe.fork_tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub fn minutes_ago(mut self, minutes: i64) -> Self {
        self.recipe.created_at = Utc::now() - Duration::minutes(minutes);
        self.recipe.updated_at = self.recipe.created_at;
        self
    }

    pub fn components(mut self, sections: Vec<ComponentSection>) -> Self {
        self.recipe.components = sections;
        self
    }

    pub fn metadata(mut self, metadata: RecipeMetadata) -> Self {
        self.recipe.metadata = metadata;
        self
    }

    pub fn build(self) -> Recipe {
        self.recipe
    }
}

/// Linear chain root -> ... -> leaf of `len` recipes (ids 1..=len), inserted
/// into the store
pub fn build_chain(store: &InMemoryStore, len: usize) -> Vec<Recipe> {
    let mut chain: Vec<Recipe> = Vec::with_capacity(len);
    for i in 0..len {
        let id = i as u128 + 1;
        let age = (len - i) as i64;
        let builder = match chain.last() {
            Some(parent) => RecipeBuilder::fork(parent, id, &format!("r{id}")),
            None => RecipeBuilder::root(id, &format!("r{id}")),
        };
        let forks = u32::from(i + 1 < len);
        chain.push(builder.forks(forks).minutes_ago(age).build());
    }
    for recipe in &chain {
        store.insert_recipe(recipe.clone());
    }
    chain
}

/// Complete tree with `fan_out` children per node down to `depth`, inserted
/// into the store; returns the root
pub fn build_tree(store: &InMemoryStore, fan_out: usize, depth: usize) -> Recipe {
    let mut next_id: u128 = 1;
    let root = RecipeBuilder::root(next_id, "root")
        .forks(if depth > 0 { fan_out as u32 } else { 0 })
        .minutes_ago(100_000)
        .build();
    store.insert_recipe(root.clone());

    let mut level = vec![root.clone()];
    for d in 1..=depth {
        let mut next_level = Vec::new();
        for parent in &level {
            for _ in 0..fan_out {
                next_id += 1;
                let forks = if d < depth { fan_out as u32 } else { 0 };
                let child = RecipeBuilder::fork(parent, next_id, &format!("r{next_id}"))
                    .forks(forks)
                    .minutes_ago(100_000 - next_id as i64)
                    .build();
                store.insert_recipe(child.clone());
                next_level.push(child);
            }
        }
        level = next_level;
    }
    root
}

/// Pancakes: two sections, five ingredients, four steps
pub fn sample_recipe(id: u128) -> Recipe {
    RecipeBuilder::root(id, "Buttermilk Pancakes")
        .components(vec![
            ComponentSection::new("Batter")
                .with_ingredient(Ingredient::new("flour").with_amount("2", "cups"))
                .with_ingredient(Ingredient::new("2 large eggs"))
                .with_ingredient(Ingredient::new("buttermilk").with_amount("1.5", "cups"))
                .with_ingredient(Ingredient::new("sugar").with_amount("2", "tbsp"))
                .with_step("Whisk the dry ingredients")
                .with_step("Fold in eggs and buttermilk"),
            ComponentSection::new("Cooking")
                .with_ingredient(Ingredient::new("butter").with_amount("1", "tbsp"))
                .with_step("Heat a griddle and melt the butter")
                .with_step("Cook until bubbles form, then flip"),
        ])
        .metadata(RecipeMetadata {
            prep_time_minutes: Some(10),
            cook_time_minutes: Some(15),
            servings: Some(4),
            difficulty: Some(Difficulty::Easy),
        })
        .build()
}

/// Builder over [`CookTrial`]
#[derive(Debug, Clone)]
pub struct TrialBuilder {
    trial: CookTrial,
}

impl TrialBuilder {
    pub fn new(recipe_id: RecipeId, rating: u8) -> Self {
        Self {
            trial: CookTrial::new(recipe_id, user(100), rating),
        }
    }

    pub fn by(mut self, n: u128) -> Self {
        self.trial.user_id = user(n);
        self
    }

    pub fn again(mut self, would_make_again: bool) -> Self {
        self.trial.would_make_again = Some(would_make_again);
        self
    }

    pub fn quick(mut self) -> Self {
        self.trial.tags.push(QUICK_EASY_TAG.to_string());
        self
    }

    pub fn slow(mut self) -> Self {
        self.trial.tags.push(TIME_CONSUMING_TAG.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.trial.tags.push(tag.to_string());
        self
    }

    pub fn photo(mut self) -> Self {
        self.trial.photo_url = Some(format!("https://photos.example/{}.jpg", self.trial.id));
        self
    }

    pub fn days_ago(mut self, days: i64) -> Self {
        self.trial.cooked_at = Utc::now() - Duration::days(days);
        self
    }

    pub fn build(self) -> CookTrial {
        self.trial
    }
}

/// One plain trial per rating
pub fn trials_with_ratings(recipe_id: RecipeId, ratings: &[u8]) -> Vec<CookTrial> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, r)| TrialBuilder::new(recipe_id, *r).by(i as u128 + 100).build())
        .collect()
}

pub fn profile(user_n: u128, heat: f64, complexity: f64) -> FlavorProfile {
    FlavorProfile::neutral(user(user_n))
        .with_heat(heat)
        .with_complexity(complexity)
}

/// Sink that records every event
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ForkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ForkEvent> {
        self.events.lock().clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn emit(&self, event: ForkEvent) -> Result<(), StoreError> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Sink whose delivery always fails
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

#[async_trait::async_trait]
impl NotificationSink for FailingSink {
    async fn emit(&self, _event: ForkEvent) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("notification service down".to_string()))
    }
}
