//! Structural comparison of a fork against its parent
//!
//! Section boundaries are not significant: both sides are flattened before
//! comparing. Ingredients are matched by trimmed, case-insensitive name
//! only, so "scallion" and "green onion" are different ingredients. A name
//! repeated across sections pairs occurrence by occurrence. Quantities,
//! units and instructions compare verbatim.

use crate::changelog::{
    summarize, Changelog, IngredientChange, MetadataChange, MetadataField,
};
use forkline_model::{ComponentSection, Ingredient, Recipe, RecipeMetadata, Step};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How steps are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDiffMode {
    /// Index-by-index. A step inserted mid-sequence shows up as a cascade
    /// of modified steps plus one added step. Existing consumers rely on
    /// these counts.
    #[default]
    Positional,
    /// Minimal edit script (insert/delete/substitute) over instructions
    Aligned,
}

/// Step counts produced by either mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct StepCounts {
    added: usize,
    removed: usize,
    modified: usize,
}

/// Changelog differ
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangelogDiffer {
    step_mode: StepDiffMode,
}

impl ChangelogDiffer {
    /// Differ with positional step comparison
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With step comparison mode
    #[inline]
    #[must_use]
    pub fn with_step_mode(mut self, mode: StepDiffMode) -> Self {
        self.step_mode = mode;
        self
    }

    /// Full diff including metadata
    #[must_use]
    pub fn diff(&self, fork: &Recipe, parent: &Recipe) -> Changelog {
        let mut changelog = self.diff_components(&fork.components, &parent.components);
        changelog.metadata_changes = diff_metadata(&fork.metadata, &parent.metadata);
        tracing::debug!(
            "Diffed {} against {}: {}",
            fork.id,
            parent.id,
            changelog.summary
        );
        changelog
    }

    /// Ingredient and step diff over component trees
    #[must_use]
    pub fn diff_components(
        &self,
        fork: &[ComponentSection],
        parent: &[ComponentSection],
    ) -> Changelog {
        let fork_ingredients = flatten_ingredients(fork);
        let parent_ingredients = flatten_ingredients(parent);
        let fork_index = index_occurrences(&fork_ingredients);
        let parent_index = index_occurrences(&parent_ingredients);

        let ingredients_added: Vec<Ingredient> = fork_ingredients
            .iter()
            .filter(|(key, _)| !parent_index.contains_key(key))
            .map(|(_, ingredient)| (*ingredient).clone())
            .collect();

        let ingredients_removed: Vec<Ingredient> = parent_ingredients
            .iter()
            .filter(|(key, _)| !fork_index.contains_key(key))
            .map(|(_, ingredient)| (*ingredient).clone())
            .collect();

        // k-th occurrence of a name in the fork pairs with the k-th in the parent
        let ingredients_modified: Vec<IngredientChange> = fork_index
            .iter()
            .filter_map(|(key, news)| parent_index.get(key).map(|olds| (olds, news)))
            .flat_map(|(olds, news)| olds.iter().zip(news.iter()))
            .filter(|(old, new)| amount_changed(old, new))
            .map(|(old, new)| IngredientChange {
                name: new.name.clone(),
                old_quantity: old.quantity.clone(),
                new_quantity: new.quantity.clone(),
                old_unit: old.unit.clone(),
                new_unit: new.unit.clone(),
            })
            .collect();

        let fork_steps: Vec<&Step> = fork.iter().flat_map(|s| s.steps.iter()).collect();
        let parent_steps: Vec<&Step> = parent.iter().flat_map(|s| s.steps.iter()).collect();
        let steps = match self.step_mode {
            StepDiffMode::Positional => positional_steps(&fork_steps, &parent_steps),
            StepDiffMode::Aligned => aligned_steps(&fork_steps, &parent_steps),
        };

        let summary = summarize(
            ingredients_added.len(),
            ingredients_removed.len(),
            ingredients_modified.len(),
            steps.added,
            steps.removed,
        );

        Changelog {
            ingredients_added,
            ingredients_removed,
            ingredients_modified,
            steps_added: steps.added,
            steps_removed: steps.removed,
            steps_modified: steps.modified,
            metadata_changes: Vec::new(),
            summary,
        }
    }
}

/// Flattened ingredients with their match keys, in recipe order
fn flatten_ingredients(sections: &[ComponentSection]) -> Vec<(String, &Ingredient)> {
    sections
        .iter()
        .flat_map(|s| s.ingredients.iter())
        .map(|ingredient| (ingredient.match_key(), ingredient))
        .collect()
}

/// Occurrences of each match key, in recipe order
fn index_occurrences<'a>(flat: &[(String, &'a Ingredient)]) -> IndexMap<String, Vec<&'a Ingredient>> {
    let mut index: IndexMap<String, Vec<&Ingredient>> = IndexMap::new();
    for (key, ingredient) in flat {
        index.entry(key.clone()).or_default().push(*ingredient);
    }
    index
}

fn amount_changed(old: &Ingredient, new: &Ingredient) -> bool {
    old.quantity != new.quantity || old.unit != new.unit
}

fn positional_steps(fork: &[&Step], parent: &[&Step]) -> StepCounts {
    let modified = fork
        .iter()
        .zip(parent.iter())
        .filter(|(f, p)| f.instruction != p.instruction)
        .count();
    StepCounts {
        added: fork.len().saturating_sub(parent.len()),
        removed: parent.len().saturating_sub(fork.len()),
        modified,
    }
}

/// Edit-distance alignment; ties prefer substitution, then deletion
fn aligned_steps(fork: &[&Step], parent: &[&Step]) -> StepCounts {
    let n = parent.len();
    let m = fork.len();
    let same = |i: usize, j: usize| parent[i].instruction == fork[j].instruction;

    // cost[i][j]: edits to turn parent[..i] into fork[..j]
    let mut cost = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in cost.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        cost[0][j] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let substitute = cost[i - 1][j - 1] + usize::from(!same(i - 1, j - 1));
            let delete = cost[i - 1][j] + 1;
            let insert = cost[i][j - 1] + 1;
            cost[i][j] = substitute.min(delete).min(insert);
        }
    }

    let mut counts = StepCounts::default();
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && cost[i][j] == cost[i - 1][j - 1] + usize::from(!same(i - 1, j - 1)) {
            if !same(i - 1, j - 1) {
                counts.modified += 1;
            }
            i -= 1;
            j -= 1;
        } else if i > 0 && cost[i][j] == cost[i - 1][j] + 1 {
            counts.removed += 1;
            i -= 1;
        } else {
            counts.added += 1;
            j -= 1;
        }
    }
    counts
}

fn diff_metadata(fork: &RecipeMetadata, parent: &RecipeMetadata) -> Vec<MetadataChange> {
    let fields = [
        (
            MetadataField::PrepTime,
            serde_json::json!(parent.prep_time_minutes),
            serde_json::json!(fork.prep_time_minutes),
        ),
        (
            MetadataField::CookTime,
            serde_json::json!(parent.cook_time_minutes),
            serde_json::json!(fork.cook_time_minutes),
        ),
        (
            MetadataField::Servings,
            serde_json::json!(parent.servings),
            serde_json::json!(fork.servings),
        ),
        (
            MetadataField::Difficulty,
            serde_json::json!(parent.difficulty),
            serde_json::json!(fork.difficulty),
        ),
    ];

    fields
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(field, old, new)| MetadataChange { field, old, new })
        .collect()
}
