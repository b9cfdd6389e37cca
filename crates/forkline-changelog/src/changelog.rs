//! Changelog report types

use forkline_model::Ingredient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ingredient present on both sides with a different amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientChange {
    /// Name as written in the fork
    pub name: String,
    /// Parent quantity
    pub old_quantity: Option<String>,
    /// Fork quantity
    pub new_quantity: Option<String>,
    /// Parent unit
    pub old_unit: Option<String>,
    /// Fork unit
    pub new_unit: Option<String>,
}

/// Metadata fields compared by the differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    /// Preparation time
    PrepTime,
    /// Cooking time
    CookTime,
    /// Servings
    Servings,
    /// Difficulty
    Difficulty,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PrepTime => "prep time",
            Self::CookTime => "cook time",
            Self::Servings => "servings",
            Self::Difficulty => "difficulty",
        };
        f.write_str(s)
    }
}

/// A metadata field whose value differs, values reported verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataChange {
    /// Which field
    pub field: MetadataField,
    /// Parent value (`null` when unset)
    pub old: serde_json::Value,
    /// Fork value (`null` when unset)
    pub new: serde_json::Value,
}

/// Structural diff between a fork and its parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changelog {
    /// Ingredients only the fork has
    pub ingredients_added: Vec<Ingredient>,
    /// Ingredients only the parent has
    pub ingredients_removed: Vec<Ingredient>,
    /// Ingredients on both sides whose quantity or unit changed
    pub ingredients_modified: Vec<IngredientChange>,
    /// Steps the fork adds
    pub steps_added: usize,
    /// Steps the fork drops
    pub steps_removed: usize,
    /// Steps whose instruction changed
    pub steps_modified: usize,
    /// Metadata differences
    pub metadata_changes: Vec<MetadataChange>,
    /// Human-readable sentence
    pub summary: String,
}

impl Changelog {
    /// Added + removed + modified ingredients
    #[inline]
    #[must_use]
    pub fn ingredient_changes(&self) -> usize {
        self.ingredients_added.len() + self.ingredients_removed.len() + self.ingredients_modified.len()
    }

    /// Added + removed + modified steps
    #[inline]
    #[must_use]
    pub fn step_changes(&self) -> usize {
        self.steps_added + self.steps_removed + self.steps_modified
    }

    /// Every counted difference, metadata included
    #[inline]
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.ingredient_changes() + self.step_changes() + self.metadata_changes.len()
    }

    /// Nothing differs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }
}

/// Summary used when no summarised category changed
pub const MINOR_ADJUSTMENTS: &str = "Minor adjustments";

/// Comma-joined sentence over the non-zero categories, in fixed order:
/// ingredients added, removed, modified, steps added, removed
#[must_use]
pub fn summarize(
    ingredients_added: usize,
    ingredients_removed: usize,
    ingredients_modified: usize,
    steps_added: usize,
    steps_removed: usize,
) -> String {
    let parts: Vec<String> = [
        (ingredients_added, "ingredient", "added"),
        (ingredients_removed, "ingredient", "removed"),
        (ingredients_modified, "ingredient", "modified"),
        (steps_added, "step", "added"),
        (steps_removed, "step", "removed"),
    ]
    .into_iter()
    .filter(|(n, _, _)| *n > 0)
    .map(|(n, noun, verb)| {
        let plural = if n == 1 { "" } else { "s" };
        format!("{n} {noun}{plural} {verb}")
    })
    .collect();

    if parts.is_empty() {
        MINOR_ADJUSTMENTS.to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_non_zero_categories_in_order() {
        assert_eq!(summarize(2, 0, 1, 0, 3), "2 ingredients added, 1 ingredient modified, 3 steps removed");
        assert_eq!(summarize(0, 1, 0, 1, 0), "1 ingredient removed, 1 step added");
    }

    #[test]
    fn empty_summary_falls_back() {
        assert_eq!(summarize(0, 0, 0, 0, 0), MINOR_ADJUSTMENTS);
    }
}
