//! Recipe model
//!
//! A recipe is read mostly. The fork pointers (`parent_id`, `root_id`) and
//! the cached counters (`fork_count`, `vote_count`) are maintained by the
//! owning write path; the engine only reads them.

use crate::ids::{RecipeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single ingredient line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Display name, e.g. "2 large eggs" or "butter"
    pub name: String,
    /// Free-form quantity ("2", "1/2", "1 1/2")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    /// Unit of measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Preparation notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Ingredient {
    /// Create an ingredient with only a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
            notes: None,
        }
    }

    /// With quantity and unit
    #[inline]
    #[must_use]
    pub fn with_amount(mut self, quantity: impl Into<String>, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self.unit = Some(unit.into());
        self
    }

    /// With quantity only
    #[inline]
    #[must_use]
    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trimmed, lowercased name used as the identity of an ingredient
    #[must_use]
    pub fn match_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Append a note, separating from existing notes with "; "
    pub fn append_note(&mut self, note: &str) {
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.trim().is_empty() => format!("{existing}; {note}"),
            _ => note.to_string(),
        });
    }
}

/// Single instruction step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position within the section
    pub order: u32,
    /// Instruction text
    pub instruction: String,
    /// Duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Step {
    /// Create a step
    #[inline]
    #[must_use]
    pub fn new(order: u32, instruction: impl Into<String>) -> Self {
        Self {
            order,
            instruction: instruction.into(),
            duration: None,
        }
    }
}

/// Ordered section of a recipe ("Dough", "Filling", ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSection {
    /// Section heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ordered ingredients
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Ordered steps
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ComponentSection {
    /// Create a titled section
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// With ingredient
    #[inline]
    #[must_use]
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// With step; order is assigned from the position
    #[must_use]
    pub fn with_step(mut self, instruction: impl Into<String>) -> Self {
        let order = u32::try_from(self.steps.len() + 1).unwrap_or(u32::MAX);
        self.steps.push(Step::new(order, instruction));
        self
    }
}

/// Difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Beginner friendly
    Easy,
    /// Some experience needed
    Medium,
    /// Demanding
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(s)
    }
}

/// Timing, yield and difficulty metadata
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeMetadata {
    /// Preparation time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time_minutes: Option<u32>,
    /// Cooking time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,
    /// Servings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Difficulty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Recipe entity as supplied by the recipe store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Identity
    pub id: RecipeId,
    /// Title
    pub title: String,
    /// Author
    pub author_id: UserId,
    /// Recipe this one was forked from
    #[serde(default)]
    pub parent_id: Option<RecipeId>,
    /// Origin of the whole fork tree; absent on roots
    #[serde(default)]
    pub root_id: Option<RecipeId>,
    /// Cached number of direct forks
    #[serde(default)]
    pub fork_count: u32,
    /// Cached number of votes
    #[serde(default)]
    pub vote_count: u32,
    /// Tags from the fork-tag vocabulary
    #[serde(default)]
    pub fork_tags: Vec<String>,
    /// Free-text note from the fork author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_note: Option<String>,
    /// Ordered sections
    #[serde(default)]
    pub components: Vec<ComponentSection>,
    /// Timing/yield/difficulty
    #[serde(default)]
    pub metadata: RecipeMetadata,
    /// Persisted changelog summary (written by the engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_summary: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a root recipe
    #[must_use]
    pub fn new(id: RecipeId, title: impl Into<String>, author_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            author_id,
            parent_id: None,
            root_id: None,
            fork_count: 0,
            vote_count: 0,
            fork_tags: Vec::new(),
            fork_note: None,
            components: Vec::new(),
            metadata: RecipeMetadata::default(),
            changelog_summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a fork of `parent`; root pointer is inherited from the parent
    #[must_use]
    pub fn fork_of(parent: &Recipe, id: RecipeId, title: impl Into<String>, author_id: UserId) -> Self {
        let mut fork = Self::new(id, title, author_id);
        fork.parent_id = Some(parent.id);
        fork.root_id = Some(parent.root_id.unwrap_or(parent.id));
        fork.components = parent.components.clone();
        fork.metadata = parent.metadata;
        fork
    }

    /// Whether this recipe was forked from another
    #[inline]
    #[must_use]
    pub fn is_fork(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Whether the recipe carries a fork tag
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.fork_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// All ingredients, section boundaries flattened
    pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.components.iter().flat_map(|c| c.ingredients.iter())
    }

    /// All steps, section boundaries flattened
    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.components.iter().flat_map(|c| c.steps.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_inherits_root_from_parent() {
        let root = Recipe::new(RecipeId::from_u128(1), "Root", UserId::from_u128(1));
        let child = Recipe::fork_of(&root, RecipeId::from_u128(2), "Child", UserId::from_u128(2));
        let grandchild =
            Recipe::fork_of(&child, RecipeId::from_u128(3), "Grandchild", UserId::from_u128(3));

        assert_eq!(child.root_id, Some(root.id));
        assert_eq!(grandchild.root_id, Some(root.id));
        assert_eq!(grandchild.parent_id, Some(child.id));
        assert!(!root.is_fork());
        assert!(grandchild.is_fork());
    }

    #[test]
    fn append_note_joins_existing_notes() {
        let mut ingredient = Ingredient::new("butter").with_notes("softened");
        ingredient.append_note("use vegan butter");
        assert_eq!(ingredient.notes.as_deref(), Some("softened; use vegan butter"));

        let mut bare = Ingredient::new("sugar");
        bare.append_note("reduced");
        assert_eq!(bare.notes.as_deref(), Some("reduced"));
    }

    #[test]
    fn flatten_spans_sections() {
        let mut recipe = Recipe::new(RecipeId::from_u128(1), "Pie", UserId::from_u128(1));
        recipe.components = vec![
            ComponentSection::new("Crust")
                .with_ingredient(Ingredient::new("flour"))
                .with_step("Mix"),
            ComponentSection::new("Filling")
                .with_ingredient(Ingredient::new("apples"))
                .with_step("Slice")
                .with_step("Bake"),
        ];
        assert_eq!(recipe.ingredients().count(), 2);
        assert_eq!(recipe.steps().map(|s| s.order).collect::<Vec<_>>(), vec![1, 1, 2]);
    }

    #[test]
    fn match_key_is_trimmed_and_lowercased() {
        assert_eq!(Ingredient::new("  Green Onion ").match_key(), "green onion");
    }
}
