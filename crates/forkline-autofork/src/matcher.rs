//! Ingredient matching shared by preview and apply
//!
//! A target is split on whitespace and underscores; an ingredient matches
//! when any token occurs anywhere in its lowercased name. The match is
//! deliberately loose: `egg` matches `eggplant` too.

use forkline_model::Ingredient;
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("token separator pattern is valid"));

/// Compiled ingredient target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientMatcher {
    tokens: Vec<String>,
}

impl IngredientMatcher {
    /// Tokenize a target
    #[must_use]
    pub fn new(target: &str) -> Self {
        let lower = target.to_lowercase();
        let tokens = TOKEN_SEPARATOR
            .split(&lower)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self { tokens }
    }

    /// Lowercased tokens
    #[inline]
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether a raw name matches
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.tokens.iter().any(|t| name.contains(t.as_str()))
    }

    /// Whether an ingredient matches by name
    #[inline]
    #[must_use]
    pub fn matches(&self, ingredient: &Ingredient) -> bool {
        self.is_match(&ingredient.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn egg_matches_eggs_and_eggplant() {
        let m = IngredientMatcher::new("egg");
        assert!(m.is_match("2 large eggs"));
        assert!(m.is_match("eggplant, sliced"));
        assert!(!m.is_match("flour"));
    }

    #[test]
    fn any_token_is_enough() {
        let m = IngredientMatcher::new("heavy_cream  milk");
        assert_eq!(m.tokens(), ["heavy", "cream", "milk"]);
        assert!(m.is_match("Whole Milk"));
        assert!(m.is_match("sour cream"));
    }

    #[test]
    fn blank_target_matches_nothing() {
        let m = IngredientMatcher::new("  _ ");
        assert!(m.tokens().is_empty());
        assert!(!m.is_match("anything"));
    }
}
