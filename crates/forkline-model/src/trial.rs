//! Cook-trial records

use crate::ids::{RecipeId, TrialId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag a cook leaves when the recipe felt quick
pub const QUICK_EASY_TAG: &str = "quick_easy";

/// Tag a cook leaves when the recipe took longer than expected
pub const TIME_CONSUMING_TAG: &str = "time_consuming";

/// Lowest rating counted as a successful cook
pub const SUCCESS_RATING: u8 = 3;

/// Highest rating on the scale; the lowest is 1
pub const MAX_RATING: u8 = 4;

/// A single user-reported attempt at cooking a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookTrial {
    /// Identity
    pub id: TrialId,
    /// Recipe that was cooked
    pub recipe_id: RecipeId,
    /// Cook
    pub user_id: UserId,
    /// Rating on a 1-4 scale
    pub rating: u8,
    /// Whether the cook would make it again; absent when not answered
    #[serde(default)]
    pub would_make_again: Option<bool>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Photo evidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// When the cook happened
    pub cooked_at: DateTime<Utc>,
}

impl CookTrial {
    /// Create a trial with no optional fields set
    #[must_use]
    pub fn new(recipe_id: RecipeId, user_id: UserId, rating: u8) -> Self {
        Self {
            id: TrialId::new(),
            recipe_id,
            user_id,
            rating,
            would_make_again: None,
            tags: Vec::new(),
            photo_url: None,
            cooked_at: Utc::now(),
        }
    }

    /// Rating at or above [`SUCCESS_RATING`]
    #[inline]
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.rating >= SUCCESS_RATING
    }

    /// Rating falls on the 1-4 scale
    #[inline]
    #[must_use]
    pub fn has_valid_rating(&self) -> bool {
        (1..=MAX_RATING).contains(&self.rating)
    }

    /// Whether the trial carries a tag (case-insensitive)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Non-empty photo URL present
    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.photo_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_starts_at_three() {
        let r = RecipeId::from_u128(1);
        let u = UserId::from_u128(1);
        assert!(!CookTrial::new(r, u, 2).is_successful());
        assert!(CookTrial::new(r, u, 3).is_successful());
        assert!(CookTrial::new(r, u, 4).is_successful());
    }

    #[test]
    fn blank_photo_url_is_not_a_photo() {
        let mut trial = CookTrial::new(RecipeId::from_u128(1), UserId::from_u128(1), 4);
        trial.photo_url = Some("   ".into());
        assert!(!trial.has_photo());
        trial.photo_url = Some("https://img.example/1.jpg".into());
        assert!(trial.has_photo());
    }
}
