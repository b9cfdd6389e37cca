//! Flavor-preference profiles

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// Per-user preference vector used to rank sibling forks
///
/// Both scalars live in `0.0..=1.0`; `0.5` is neutral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    /// Owner
    pub user_id: UserId,
    /// 0 = mild, 1 = very spicy
    #[serde(default = "neutral")]
    pub heat_preference: f64,
    /// 0 = keep it simple, 1 = enjoys involved cooking
    #[serde(default = "neutral")]
    pub preferred_complexity: f64,
    /// Dietary restriction tags ("vegan", "gluten_free", ...)
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

fn neutral() -> f64 {
    0.5
}

impl FlavorProfile {
    /// Neutral profile
    #[must_use]
    pub fn neutral(user_id: UserId) -> Self {
        Self {
            user_id,
            heat_preference: neutral(),
            preferred_complexity: neutral(),
            dietary_restrictions: Vec::new(),
        }
    }

    /// With heat preference, clamped into range
    #[inline]
    #[must_use]
    pub fn with_heat(mut self, heat: f64) -> Self {
        self.heat_preference = heat.clamp(0.0, 1.0);
        self
    }

    /// With complexity preference, clamped into range
    #[inline]
    #[must_use]
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.preferred_complexity = complexity.clamp(0.0, 1.0);
        self
    }

    /// With dietary restriction
    #[inline]
    #[must_use]
    pub fn with_restriction(mut self, tag: impl Into<String>) -> Self {
        self.dietary_restrictions.push(tag.into());
        self
    }
}
