//! Fork-tag vocabulary
//!
//! Fork tags are stored as plain strings on recipes. This table is the
//! fixed vocabulary they are drawn from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known fork tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkTag {
    /// No animal products
    Vegan,
    /// No meat or fish
    Vegetarian,
    /// No gluten
    GlutenFree,
    /// No dairy
    DairyFree,
    /// Fewer carbohydrates
    LowCarb,
    /// More protein
    HighProtein,
    /// Less sugar
    LowerSugar,
    /// Lighter overall
    Healthier,
    /// More heat
    Spicier,
    /// Less heat
    Milder,
    /// Less time
    Quicker,
    /// Fewer or easier steps
    Simpler,
    /// More involved
    MoreComplex,
    /// Cheaper ingredients
    BudgetFriendly,
    /// Suited to children
    KidFriendly,
    /// Cooked in an air fryer
    AirFryer,
    /// Cooked in a slow cooker
    SlowCooker,
}

impl ForkTag {
    /// Every tag in the vocabulary
    pub const ALL: [ForkTag; 17] = [
        Self::Vegan,
        Self::Vegetarian,
        Self::GlutenFree,
        Self::DairyFree,
        Self::LowCarb,
        Self::HighProtein,
        Self::LowerSugar,
        Self::Healthier,
        Self::Spicier,
        Self::Milder,
        Self::Quicker,
        Self::Simpler,
        Self::MoreComplex,
        Self::BudgetFriendly,
        Self::KidFriendly,
        Self::AirFryer,
        Self::SlowCooker,
    ];

    /// Stored string form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vegan => "vegan",
            Self::Vegetarian => "vegetarian",
            Self::GlutenFree => "gluten_free",
            Self::DairyFree => "dairy_free",
            Self::LowCarb => "low_carb",
            Self::HighProtein => "high_protein",
            Self::LowerSugar => "lower_sugar",
            Self::Healthier => "healthier",
            Self::Spicier => "spicier",
            Self::Milder => "milder",
            Self::Quicker => "quicker",
            Self::Simpler => "simpler",
            Self::MoreComplex => "more_complex",
            Self::BudgetFriendly => "budget_friendly",
            Self::KidFriendly => "kid_friendly",
            Self::AirFryer => "air_fryer",
            Self::SlowCooker => "slow_cooker",
        }
    }

    /// Human label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Vegan => "Vegan",
            Self::Vegetarian => "Vegetarian",
            Self::GlutenFree => "Gluten-free",
            Self::DairyFree => "Dairy-free",
            Self::LowCarb => "Low carb",
            Self::HighProtein => "High protein",
            Self::LowerSugar => "Lower sugar",
            Self::Healthier => "Healthier",
            Self::Spicier => "Spicier",
            Self::Milder => "Milder",
            Self::Quicker => "Quicker",
            Self::Simpler => "Simpler",
            Self::MoreComplex => "More complex",
            Self::BudgetFriendly => "Budget friendly",
            Self::KidFriendly => "Kid friendly",
            Self::AirFryer => "Air fryer",
            Self::SlowCooker => "Slow cooker",
        }
    }

    /// Dietary or health-oriented tag
    #[must_use]
    pub const fn is_health(&self) -> bool {
        matches!(
            self,
            Self::Vegan
                | Self::Vegetarian
                | Self::GlutenFree
                | Self::DairyFree
                | Self::LowCarb
                | Self::HighProtein
                | Self::LowerSugar
                | Self::Healthier
        )
    }

    /// Parse a stored tag, ignoring unknown values
    #[must_use]
    pub fn parse_lenient(tag: &str) -> Option<Self> {
        tag.parse().ok()
    }
}

impl fmt::Display for ForkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag outside the vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fork tag: {0}")]
pub struct UnknownForkTag(pub String);

impl FromStr for ForkTag {
    type Err = UnknownForkTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownForkTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_accepts_dashes_and_case() {
        assert_eq!("Gluten-Free".parse::<ForkTag>().unwrap(), ForkTag::GlutenFree);
        assert_eq!("more complex".parse::<ForkTag>().unwrap(), ForkTag::MoreComplex);
        assert!("deep_fried".parse::<ForkTag>().is_err());
    }

    #[test]
    fn every_tag_roundtrips() {
        for tag in ForkTag::ALL {
            assert_eq!(tag.as_str().parse::<ForkTag>().unwrap(), tag);
        }
    }

    proptest! {
        #[test]
        fn parse_ignores_case_separators_and_padding(
            idx in 0usize..ForkTag::ALL.len(),
            upper in any::<bool>(),
            sep in prop::sample::select(vec!["_", "-", " "]),
            pad in "[ ]{0,2}",
        ) {
            let tag = ForkTag::ALL[idx];
            let mut written = tag.as_str().replace('_', sep);
            if upper {
                written = written.to_uppercase();
            }
            let written = format!("{pad}{written}{pad}");
            prop_assert_eq!(ForkTag::parse_lenient(&written), Some(tag));
        }
    }
}
