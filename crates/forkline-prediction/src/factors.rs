//! Risk and positive factors

use serde::{Deserialize, Serialize};

/// Identifier of a prediction factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorId {
    /// Nobody has cooked it
    NoCookTrials,
    /// Only a handful of cooks
    FewCookTrials,
    /// Many cooks
    WellTested,
    /// Most cooks failed
    LowSuccessRate,
    /// Mixed results
    ModerateSuccessRate,
    /// Nearly every cook succeeded
    HighSuccessRate,
    /// Poor average rating
    LowRating,
    /// High average rating
    HighlyRated,
    /// Many ingredient changes
    MajorSubstitutions,
    /// Few ingredient changes
    MinimalChanges,
    /// Many step changes
    ComplexModifications,
    /// Does worse than its parent
    WorseThanParent,
    /// Does better than its parent
    BetterThanParent,
    /// Cooks would make it again
    CrowdFavorite,
    /// Backed by cook photos
    PhotoVerified,
}

impl FactorId {
    /// Stored string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCookTrials => "no_cook_trials",
            Self::FewCookTrials => "few_cook_trials",
            Self::WellTested => "well_tested",
            Self::LowSuccessRate => "low_success_rate",
            Self::ModerateSuccessRate => "moderate_success_rate",
            Self::HighSuccessRate => "high_success_rate",
            Self::LowRating => "low_rating",
            Self::HighlyRated => "highly_rated",
            Self::MajorSubstitutions => "major_substitutions",
            Self::MinimalChanges => "minimal_changes",
            Self::ComplexModifications => "complex_modifications",
            Self::WorseThanParent => "worse_than_parent",
            Self::BetterThanParent => "better_than_parent",
            Self::CrowdFavorite => "crowd_favorite",
            Self::PhotoVerified => "photo_verified",
        }
    }

    /// Display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::NoCookTrials => "Untested",
            Self::FewCookTrials => "Limited Testing",
            Self::WellTested => "Well Tested",
            Self::LowSuccessRate => "Low Success Rate",
            Self::ModerateSuccessRate => "Mixed Results",
            Self::HighSuccessRate => "High Success Rate",
            Self::LowRating => "Low Ratings",
            Self::HighlyRated => "Highly Rated",
            Self::MajorSubstitutions => "Major Substitutions",
            Self::MinimalChanges => "Minimal Changes",
            Self::ComplexModifications => "Complex Modifications",
            Self::WorseThanParent => "Worse Than Original",
            Self::BetterThanParent => "Better Than Original",
            Self::CrowdFavorite => "Crowd Favorite",
            Self::PhotoVerified => "Photo Verified",
        }
    }

    /// Icon name
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::NoCookTrials | Self::FewCookTrials => "help-circle",
            Self::WellTested | Self::HighSuccessRate => "check-circle",
            Self::LowSuccessRate | Self::ModerateSuccessRate => "alert-triangle",
            Self::LowRating => "thumbs-down",
            Self::HighlyRated => "star",
            Self::MajorSubstitutions => "shuffle",
            Self::MinimalChanges => "feather",
            Self::ComplexModifications => "layers",
            Self::WorseThanParent => "trending-down",
            Self::BetterThanParent => "trending-up",
            Self::CrowdFavorite => "heart",
            Self::PhotoVerified => "camera",
        }
    }
}

/// A single contribution to the prediction
///
/// Risk factors carry a positive severity, positive factors a negative one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    /// Identifier
    pub id: FactorId,
    /// Display title
    pub title: String,
    /// Explanation with the observed numbers
    pub description: String,
    /// Icon name
    pub icon: String,
    /// Signed weight
    pub severity: i32,
}

impl Factor {
    pub(crate) fn new(id: FactorId, description: impl Into<String>, severity: i32) -> Self {
        Self {
            id,
            title: id.title().to_string(),
            description: description.into(),
            icon: id.icon().to_string(),
            severity,
        }
    }
}
