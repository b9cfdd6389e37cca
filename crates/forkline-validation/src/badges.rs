//! Validation badges

use crate::stats::{percent, ValidationStats};
use chrono::{DateTime, Utc};
use forkline_model::ValidationThresholds;
use serde::{Deserialize, Serialize};

/// Kind of validation badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    /// Enough successful cooks
    Verified,
    /// High average rating
    HighlyRated,
    /// Timing matches what cooks report
    TimeAccurate,
    /// Cooks want to make it again
    CrowdFavorite,
    /// Photo evidence from several cooks
    PhotoVerified,
    /// Reliable and well rated
    QuickWin,
}

impl BadgeKind {
    /// Every badge, in display order
    pub const ALL: [Self; 6] = [
        Self::Verified,
        Self::HighlyRated,
        Self::TimeAccurate,
        Self::CrowdFavorite,
        Self::PhotoVerified,
        Self::QuickWin,
    ];

    /// Short display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::HighlyRated => "Highly Rated",
            Self::TimeAccurate => "Time Accurate",
            Self::CrowdFavorite => "Crowd Favorite",
            Self::PhotoVerified => "Photo Verified",
            Self::QuickWin => "Quick Win",
        }
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Verified => "Successfully cooked by at least five people",
            Self::HighlyRated => "Averages 3.5 or better across cooks",
            Self::TimeAccurate => "Cooks agree the listed times hold up",
            Self::CrowdFavorite => "Most cooks would make it again",
            Self::PhotoVerified => "Backed by photos from real cooks",
            Self::QuickWin => "Reliable results with great ratings",
        }
    }

    /// Icon name
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Verified => "check-circle",
            Self::HighlyRated => "star",
            Self::TimeAccurate => "clock",
            Self::CrowdFavorite => "heart",
            Self::PhotoVerified => "camera",
            Self::QuickWin => "zap",
        }
    }
}

/// A badge, earned or in progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationBadge {
    /// Kind
    pub kind: BadgeKind,
    /// Display label
    pub label: String,
    /// Description
    pub description: String,
    /// Icon name
    pub icon: String,
    /// Whether the badge is earned
    pub earned: bool,
    /// Most recent cook at the time the badge was computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_at: Option<DateTime<Utc>>,
    /// Percent towards the threshold, only for unearned badges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u32>,
    /// Count needed to earn the badge, only for unearned badges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<usize>,
}

impl ValidationBadge {
    fn earned(kind: BadgeKind, at: Option<DateTime<Utc>>) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            description: kind.description().to_string(),
            icon: kind.icon().to_string(),
            earned: true,
            earned_at: at,
            progress: None,
            threshold: None,
        }
    }

    fn in_progress(kind: BadgeKind, progress: u32, threshold: usize) -> Self {
        Self {
            earned: false,
            earned_at: None,
            progress: Some(progress.min(100)),
            threshold: Some(threshold),
            ..Self::earned(kind, None)
        }
    }
}

fn is_earned(kind: BadgeKind, stats: &ValidationStats, t: &ValidationThresholds) -> bool {
    match kind {
        BadgeKind::Verified => stats.successful_cooks >= t.verified_successful_cooks,
        BadgeKind::HighlyRated => {
            stats.average_rating >= t.highly_rated_average && stats.total_cooks >= t.highly_rated_min_cooks
        }
        BadgeKind::TimeAccurate => {
            stats.time_accuracy_rate >= t.time_accurate_rate
                && stats.time_accuracy_reports >= t.time_accurate_min_reports
        }
        BadgeKind::CrowdFavorite => {
            stats.would_make_again_rate >= t.crowd_favorite_rate
                && stats.total_cooks >= t.crowd_favorite_min_cooks
        }
        BadgeKind::PhotoVerified => stats.photos_count >= t.photo_verification_count,
        BadgeKind::QuickWin => {
            stats.success_rate >= t.quick_win_success_rate
                && stats.total_cooks >= t.quick_win_min_cooks
                && stats.average_rating >= t.quick_win_average
        }
    }
}

/// Evaluate every badge independently against the stats
///
/// Earned badges are always listed. Of the unearned ones only `verified`
/// is listed, carrying its progress.
#[must_use]
pub fn evaluate(stats: &ValidationStats, thresholds: &ValidationThresholds) -> Vec<ValidationBadge> {
    BadgeKind::ALL
        .into_iter()
        .filter_map(|kind| {
            if is_earned(kind, stats, thresholds) {
                Some(ValidationBadge::earned(kind, stats.last_cooked_at))
            } else if kind == BadgeKind::Verified {
                let needed = thresholds.verified_successful_cooks;
                Some(ValidationBadge::in_progress(
                    kind,
                    percent(stats.successful_cooks, needed),
                    needed,
                ))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use forkline_model::RecipeId;
    use forkline_test_utils::{trials_with_ratings, TrialBuilder};

    fn badges_for(ratings: &[u8]) -> Vec<ValidationBadge> {
        let t = ValidationThresholds::default();
        evaluate(&aggregate(&trials_with_ratings(RecipeId::from_u128(1), ratings), &t), &t)
    }

    fn find(badges: &[ValidationBadge], kind: BadgeKind) -> Option<&ValidationBadge> {
        badges.iter().find(|b| b.kind == kind)
    }

    #[test]
    fn no_trials_shows_verified_progress_only() {
        let badges = badges_for(&[]);
        assert_eq!(badges.len(), 1);
        let verified = &badges[0];
        assert_eq!(verified.kind, BadgeKind::Verified);
        assert!(!verified.earned);
        assert_eq!(verified.progress, Some(0));
        assert_eq!(verified.threshold, Some(5));
    }

    #[test]
    fn verified_progress_then_earned() {
        let four = badges_for(&[4, 4, 4, 4]);
        let verified = find(&four, BadgeKind::Verified).unwrap();
        assert!(!verified.earned);
        assert_eq!(verified.progress, Some(80));

        let five = badges_for(&[4, 4, 4, 4, 4]);
        let verified = find(&five, BadgeKind::Verified).unwrap();
        assert!(verified.earned);
        assert!(verified.progress.is_none());
        assert!(verified.earned_at.is_some());
    }

    #[test]
    fn highly_rated_needs_three_cooks() {
        assert!(find(&badges_for(&[4, 4]), BadgeKind::HighlyRated).is_none());
        assert!(find(&badges_for(&[4, 4, 3]), BadgeKind::HighlyRated).is_some());
        assert!(find(&badges_for(&[3, 3, 3]), BadgeKind::HighlyRated).is_none());
    }

    #[test]
    fn quick_win_requires_all_three_conditions() {
        assert!(find(&badges_for(&[4, 4, 4, 4, 4]), BadgeKind::QuickWin).is_some());
        // 80% success misses the 85% bar
        assert!(find(&badges_for(&[4, 4, 4, 4, 1]), BadgeKind::QuickWin).is_none());
        assert!(find(&badges_for(&[3, 3, 3, 3, 3]), BadgeKind::QuickWin).is_none());
    }

    #[test]
    fn crowd_favorite_and_time_accurate() {
        let recipe = RecipeId::from_u128(1);
        let trials: Vec<_> = (0..5)
            .map(|i| {
                TrialBuilder::new(recipe, 4)
                    .by(i)
                    .again(i != 0)
                    .quick()
                    .build()
            })
            .collect();
        let t = ValidationThresholds::default();
        let badges = evaluate(&aggregate(&trials, &t), &t);
        assert!(find(&badges, BadgeKind::CrowdFavorite).is_some());
        assert!(find(&badges, BadgeKind::TimeAccurate).is_some());
        assert!(find(&badges, BadgeKind::PhotoVerified).is_none());
    }

    #[test]
    fn badge_metadata_is_filled() {
        for kind in BadgeKind::ALL {
            assert!(!kind.label().is_empty());
            assert!(!kind.description().is_empty());
            assert!(!kind.icon().is_empty());
        }
    }
}
