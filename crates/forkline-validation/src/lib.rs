//! Forkline validation
//!
//! Turns a recipe's cook trials into aggregate stats, badges and, for forks,
//! a comparison against the parent recipe.

#![warn(unreachable_pub)]

pub mod badges;
pub mod comparison;
pub mod stats;

pub use badges::{evaluate, BadgeKind, ValidationBadge};
pub use comparison::{compare, ComparisonVerdict, ParentComparison};
pub use stats::{aggregate, percent, round1, RatingDistribution, ValidationStats};

use forkline_model::{CookTrial, ValidationThresholds};
use serde::{Deserialize, Serialize};

/// Stats, badges and optional parent comparison for one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Aggregate stats
    pub stats: ValidationStats,
    /// Earned badges plus verified progress
    pub badges: Vec<ValidationBadge>,
    /// Present when parent trials were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compared_to_parent: Option<ParentComparison>,
}

/// Aggregator bound to a set of thresholds
#[derive(Debug, Clone, Default)]
pub struct ValidationAggregator {
    thresholds: ValidationThresholds,
}

impl ValidationAggregator {
    /// Create aggregator
    #[inline]
    #[must_use]
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds in use
    #[inline]
    #[must_use]
    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    /// Aggregate trials
    #[must_use]
    pub fn aggregate(&self, trials: &[CookTrial]) -> ValidationStats {
        stats::aggregate(trials, &self.thresholds)
    }

    /// Badges for already-aggregated stats
    #[must_use]
    pub fn badges(&self, stats: &ValidationStats) -> Vec<ValidationBadge> {
        badges::evaluate(stats, &self.thresholds)
    }

    /// Compare two sets of stats
    #[must_use]
    pub fn compare(&self, fork: &ValidationStats, parent: &ValidationStats) -> ParentComparison {
        comparison::compare(fork, parent, &self.thresholds)
    }

    /// Full report; `parent_trials` is `None` for root recipes
    #[must_use]
    pub fn report(&self, trials: &[CookTrial], parent_trials: Option<&[CookTrial]>) -> ValidationReport {
        let stats = self.aggregate(trials);
        let badges = self.badges(&stats);
        let compared_to_parent = parent_trials.map(|pt| self.compare(&stats, &self.aggregate(pt)));
        ValidationReport {
            stats,
            badges,
            compared_to_parent,
        }
    }
}
