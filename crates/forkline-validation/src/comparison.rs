//! Fork versus parent comparison

use crate::stats::{round1, ValidationStats};
use forkline_model::ValidationThresholds;
use serde::{Deserialize, Serialize};

/// Outcome of comparing a fork's trials with its parent's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonVerdict {
    /// Fork cooks noticeably better
    Better,
    /// Fork cooks noticeably worse
    Worse,
    /// No meaningful difference
    Similar,
    /// One side has too few trials
    InsufficientData,
}

/// Fork minus parent deltas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentComparison {
    /// Verdict
    pub verdict: ComparisonVerdict,
    /// Average rating delta, one decimal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_diff: Option<f64>,
    /// Success rate delta in percentage points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_rate_diff: Option<i32>,
    /// Trial count delta, always reported
    pub cook_count_diff: i64,
}

impl ParentComparison {
    /// Whether the fork outperformed its parent
    #[must_use]
    pub fn is_better(&self) -> bool {
        self.verdict == ComparisonVerdict::Better
    }

    /// Whether the fork underperformed its parent
    #[must_use]
    pub fn is_worse(&self) -> bool {
        self.verdict == ComparisonVerdict::Worse
    }
}

#[allow(clippy::cast_possible_wrap)]
fn signed(n: usize) -> i64 {
    n as i64
}

/// Compare fork stats against parent stats
#[must_use]
pub fn compare(
    fork: &ValidationStats,
    parent: &ValidationStats,
    thresholds: &ValidationThresholds,
) -> ParentComparison {
    let cook_count_diff = signed(fork.total_cooks) - signed(parent.total_cooks);
    let min = thresholds.comparison_min_trials;
    if fork.total_cooks < min || parent.total_cooks < min {
        return ParentComparison {
            verdict: ComparisonVerdict::InsufficientData,
            rating_diff: None,
            success_rate_diff: None,
            cook_count_diff,
        };
    }

    let rating_diff = round1(fork.average_rating - parent.average_rating);
    #[allow(clippy::cast_possible_wrap)]
    let success_rate_diff = fork.success_rate as i32 - parent.success_rate as i32;
    let delta = thresholds.comparison_rating_delta;
    let points = thresholds.comparison_success_delta;

    let verdict = if rating_diff > delta || success_rate_diff > points {
        ComparisonVerdict::Better
    } else if rating_diff < -delta || success_rate_diff < -points {
        ComparisonVerdict::Worse
    } else {
        ComparisonVerdict::Similar
    };

    ParentComparison {
        verdict,
        rating_diff: Some(rating_diff),
        success_rate_diff: Some(success_rate_diff),
        cook_count_diff,
    }
}
