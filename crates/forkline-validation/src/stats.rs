//! Trial aggregation

use chrono::{DateTime, Utc};
use forkline_model::{CookTrial, ValidationThresholds, QUICK_EASY_TAG, TIME_CONSUMING_TAG};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Count of trials per rating value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// Ratings of 1
    pub one: usize,
    /// Ratings of 2
    pub two: usize,
    /// Ratings of 3
    pub three: usize,
    /// Ratings of 4
    pub four: usize,
}

impl RatingDistribution {
    fn record(&mut self, rating: u8) {
        match rating {
            1 => self.one += 1,
            2 => self.two += 1,
            3 => self.three += 1,
            4 => self.four += 1,
            _ => {}
        }
    }
}

/// Aggregate over one recipe's trials
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
    /// All trials
    pub total_cooks: usize,
    /// Trials rated 3 or 4
    pub successful_cooks: usize,
    /// Percent successful, 0 when there are no trials
    pub success_rate: u32,
    /// Mean rating, one decimal
    pub average_rating: f64,
    /// Ratings per value
    pub rating_distribution: RatingDistribution,
    /// Trials that answered the would-make-again question
    pub would_make_again_reports: usize,
    /// Percent of answers that were yes
    pub would_make_again_rate: u32,
    /// Trials tagged `quick_easy` or `time_consuming`
    pub time_accuracy_reports: usize,
    /// Percent of timing reports that were `quick_easy`
    pub time_accuracy_rate: u32,
    /// Trials with a photo
    pub photos_count: usize,
    /// Enough photos to count as verified
    pub has_photo_verification: bool,
    /// Most recent cook
    pub last_cooked_at: Option<DateTime<Utc>>,
}

/// Percentage rounded to the nearest whole number; 0 for an empty denominator
#[must_use]
pub fn percent(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = (100.0 * numerator as f64 / denominator as f64).round() as u32;
    rounded
}

/// Round to one decimal place
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reduce trials into [`ValidationStats`]
///
/// Trials rated off the 1-4 scale are skipped entirely.
#[must_use]
pub fn aggregate(trials: &[CookTrial], thresholds: &ValidationThresholds) -> ValidationStats {
    let trials: Vec<&CookTrial> = trials
        .iter()
        .filter(|t| {
            let valid = t.has_valid_rating();
            if !valid {
                warn!("Skipping trial {} with out-of-range rating {}", t.id, t.rating);
            }
            valid
        })
        .collect();
    let total = trials.len();
    if total == 0 {
        return ValidationStats::default();
    }

    let mut stats = ValidationStats {
        total_cooks: total,
        ..ValidationStats::default()
    };
    let mut rating_sum: u64 = 0;
    let mut would_make_again_yes = 0;
    let mut quick = 0;

    for trial in &trials {
        rating_sum += u64::from(trial.rating);
        stats.rating_distribution.record(trial.rating);

        if trial.is_successful() {
            stats.successful_cooks += 1;
        }
        if let Some(again) = trial.would_make_again {
            stats.would_make_again_reports += 1;
            if again {
                would_make_again_yes += 1;
            }
        }

        let is_quick = trial.has_tag(QUICK_EASY_TAG);
        if is_quick || trial.has_tag(TIME_CONSUMING_TAG) {
            stats.time_accuracy_reports += 1;
            if is_quick {
                quick += 1;
            }
        }

        if trial.has_photo() {
            stats.photos_count += 1;
        }
        stats.last_cooked_at = stats.last_cooked_at.max(Some(trial.cooked_at));
    }

    stats.success_rate = percent(stats.successful_cooks, total);
    #[allow(clippy::cast_precision_loss)]
    let mean = rating_sum as f64 / total as f64;
    stats.average_rating = round1(mean);
    stats.would_make_again_rate = percent(would_make_again_yes, stats.would_make_again_reports);
    stats.time_accuracy_rate = percent(quick, stats.time_accuracy_reports);
    stats.has_photo_verification = stats.photos_count >= thresholds.photo_verification_count;
    stats
}
