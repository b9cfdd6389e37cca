//! Outcome predictor
//!
//! Rule table over trial stats, the fork's changelog and the parent
//! comparison. Each rule contributes a [`Factor`]; the signed sum of their
//! severities decides the risk level.

use crate::factors::{Factor, FactorId};
use forkline_changelog::Changelog;
use forkline_model::{CookTrial, PredictionConfig, ValidationThresholds};
use forkline_validation::{ComparisonVerdict, ParentComparison, ValidationAggregator, ValidationStats};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Likely to work
    Low,
    /// Some risk
    Medium,
    /// Likely to disappoint
    High,
}

/// Recommendation shown to the cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Go ahead
    Proceed,
    /// Go ahead, watching the flagged risks
    ProceedWithCaution,
    /// Try something else
    NotRecommended,
}

impl Verdict {
    /// Fixed message for the verdict
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Proceed => "This fork has a solid track record. Go for it!",
            Self::ProceedWithCaution => {
                "This fork could turn out well, but review the risk factors before cooking."
            }
            Self::NotRecommended => {
                "This fork has significant risks. Consider the original recipe or a better-tested fork."
            }
        }
    }
}

/// Prediction for one recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Risk bucket
    pub risk_level: RiskLevel,
    /// Risk severities minus positive magnitudes
    pub net_score: i32,
    /// Confidence percent, from the trial count
    pub confidence: u32,
    /// Recommendation
    pub verdict: Verdict,
    /// Message for the verdict
    pub message: String,
    /// Factors raising risk
    pub risk_factors: Vec<Factor>,
    /// Factors lowering risk
    pub positive_factors: Vec<Factor>,
    /// Stats the prediction was computed from
    pub stats: ValidationStats,
    /// Parent comparison when parent trials were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compared_to_parent: Option<ParentComparison>,
}

impl Prediction {
    /// Whether a factor fired
    #[must_use]
    pub fn has_factor(&self, id: FactorId) -> bool {
        self.risk_factors
            .iter()
            .chain(&self.positive_factors)
            .any(|f| f.id == id)
    }
}

/// Confidence step function over the number of trials
#[must_use]
pub const fn confidence_for(total_cooks: usize) -> u32 {
    match total_cooks {
        0 => 10,
        1..=2 => 30,
        3..=4 => 50,
        5..=9 => 70,
        _ => 90,
    }
}

/// Rule-based predictor
#[derive(Debug, Clone, Default)]
pub struct OutcomePredictor {
    config: PredictionConfig,
    aggregator: ValidationAggregator,
}

impl OutcomePredictor {
    /// Create predictor
    #[must_use]
    pub fn new(config: PredictionConfig, thresholds: ValidationThresholds) -> Self {
        Self {
            config,
            aggregator: ValidationAggregator::new(thresholds),
        }
    }

    /// Prediction settings in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    /// Predict the outcome of cooking a recipe
    ///
    /// `changelog` is `None` for root recipes; `parent_trials` is `None`
    /// when there is no parent to compare against.
    #[must_use]
    pub fn predict(
        &self,
        trials: &[CookTrial],
        changelog: Option<&Changelog>,
        parent_trials: Option<&[CookTrial]>,
    ) -> Prediction {
        let stats = self.aggregator.aggregate(trials);
        let compared_to_parent =
            parent_trials.map(|pt| self.aggregator.compare(&stats, &self.aggregator.aggregate(pt)));

        let mut risks = Vec::new();
        let mut positives = Vec::new();
        self.trial_count_factors(&stats, &mut risks, &mut positives);
        self.success_factors(&stats, &mut risks, &mut positives);
        self.rating_factors(&stats, &mut risks, &mut positives);
        if let Some(changelog) = changelog {
            self.changelog_factors(changelog, &mut risks, &mut positives);
        }
        if let Some(cmp) = &compared_to_parent {
            self.parent_factors(cmp, &mut risks, &mut positives);
        }
        self.community_factors(&stats, &mut positives);

        let net_score = risks.iter().map(|f| f.severity).sum::<i32>()
            - positives.iter().map(|f| f.severity.abs()).sum::<i32>();
        let risk_level = if net_score >= self.config.high_risk_score {
            RiskLevel::High
        } else if net_score >= self.config.medium_risk_score {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };
        let verdict = if risk_level == RiskLevel::High {
            Verdict::NotRecommended
        } else if risk_level == RiskLevel::Medium || stats.total_cooks < self.config.min_cooks_for_rates {
            Verdict::ProceedWithCaution
        } else {
            Verdict::Proceed
        };

        debug!(
            "Prediction: net={} level={:?} risks={} positives={}",
            net_score,
            risk_level,
            risks.len(),
            positives.len()
        );

        Prediction {
            risk_level,
            net_score,
            confidence: confidence_for(stats.total_cooks),
            verdict,
            message: verdict.message().to_string(),
            risk_factors: risks,
            positive_factors: positives,
            stats,
            compared_to_parent,
        }
    }

    fn trial_count_factors(&self, stats: &ValidationStats, risks: &mut Vec<Factor>, positives: &mut Vec<Factor>) {
        let sev = &self.config.severities;
        match stats.total_cooks {
            0 => risks.push(Factor::new(
                FactorId::NoCookTrials,
                "Nobody has cooked this version yet",
                sev.no_cook_trials,
            )),
            n if n < self.config.min_cooks_for_rates => risks.push(Factor::new(
                FactorId::FewCookTrials,
                format!("Only {n} cook{} so far", if n == 1 { "" } else { "s" }),
                sev.few_cook_trials,
            )),
            n if n >= self.config.well_tested_cooks => positives.push(Factor::new(
                FactorId::WellTested,
                format!("Cooked {n} times by the community"),
                sev.well_tested,
            )),
            _ => {}
        }
    }

    fn success_factors(&self, stats: &ValidationStats, risks: &mut Vec<Factor>, positives: &mut Vec<Factor>) {
        if stats.total_cooks < self.config.min_cooks_for_rates {
            return;
        }
        let sev = &self.config.severities;
        let rate = stats.success_rate;
        if rate < self.config.low_success_rate {
            risks.push(Factor::new(
                FactorId::LowSuccessRate,
                format!("Only {rate}% of cooks succeeded"),
                sev.low_success_rate,
            ));
        } else if rate < self.config.moderate_success_rate {
            risks.push(Factor::new(
                FactorId::ModerateSuccessRate,
                format!("{rate}% of cooks succeeded"),
                sev.moderate_success_rate,
            ));
        } else if rate >= self.config.high_success_rate {
            positives.push(Factor::new(
                FactorId::HighSuccessRate,
                format!("{rate}% of cooks succeeded"),
                sev.high_success_rate,
            ));
        }
    }

    fn rating_factors(&self, stats: &ValidationStats, risks: &mut Vec<Factor>, positives: &mut Vec<Factor>) {
        if stats.total_cooks < self.config.min_cooks_for_rates {
            return;
        }
        let sev = &self.config.severities;
        let avg = stats.average_rating;
        if avg < self.config.low_rating {
            risks.push(Factor::new(
                FactorId::LowRating,
                format!("Average rating is {avg:.1} out of 4"),
                sev.low_rating,
            ));
        } else if avg >= self.config.high_rating {
            positives.push(Factor::new(
                FactorId::HighlyRated,
                format!("Average rating is {avg:.1} out of 4"),
                sev.highly_rated,
            ));
        }
    }

    fn changelog_factors(&self, changelog: &Changelog, risks: &mut Vec<Factor>, positives: &mut Vec<Factor>) {
        let sev = &self.config.severities;
        let ingredients = changelog.ingredient_changes();
        if ingredients >= self.config.major_ingredient_changes {
            risks.push(Factor::new(
                FactorId::MajorSubstitutions,
                format!("{ingredients} ingredient changes from the original"),
                sev.major_substitutions,
            ));
        } else if !changelog.is_empty() && ingredients <= self.config.minimal_ingredient_changes {
            positives.push(Factor::new(
                FactorId::MinimalChanges,
                "Stays close to the original recipe",
                sev.minimal_changes,
            ));
        }

        let steps = changelog.step_changes();
        if steps >= self.config.complex_step_changes {
            risks.push(Factor::new(
                FactorId::ComplexModifications,
                format!("{steps} step changes from the original"),
                sev.complex_modifications,
            ));
        }
    }

    fn parent_factors(&self, cmp: &ParentComparison, risks: &mut Vec<Factor>, positives: &mut Vec<Factor>) {
        let sev = &self.config.severities;
        match cmp.verdict {
            ComparisonVerdict::Worse => risks.push(Factor::new(
                FactorId::WorseThanParent,
                "Cooks report worse results than the original",
                sev.worse_than_parent,
            )),
            ComparisonVerdict::Better => positives.push(Factor::new(
                FactorId::BetterThanParent,
                "Cooks report better results than the original",
                sev.better_than_parent,
            )),
            ComparisonVerdict::Similar | ComparisonVerdict::InsufficientData => {}
        }
    }

    fn community_factors(&self, stats: &ValidationStats, positives: &mut Vec<Factor>) {
        let sev = &self.config.severities;
        if stats.would_make_again_reports >= self.config.crowd_favorite_min_reports
            && stats.would_make_again_rate >= self.config.crowd_favorite_rate
        {
            positives.push(Factor::new(
                FactorId::CrowdFavorite,
                format!("{}% would make it again", stats.would_make_again_rate),
                sev.crowd_favorite,
            ));
        }
        if stats.photos_count >= self.config.photo_verified_count {
            positives.push(Factor::new(
                FactorId::PhotoVerified,
                format!("{} cooks shared photos", stats.photos_count),
                sev.photo_verified,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_model::RecipeId;
    use forkline_test_utils::{trials_with_ratings, TrialBuilder};
    use pretty_assertions::assert_eq;

    fn recipe() -> RecipeId {
        RecipeId::from_u128(1)
    }

    fn changelog(added: usize, steps_modified: usize) -> Changelog {
        Changelog {
            ingredients_added: (0..added)
                .map(|i| forkline_model::Ingredient::new(format!("extra {i}")))
                .collect(),
            steps_modified,
            ..Changelog::default()
        }
    }

    #[test]
    fn untested_fork_with_no_changes() {
        let p = OutcomePredictor::default().predict(&[], Some(&Changelog::default()), None);
        assert_eq!(p.risk_factors.len(), 1);
        assert_eq!(p.risk_factors[0].id, FactorId::NoCookTrials);
        assert!(p.positive_factors.is_empty());
        assert_eq!(p.net_score, 4);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.confidence, 10);
        assert_eq!(p.verdict, Verdict::ProceedWithCaution);
        assert_eq!(p.message, Verdict::ProceedWithCaution.message());
    }

    #[test]
    fn few_trials_is_a_risk() {
        let p = OutcomePredictor::default().predict(&trials_with_ratings(recipe(), &[4, 4]), None, None);
        assert!(p.has_factor(FactorId::FewCookTrials));
        assert!(!p.has_factor(FactorId::HighlyRated));
        assert_eq!(p.confidence, 30);
        assert_eq!(p.verdict, Verdict::ProceedWithCaution);
    }

    #[test]
    fn well_tested_fork_proceeds() {
        let p = OutcomePredictor::default().predict(
            &trials_with_ratings(recipe(), &[4, 4, 4, 4, 4, 3]),
            Some(&changelog(1, 0)),
            None,
        );
        assert!(p.has_factor(FactorId::WellTested));
        assert!(p.has_factor(FactorId::HighSuccessRate));
        assert!(p.has_factor(FactorId::HighlyRated));
        assert!(p.has_factor(FactorId::MinimalChanges));
        assert!(p.risk_factors.is_empty());
        assert_eq!(p.net_score, -12);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.confidence, 70);
        assert_eq!(p.verdict, Verdict::Proceed);
    }

    #[test]
    fn failing_heavily_modified_fork_is_not_recommended() {
        let p = OutcomePredictor::default().predict(
            &trials_with_ratings(recipe(), &[1, 2, 1, 2]),
            Some(&changelog(6, 5)),
            None,
        );
        // low success 8 + low rating 6 + substitutions 4 + steps 3
        assert_eq!(p.net_score, 21);
        assert_eq!(p.risk_level, RiskLevel::High);
        assert_eq!(p.verdict, Verdict::NotRecommended);
        assert!(!p.has_factor(FactorId::MinimalChanges));
    }

    #[test]
    fn moderate_success_alone_stays_low() {
        // 2 of 3 succeed: 67%, average 2.7
        let p = OutcomePredictor::default().predict(&trials_with_ratings(recipe(), &[3, 3, 2]), None, None);
        assert!(p.has_factor(FactorId::ModerateSuccessRate));
        assert_eq!(p.net_score, 4);
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.verdict, Verdict::Proceed);
        assert_eq!(p.confidence, 50);
    }

    #[test]
    fn parent_comparison_feeds_factors() {
        let parent = trials_with_ratings(RecipeId::from_u128(2), &[4, 4, 4, 4]);
        let fork = trials_with_ratings(recipe(), &[2, 1, 2]);
        let p = OutcomePredictor::default().predict(&fork, None, Some(&parent));
        assert!(p.has_factor(FactorId::WorseThanParent));
        assert_eq!(
            p.compared_to_parent.map(|c| c.verdict),
            Some(ComparisonVerdict::Worse)
        );
    }

    #[test]
    fn crowd_and_photo_positives() {
        let trials: Vec<_> = (0..3)
            .map(|i| TrialBuilder::new(recipe(), 4).by(i).again(true).photo().build())
            .collect();
        let p = OutcomePredictor::default().predict(&trials, None, None);
        assert!(p.has_factor(FactorId::CrowdFavorite));
        assert!(p.has_factor(FactorId::PhotoVerified));
    }

    #[test]
    fn prediction_serializes_in_snake_case() {
        let p = OutcomePredictor::default().predict(&[], None, None);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["risk_level"], "low");
        assert_eq!(json["verdict"], "proceed_with_caution");
        assert_eq!(json["risk_factors"][0]["id"], "no_cook_trials");
        assert!(json.get("compared_to_parent").is_none());
    }

    #[test]
    fn confidence_steps() {
        let expected = [(0, 10), (1, 30), (2, 30), (3, 50), (4, 50), (5, 70), (9, 70), (10, 90), (250, 90)];
        for (n, c) in expected {
            assert_eq!(confidence_for(n), c, "cooks={n}");
        }
    }
}
