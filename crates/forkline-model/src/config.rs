//! Engine configuration
//!
//! Every threshold, severity and weight the engine uses lives here so that
//! tuning is a config change, not a code change. `Default` reproduces the
//! shipped constants.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration loading/validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse failure
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parse failure
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse failure
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Extension not recognised
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Values parsed but are inconsistent
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tree traversal caps
    pub traversal: TraversalLimits,
    /// Aggregation and badge thresholds
    pub validation: ValidationThresholds,
    /// Risk scoring
    pub prediction: PredictionConfig,
    /// Smart-suggestion weights
    pub ranking: RankingWeights,
    /// Changelog cache
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With traversal limits
    #[inline]
    #[must_use]
    pub fn with_traversal(mut self, traversal: TraversalLimits) -> Self {
        self.traversal = traversal;
        self
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// With ranking weights
    #[inline]
    #[must_use]
    pub fn with_ranking(mut self, ranking: RankingWeights) -> Self {
        self.ranking = ranking;
        self
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Parse or validation failure
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML
    ///
    /// # Errors
    /// Parse or validation failure
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON
    ///
    /// # Errors
    /// Parse or validation failure
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, format chosen by extension
    ///
    /// # Errors
    /// I/O, unknown extension, parse or validation failure
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        tracing::debug!("Loading engine config from {}", path.display());

        match ext.as_str() {
            "toml" => Self::from_toml_str(&content),
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Reject inconsistent values
    ///
    /// # Errors
    /// First inconsistency found
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.traversal;
        if t.max_chain_length == 0 {
            return Err(invalid("traversal.max_chain_length", "must be at least 1"));
        }
        if t.max_children_per_node == 0 {
            return Err(invalid("traversal.max_children_per_node", "must be at least 1"));
        }
        if t.expansion_concurrency == 0 {
            return Err(invalid("traversal.expansion_concurrency", "must be at least 1"));
        }
        if t.default_depth > t.max_depth {
            return Err(invalid(
                "traversal.default_depth",
                format!("{} exceeds max_depth {}", t.default_depth, t.max_depth),
            ));
        }

        let p = &self.prediction;
        if p.medium_risk_score > p.high_risk_score {
            return Err(invalid(
                "prediction.medium_risk_score",
                "must not exceed high_risk_score",
            ));
        }
        if p.low_success_rate > p.moderate_success_rate
            || p.moderate_success_rate > p.high_success_rate
        {
            return Err(invalid(
                "prediction.success_rate",
                "thresholds must be ascending (low <= moderate <= high)",
            ));
        }
        if p.low_rating > p.high_rating {
            return Err(invalid("prediction.low_rating", "must not exceed high_rating"));
        }

        let r = &self.ranking;
        if r.low_preference > r.high_preference {
            return Err(invalid(
                "ranking.low_preference",
                "must not exceed high_preference",
            ));
        }
        if r.top_n == 0 {
            return Err(invalid("ranking.top_n", "must be at least 1"));
        }

        if self.validation.verified_successful_cooks == 0 {
            return Err(invalid(
                "validation.verified_successful_cooks",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Bounds on tree traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    /// Longest parent chain walked before truncating
    pub max_chain_length: usize,
    /// Children loaded per node
    pub max_children_per_node: usize,
    /// Depth used when the caller does not ask for one
    pub default_depth: usize,
    /// Largest depth a caller may ask for
    pub max_depth: usize,
    /// Sibling subtrees fetched concurrently
    pub expansion_concurrency: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_chain_length: 50,
            max_children_per_node: 20,
            default_depth: 3,
            max_depth: 10,
            expansion_concurrency: 8,
        }
    }
}

/// Aggregation, badge and parent-comparison thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Photos needed for photo verification
    pub photo_verification_count: usize,
    /// Successful cooks for the `verified` badge
    pub verified_successful_cooks: usize,
    /// `highly_rated`: minimum average
    pub highly_rated_average: f64,
    /// `highly_rated`: minimum cooks
    pub highly_rated_min_cooks: usize,
    /// `time_accurate`: minimum rate
    pub time_accurate_rate: u32,
    /// `time_accurate`: minimum timing reports
    pub time_accurate_min_reports: usize,
    /// `crowd_favorite`: minimum would-make-again rate
    pub crowd_favorite_rate: u32,
    /// `crowd_favorite`: minimum cooks
    pub crowd_favorite_min_cooks: usize,
    /// `quick_win`: minimum success rate
    pub quick_win_success_rate: u32,
    /// `quick_win`: minimum cooks
    pub quick_win_min_cooks: usize,
    /// `quick_win`: minimum average
    pub quick_win_average: f64,
    /// Trials needed on both sides before comparing to the parent
    pub comparison_min_trials: usize,
    /// Rating delta that counts as better/worse
    pub comparison_rating_delta: f64,
    /// Success-rate delta that counts as better/worse
    pub comparison_success_delta: i32,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            photo_verification_count: 3,
            verified_successful_cooks: 5,
            highly_rated_average: 3.5,
            highly_rated_min_cooks: 3,
            time_accurate_rate: 70,
            time_accurate_min_reports: 3,
            crowd_favorite_rate: 80,
            crowd_favorite_min_cooks: 5,
            quick_win_success_rate: 85,
            quick_win_min_cooks: 5,
            quick_win_average: 3.5,
            comparison_min_trials: 3,
            comparison_rating_delta: 0.3,
            comparison_success_delta: 10,
        }
    }
}

/// Signed severity per factor; risks positive, positives negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorSeverities {
    /// `no_cook_trials`
    pub no_cook_trials: i32,
    /// `few_cook_trials`
    pub few_cook_trials: i32,
    /// `well_tested`
    pub well_tested: i32,
    /// `low_success_rate`
    pub low_success_rate: i32,
    /// `moderate_success_rate`
    pub moderate_success_rate: i32,
    /// `high_success_rate`
    pub high_success_rate: i32,
    /// `low_rating`
    pub low_rating: i32,
    /// `highly_rated`
    pub highly_rated: i32,
    /// `major_substitutions`
    pub major_substitutions: i32,
    /// `minimal_changes`
    pub minimal_changes: i32,
    /// `complex_modifications`
    pub complex_modifications: i32,
    /// `worse_than_parent`
    pub worse_than_parent: i32,
    /// `better_than_parent`
    pub better_than_parent: i32,
    /// `crowd_favorite`
    pub crowd_favorite: i32,
    /// `photo_verified`
    pub photo_verified: i32,
}

impl Default for FactorSeverities {
    fn default() -> Self {
        Self {
            no_cook_trials: 4,
            few_cook_trials: 3,
            well_tested: -3,
            low_success_rate: 8,
            moderate_success_rate: 4,
            high_success_rate: -4,
            low_rating: 6,
            highly_rated: -3,
            major_substitutions: 4,
            minimal_changes: -2,
            complex_modifications: 3,
            worse_than_parent: 5,
            better_than_parent: -3,
            crowd_favorite: -2,
            photo_verified: -1,
        }
    }
}

/// Outcome-prediction rule thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Factor severities
    pub severities: FactorSeverities,
    /// Net score at or above which risk is high
    pub high_risk_score: i32,
    /// Net score at or above which risk is medium
    pub medium_risk_score: i32,
    /// Cooks needed before rate/rating rules run
    pub min_cooks_for_rates: usize,
    /// Cooks for `well_tested`
    pub well_tested_cooks: usize,
    /// Below this success rate: `low_success_rate`
    pub low_success_rate: u32,
    /// Below this (and not low): `moderate_success_rate`
    pub moderate_success_rate: u32,
    /// At or above: `high_success_rate`
    pub high_success_rate: u32,
    /// Below this average: `low_rating`
    pub low_rating: f64,
    /// At or above this average: `highly_rated`
    pub high_rating: f64,
    /// Ingredient changes for `major_substitutions`
    pub major_ingredient_changes: usize,
    /// Ingredient changes up to which `minimal_changes` applies
    pub minimal_ingredient_changes: usize,
    /// Step changes for `complex_modifications`
    pub complex_step_changes: usize,
    /// Would-make-again rate for `crowd_favorite`
    pub crowd_favorite_rate: u32,
    /// Would-make-again answers needed for `crowd_favorite`
    pub crowd_favorite_min_reports: usize,
    /// Photos for `photo_verified`
    pub photo_verified_count: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            severities: FactorSeverities::default(),
            high_risk_score: 10,
            medium_risk_score: 5,
            min_cooks_for_rates: 3,
            well_tested_cooks: 5,
            low_success_rate: 50,
            moderate_success_rate: 70,
            high_success_rate: 85,
            low_rating: 2.5,
            high_rating: 3.5,
            major_ingredient_changes: 5,
            minimal_ingredient_changes: 2,
            complex_step_changes: 5,
            crowd_favorite_rate: 80,
            crowd_favorite_min_reports: 3,
            photo_verified_count: 3,
        }
    }
}

/// Smart-suggestion scoring weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Starting score per fork
    pub base_score: i32,
    /// Heat-preference bonus/penalty
    pub heat_weight: i32,
    /// Complexity-preference bonus/penalty
    pub complexity_weight: i32,
    /// Preference at or above counts as "high"
    pub high_preference: f64,
    /// Preference at or below counts as "low"
    pub low_preference: f64,
    /// Votes for the popular tier
    pub popular_votes: u32,
    /// Bonus for the popular tier
    pub popular_bonus: i32,
    /// Votes for the notable tier
    pub notable_votes: u32,
    /// Bonus for the notable tier
    pub notable_bonus: i32,
    /// Suggestions returned
    pub top_n: usize,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            base_score: 50,
            heat_weight: 20,
            complexity_weight: 15,
            high_preference: 0.6,
            low_preference: 0.4,
            popular_votes: 5,
            popular_bonus: 15,
            notable_votes: 2,
            notable_bonus: 5,
            top_n: 5,
        }
    }
}

/// Changelog cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether changelogs are cached at all
    pub enabled: bool,
    /// Maximum cached changelogs
    pub changelog_capacity: u64,
    /// Entry lifetime in seconds
    pub changelog_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            changelog_capacity: 1024,
            changelog_ttl_secs: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [traversal]
            max_children_per_node = 5

            [prediction.severities]
            no_cook_trials = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.traversal.max_children_per_node, 5);
        assert_eq!(config.traversal.max_chain_length, 50);
        assert_eq!(config.prediction.severities.no_cook_trials, 2);
        assert_eq!(config.prediction.severities.low_rating, 6);
    }

    #[test]
    fn rejects_zero_fan_out() {
        let err = EngineConfig::from_toml_str("[traversal]\nmax_children_per_node = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "traversal.max_children_per_node", .. }));
    }

    #[test]
    fn rejects_inverted_risk_levels() {
        let yaml = "prediction:\n  high_risk_score: 3\n  medium_risk_score: 5\n";
        assert!(EngineConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn loads_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"ranking": {{"top_n": 3}}}}"#).unwrap();

        let config = EngineConfig::from_path(&path).unwrap();
        assert_eq!(config.ranking.top_n, 3);

        let bad = dir.path().join("engine.ini");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(
            EngineConfig::from_path(&bad),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
