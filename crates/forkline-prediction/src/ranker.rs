//! Personalized fork suggestions

use forkline_model::{FlavorProfile, ForkTag, RankingWeights, Recipe, RecipeId};
use serde::{Deserialize, Serialize};

/// Reason used when nothing else applies
pub const DEFAULT_REASON: &str = "Alternative version";

/// A ranked fork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Fork id
    pub id: RecipeId,
    /// Fork title
    pub title: String,
    /// Fork tags as stored
    pub fork_tags: Vec<String>,
    /// Votes
    pub vote_count: u32,
    /// Score in `0..=100`
    pub score: u32,
    /// Why it was suggested; never empty
    pub reasons: Vec<String>,
}

/// Scores forks against a flavor profile
#[derive(Debug, Clone, Default)]
pub struct SuggestionRanker {
    weights: RankingWeights,
}

#[derive(Default)]
struct Scored {
    score: i32,
    reasons: Vec<String>,
}

impl Scored {
    fn reward(&mut self, points: i32, reason: impl Into<String>) {
        self.score += points;
        self.reasons.push(reason.into());
    }
}

impl SuggestionRanker {
    /// Create ranker
    #[inline]
    #[must_use]
    pub fn new(weights: RankingWeights) -> Self {
        Self { weights }
    }

    /// Score every fork and return the best `top_n`
    ///
    /// Ties keep the input order.
    #[must_use]
    pub fn rank(&self, forks: &[Recipe], profile: Option<&FlavorProfile>) -> Vec<Suggestion> {
        let mut ranked: Vec<Suggestion> = forks.iter().map(|fork| self.score(fork, profile)).collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.weights.top_n);
        ranked
    }

    /// Score a single fork
    #[must_use]
    pub fn score(&self, fork: &Recipe, profile: Option<&FlavorProfile>) -> Suggestion {
        let w = &self.weights;
        let tags: Vec<ForkTag> = fork.fork_tags.iter().filter_map(|t| ForkTag::parse_lenient(t)).collect();
        let has = |tag: ForkTag| tags.contains(&tag);
        let mut s = Scored {
            score: w.base_score,
            ..Scored::default()
        };

        if let Some(profile) = profile {
            let heat = profile.heat_preference;
            if heat >= w.high_preference {
                if has(ForkTag::Spicier) {
                    s.reward(w.heat_weight, "Matches your love of heat");
                }
                if has(ForkTag::Milder) {
                    s.score -= w.heat_weight;
                }
            } else if heat <= w.low_preference {
                if has(ForkTag::Milder) {
                    s.reward(w.heat_weight, "Milder, the way you like it");
                }
                if has(ForkTag::Spicier) {
                    s.score -= w.heat_weight;
                }
            }

            let complexity = profile.preferred_complexity;
            let easier = has(ForkTag::Simpler) || has(ForkTag::Quicker);
            if complexity <= w.low_preference {
                if easier {
                    s.reward(w.complexity_weight, "Simpler to make");
                }
                if has(ForkTag::MoreComplex) {
                    s.score -= w.complexity_weight;
                }
            } else if complexity >= w.high_preference {
                if has(ForkTag::MoreComplex) {
                    s.reward(w.complexity_weight, "A more ambitious take");
                }
                if easier {
                    s.score -= w.complexity_weight;
                }
            }
        }

        if fork.vote_count >= w.popular_votes {
            s.reward(w.popular_bonus, "Popular with the community");
        } else if fork.vote_count >= w.notable_votes {
            s.reward(w.notable_bonus, "Well liked by cooks");
        }

        for tag in tags.iter().filter(|t| t.is_health()) {
            let restricted = profile.is_some_and(|p| {
                p.dietary_restrictions
                    .iter()
                    .any(|r| ForkTag::parse_lenient(r) == Some(*tag))
            });
            if restricted {
                s.reasons.push(format!("Fits your {} diet", tag.label()));
            } else {
                s.reasons.push(format!("{} option", tag.label()));
            }
        }

        if s.reasons.is_empty() {
            s.reasons.push(DEFAULT_REASON.to_string());
        }

        Suggestion {
            id: fork.id,
            title: fork.title.clone(),
            fork_tags: fork.fork_tags.clone(),
            vote_count: fork.vote_count,
            score: u32::try_from(s.score.clamp(0, 100)).unwrap_or_default(),
            reasons: s.reasons,
        }
    }
}
