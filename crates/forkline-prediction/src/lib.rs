//! Forkline prediction
//!
//! Rule-based outcome prediction for recipe forks and profile-driven
//! suggestion ranking.

#![warn(unreachable_pub)]

pub mod factors;
pub mod predictor;
pub mod ranker;

pub use factors::{Factor, FactorId};
pub use predictor::{confidence_for, OutcomePredictor, Prediction, RiskLevel, Verdict};
pub use ranker::{Suggestion, SuggestionRanker, DEFAULT_REASON};
