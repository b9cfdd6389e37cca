//! Forkline changelog
//!
//! Structural diff between a fork and its parent:
//! - Ingredients added/removed/modified (name-keyed)
//! - Steps added/removed/modified (positional by default)
//! - Metadata differences
//! - A deterministic one-line summary
//!
//! Diffs are pure; [`ChangelogCache`] memoizes them per revision pair.

#![warn(unreachable_pub)]

pub mod cache;
pub mod changelog;
pub mod differ;

pub use cache::{CacheStats, ChangelogCache, ChangelogKey};
pub use changelog::{
    summarize, Changelog, IngredientChange, MetadataChange, MetadataField, MINOR_ADJUSTMENTS,
};
pub use differ::{ChangelogDiffer, StepDiffMode};
