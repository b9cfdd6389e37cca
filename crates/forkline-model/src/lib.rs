//! Forkline model
//!
//! Shared vocabulary for the fork engine:
//! - Recipe, cook-trial and flavor-profile entities
//! - Collaborator traits (recipe/trial/profile stores, notification sink)
//! - Engine configuration and error types
//! - An in-memory store used by the CLI and tests

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod memory;
pub mod profile;
pub mod recipe;
pub mod store;
pub mod tags;
pub mod trial;

pub use config::{
    CacheConfig, ConfigError, EngineConfig, FactorSeverities, PredictionConfig, RankingWeights,
    TraversalLimits, ValidationThresholds,
};
pub use error::{EngineError, EngineResult, EntityKind, StoreError};
pub use events::{ForkEvent, ForkEventKind};
pub use ids::{RecipeId, TrialId, UserId};
pub use memory::{InMemoryStore, Snapshot};
pub use profile::FlavorProfile;
pub use recipe::{ComponentSection, Difficulty, Ingredient, Recipe, RecipeMetadata, Step};
pub use store::{
    ChildOrder, ForkMetadataUpdate, NotificationSink, NullSink, ProfileStore, RecipeStore,
    TrialStore,
};
pub use tags::{ForkTag, UnknownForkTag};
pub use trial::{CookTrial, MAX_RATING, QUICK_EASY_TAG, SUCCESS_RATING, TIME_CONSUMING_TAG};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
