//! Forkline core
//!
//! [`ForkEngine`] ties the lineage walker, changelog differ, validation
//! aggregator, outcome predictor, suggestion ranker and auto-fork applier
//! to the recipe, trial and profile stores.
//!
//! # Example
//!
//! ```rust,ignore
//! use forkline_core::{ForkEngine, TreeRequest};
//! use forkline_model::{EngineConfig, InMemoryStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::from_snapshot(snapshot));
//! let engine = ForkEngine::from_store(EngineConfig::default(), store)?;
//! let genealogy = engine.genealogy(recipe_id, TreeRequest::default()).await?;
//! println!("{} forks in this family", genealogy.total_forks);
//! ```

#![warn(unreachable_pub)]

pub mod engine;
pub mod genealogy;
pub mod sink;

pub use engine::{normalize_tags, ForkEngine};
pub use genealogy::Genealogy;
pub use sink::TracingSink;

pub use forkline_lineage::TreeRequest;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
