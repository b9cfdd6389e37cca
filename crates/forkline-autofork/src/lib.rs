//! Forkline auto-fork
//!
//! Declarative templates (vegan, gluten-free, air fryer, ...) applied to a
//! copy of a recipe's component tree to produce a derived fork payload.

#![warn(unreachable_pub)]

pub mod applier;
pub mod catalog;
pub mod error;
pub mod matcher;
pub mod quantity;
pub mod template;

pub use applier::{
    AutoForkApplier, AutoForkPreview, AutoForkResponse, AutoForkResult, ChangeKind, DerivedFork,
    ProposedChange,
};
pub use catalog::{builtin_templates, find_template};
pub use error::AutoForkError;
pub use matcher::IngredientMatcher;
pub use quantity::halve;
pub use template::{AutoForkTemplate, Modification};
