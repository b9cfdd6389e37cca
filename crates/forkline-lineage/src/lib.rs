//! Forkline lineage
//!
//! Bounded traversal over the recipe fork graph:
//! - Ancestor chains (oldest first)
//! - Descendant trees with depth and fan-out caps
//! - Root resolution and root-to-node paths
//!
//! # Example
//!
//! ```rust,ignore
//! use forkline_lineage::TreeWalker;
//!
//! let walker = TreeWalker::new(store);
//! let tree = walker.descendant_tree(root_id, 3).await?;
//! println!("{} forks loaded", tree.node_count - 1);
//! ```

#![warn(unreachable_pub)]

pub mod node;
pub mod walker;

pub use node::{Ancestry, DescendantTree, GenealogyNode};
pub use walker::{TreeRequest, TreeWalker};
