//! Genealogy response

use forkline_lineage::{DescendantTree, GenealogyNode};
use forkline_model::RecipeId;
use serde::{Deserialize, Serialize};

/// Everything needed to draw a recipe's family tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genealogy {
    /// Root of the lineage
    pub root_id: RecipeId,
    /// Recipe the request was about
    pub target_id: RecipeId,
    /// Ancestors of the target, oldest first
    pub ancestors: Vec<GenealogyNode>,
    /// Ids from the root down to the target
    pub path: Vec<RecipeId>,
    /// Descendant tree of the root
    pub tree: GenealogyNode,
    /// Recipes whose root pointer is the root
    pub total_forks: usize,
    /// Nodes loaded into `tree`
    pub node_count: usize,
    /// Depth cap cut off deeper forks
    pub max_depth_reached: bool,
    /// Ancestor walk stopped early
    pub ancestors_truncated: bool,
    /// Tree expansion ran out of time
    pub deadline_exceeded: bool,
}

impl Genealogy {
    pub(crate) fn assemble(
        root_id: RecipeId,
        target_id: RecipeId,
        ancestors: Vec<GenealogyNode>,
        ancestors_truncated: bool,
        path: Vec<RecipeId>,
        tree: DescendantTree,
        total_forks: usize,
    ) -> Self {
        Self {
            root_id,
            target_id,
            ancestors,
            path,
            node_count: tree.node_count,
            max_depth_reached: tree.max_depth_reached,
            deadline_exceeded: tree.deadline_exceeded,
            tree: tree.root,
            total_forks,
            ancestors_truncated,
        }
    }

    /// Target is the root itself
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.root_id == self.target_id
    }
}
