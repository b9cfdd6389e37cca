//! Traversal results

use forkline_model::{Recipe, RecipeId};
use serde::{Deserialize, Serialize};

/// Node of a descendant tree, built fresh per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenealogyNode {
    /// Recipe
    pub id: RecipeId,
    /// Title
    pub title: String,
    /// Fork tags
    pub fork_tags: Vec<String>,
    /// Cached direct-fork count
    pub fork_count: u32,
    /// Cached vote count
    pub vote_count: u32,
    /// Distance from the tree root
    pub depth: usize,
    /// Loaded children, most popular first
    pub children: Vec<GenealogyNode>,
    /// The fan-out cap cut off further children
    pub has_more_children: bool,
}

impl GenealogyNode {
    /// Leaf node for a recipe at `depth`
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, depth: usize) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            fork_tags: recipe.fork_tags.clone(),
            fork_count: recipe.fork_count,
            vote_count: recipe.vote_count,
            depth,
            children: Vec::new(),
            has_more_children: false,
        }
    }

    /// Nodes in this subtree, self included
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Deepest depth in this subtree
    #[must_use]
    pub fn max_depth(&self) -> usize {
        let mut deepest = self.depth;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            deepest = deepest.max(node.depth);
            stack.extend(node.children.iter());
        }
        deepest
    }

    /// Depth-first search for a node
    #[must_use]
    pub fn find(&self, id: RecipeId) -> Option<&GenealogyNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }
}

/// Descendant tree with truncation flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescendantTree {
    /// Tree root
    pub root: GenealogyNode,
    /// Nodes visited (equals nodes in the tree)
    pub node_count: usize,
    /// Some node at the depth boundary had children that were not loaded
    pub max_depth_reached: bool,
    /// Expansion stopped early because the deadline passed
    pub deadline_exceeded: bool,
}

/// Parent chain, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ancestry {
    /// Ancestors from the oldest reachable one down to the direct parent
    pub chain: Vec<Recipe>,
    /// The walk stopped on the chain cap or a revisited id
    pub truncated: bool,
}

impl Ancestry {
    /// Ancestor ids, oldest first
    #[must_use]
    pub fn ids(&self) -> Vec<RecipeId> {
        self.chain.iter().map(|r| r.id).collect()
    }

    /// Number of ancestors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Recipe has no reachable ancestors
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
