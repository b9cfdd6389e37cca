//! Bounded traversal over the fork graph
//!
//! The store cannot guarantee the parent pointers are acyclic, so every
//! walk carries both a length cap and a visited set. Hitting either is
//! reported as truncation, never as an error.
//!
//! Descendant trees are expanded level by level from a worklist into an
//! arena keyed by recipe id, then assembled bottom-up. Sibling subtrees of
//! one level are fetched concurrently; results are consumed in frontier
//! order, so concurrency never reorders children.

use crate::node::{Ancestry, DescendantTree, GenealogyNode};
use forkline_model::{
    ChildOrder, EngineError, EngineResult, Recipe, RecipeId, RecipeStore, TraversalLimits,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::Instant;

/// Options for a single descendant-tree request
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRequest {
    /// Requested depth; `None` uses the configured default
    pub max_depth: Option<usize>,
    /// Stop expanding once this instant has passed
    pub deadline: Option<Instant>,
}

impl TreeRequest {
    /// Request with an explicit depth
    #[inline]
    #[must_use]
    pub fn depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            deadline: None,
        }
    }

    /// With deadline
    #[inline]
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Result of walking parent pointers upward
struct ParentWalk {
    /// Nearest parent first
    chain: Vec<Recipe>,
    truncated: bool,
}

/// Graph walker over a [`RecipeStore`]
#[derive(Clone)]
pub struct TreeWalker {
    store: Arc<dyn RecipeStore>,
    limits: TraversalLimits,
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl TreeWalker {
    /// Create walker with default limits
    #[must_use]
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self::with_limits(store, TraversalLimits::default())
    }

    /// Create walker with explicit limits
    #[must_use]
    pub fn with_limits(store: Arc<dyn RecipeStore>, limits: TraversalLimits) -> Self {
        Self { store, limits }
    }

    /// Configured limits
    #[inline]
    #[must_use]
    pub fn limits(&self) -> &TraversalLimits {
        &self.limits
    }

    /// Fetch a recipe or fail with `NotFound`
    ///
    /// # Errors
    /// `NotFound` or store failure
    pub async fn load(&self, id: RecipeId) -> EngineResult<Recipe> {
        self.store
            .get_recipe(id)
            .await?
            .ok_or_else(|| EngineError::recipe_not_found(id))
    }

    /// Ancestors of a recipe, oldest first, ending at its direct parent
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn ancestors(&self, recipe_id: RecipeId) -> EngineResult<Ancestry> {
        let recipe = self.load(recipe_id).await?;
        let walk = self.walk_up(&recipe, None).await?;
        let mut chain = walk.chain;
        chain.reverse();
        Ok(Ancestry {
            chain,
            truncated: walk.truncated,
        })
    }

    /// Root of the fork tree containing `recipe_id`
    ///
    /// Trusts the cached root pointer when present.
    ///
    /// # Errors
    /// `NotFound` for an unknown recipe, or store failure
    pub async fn resolve_root(&self, recipe_id: RecipeId) -> EngineResult<RecipeId> {
        let recipe = self.load(recipe_id).await?;
        if let Some(root_id) = recipe.root_id {
            return Ok(root_id);
        }
        if recipe.parent_id.is_none() {
            return Ok(recipe.id);
        }

        let walk = self.walk_up(&recipe, None).await?;
        if walk.truncated {
            tracing::warn!(
                "Root resolution for {} stopped after {} ancestors",
                recipe_id,
                walk.chain.len()
            );
        }
        Ok(walk.chain.last().map_or(recipe.id, |r| r.id))
    }

    /// Ids from `root_id` down to `target_id`
    ///
    /// Degenerates to `[root_id]` when both are the same. If the upward
    /// walk cannot reach `root_id` the path starts at the highest recipe
    /// reached.
    ///
    /// # Errors
    /// `NotFound` for an unknown target, or store failure
    pub async fn path_to_node(
        &self,
        root_id: RecipeId,
        target_id: RecipeId,
    ) -> EngineResult<Vec<RecipeId>> {
        if root_id == target_id {
            return Ok(vec![root_id]);
        }

        let target = self.load(target_id).await?;
        let walk = self.walk_up(&target, Some(root_id)).await?;

        let mut path: Vec<RecipeId> = Vec::with_capacity(walk.chain.len() + 1);
        path.push(target_id);
        path.extend(walk.chain.iter().map(|r| r.id));
        path.reverse();

        if path.first() != Some(&root_id) {
            tracing::debug!(
                "Path from {} to {} did not reach the root (truncated: {})",
                root_id,
                target_id,
                walk.truncated
            );
        }
        Ok(path)
    }

    /// Descendant tree down to `max_depth`
    ///
    /// # Errors
    /// `NotFound` for an unknown root, or store failure
    pub async fn descendant_tree(
        &self,
        root_id: RecipeId,
        max_depth: usize,
    ) -> EngineResult<DescendantTree> {
        self.descendant_tree_with(root_id, TreeRequest::depth(max_depth))
            .await
    }

    /// Descendant tree with explicit request options
    ///
    /// The requested depth is clamped to the configured maximum.
    ///
    /// # Errors
    /// `NotFound` for an unknown root, or store failure
    pub async fn descendant_tree_with(
        &self,
        root_id: RecipeId,
        request: TreeRequest,
    ) -> EngineResult<DescendantTree> {
        let root = self.load(root_id).await?;
        let max_depth = request
            .max_depth
            .unwrap_or(self.limits.default_depth)
            .min(self.limits.max_depth);
        let fan_out = self.limits.max_children_per_node;

        let mut root_node = GenealogyNode::from_recipe(&root, 0);
        let mut arena: HashMap<RecipeId, GenealogyNode> = HashMap::new();
        let mut child_ids: HashMap<RecipeId, Vec<RecipeId>> = HashMap::new();
        let mut insertion_order: Vec<RecipeId> = Vec::new();
        let mut visited: HashSet<RecipeId> = HashSet::from([root_id]);

        let mut frontier = vec![root_id];
        let mut depth = 0;
        let mut max_depth_reached = false;
        let mut deadline_exceeded = false;

        while !frontier.is_empty() {
            if request.deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(
                    "Tree expansion of {} hit its deadline at depth {}",
                    root_id,
                    depth
                );
                deadline_exceeded = true;
                break;
            }

            if depth >= max_depth {
                max_depth_reached = self.any_has_children(&frontier).await?;
                break;
            }

            let fetched = self.fetch_children(&frontier, fan_out + 1).await?;
            let mut next = Vec::new();

            for (parent_id, mut children) in fetched {
                let has_more = children.len() > fan_out;
                children.truncate(fan_out);

                if parent_id == root_id {
                    root_node.has_more_children = has_more;
                } else if let Some(parent) = arena.get_mut(&parent_id) {
                    parent.has_more_children = has_more;
                }

                for child in children {
                    if !visited.insert(child.id) {
                        tracing::warn!(
                            "Skipping already visited recipe {} under {}",
                            child.id,
                            parent_id
                        );
                        continue;
                    }
                    arena.insert(child.id, GenealogyNode::from_recipe(&child, depth + 1));
                    child_ids.entry(parent_id).or_default().push(child.id);
                    insertion_order.push(child.id);
                    next.push(child.id);
                }
            }

            tracing::debug!(
                "Expanded depth {} of {}: {} new nodes",
                depth,
                root_id,
                next.len()
            );
            frontier = next;
            depth += 1;
        }

        let node_count = visited.len();
        let mut built = assemble(arena, &child_ids, &insertion_order);
        root_node.children = take_children(&mut built, &child_ids, root_id);

        Ok(DescendantTree {
            root: root_node,
            node_count,
            max_depth_reached,
            deadline_exceeded,
        })
    }

    /// Children of every frontier node, in frontier order
    async fn fetch_children(
        &self,
        frontier: &[RecipeId],
        limit: usize,
    ) -> EngineResult<Vec<(RecipeId, Vec<Recipe>)>> {
        let store = &self.store;
        stream::iter(frontier.iter().copied())
            .map(|id| async move {
                let children = store
                    .list_children(id, ChildOrder::PopularityThenAge, limit)
                    .await?;
                Ok::<_, EngineError>((id, children))
            })
            .buffered(self.limits.expansion_concurrency.max(1))
            .try_collect()
            .await
    }

    /// Whether any of the boundary nodes has at least one child
    async fn any_has_children(&self, frontier: &[RecipeId]) -> EngineResult<bool> {
        let probed = self.fetch_children(frontier, 1).await?;
        Ok(probed.iter().any(|(_, children)| !children.is_empty()))
    }

    /// Walk parent pointers from `start`, stopping at `stop_at`, a missing
    /// parent, a revisited id or the chain cap
    async fn walk_up(&self, start: &Recipe, stop_at: Option<RecipeId>) -> EngineResult<ParentWalk> {
        let cap = self.limits.max_chain_length;
        let mut visited: HashSet<RecipeId> = HashSet::from([start.id]);
        let mut chain: Vec<Recipe> = Vec::new();
        let mut next = if Some(start.id) == stop_at {
            None
        } else {
            start.parent_id
        };
        let mut truncated = false;

        while let Some(parent_id) = next {
            if chain.len() >= cap {
                tracing::warn!(
                    "Parent chain of {} exceeds {} entries, truncating",
                    start.id,
                    cap
                );
                truncated = true;
                break;
            }
            if !visited.insert(parent_id) {
                tracing::warn!("Cycle in parent chain of {} at {}", start.id, parent_id);
                truncated = true;
                break;
            }

            let Some(parent) = self.store.get_recipe(parent_id).await? else {
                tracing::warn!("Dangling parent pointer {} in chain of {}", parent_id, start.id);
                break;
            };

            next = if Some(parent.id) == stop_at {
                None
            } else {
                parent.parent_id
            };
            chain.push(parent);
        }

        Ok(ParentWalk { chain, truncated })
    }
}

/// Build nested subtrees from the arena. Children were inserted after their
/// parents, so walking the insertion order backwards finishes every child
/// before its parent is attached.
fn assemble(
    mut arena: HashMap<RecipeId, GenealogyNode>,
    child_ids: &HashMap<RecipeId, Vec<RecipeId>>,
    insertion_order: &[RecipeId],
) -> HashMap<RecipeId, GenealogyNode> {
    let mut built: HashMap<RecipeId, GenealogyNode> = HashMap::with_capacity(arena.len());

    for id in insertion_order.iter().rev() {
        let Some(mut node) = arena.remove(id) else {
            continue;
        };
        node.children = take_children(&mut built, child_ids, *id);
        built.insert(*id, node);
    }

    built
}

fn take_children(
    built: &mut HashMap<RecipeId, GenealogyNode>,
    child_ids: &HashMap<RecipeId, Vec<RecipeId>>,
    parent_id: RecipeId,
) -> Vec<GenealogyNode> {
    child_ids
        .get(&parent_id)
        .map(|ids| ids.iter().filter_map(|id| built.remove(id)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_model::InMemoryStore;
    use forkline_test_utils::{build_chain, build_tree, RecipeBuilder};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn walker(store: InMemoryStore) -> TreeWalker {
        TreeWalker::new(Arc::new(store))
    }

    #[tokio::test]
    async fn root_has_no_ancestors() {
        let store = InMemoryStore::new();
        let chain = build_chain(&store, 1);
        let ancestry = walker(store).ancestors(chain[0].id).await.unwrap();
        assert!(ancestry.is_empty());
        assert!(!ancestry.truncated);
    }

    #[tokio::test]
    async fn ancestors_are_oldest_first() {
        let store = InMemoryStore::new();
        let chain = build_chain(&store, 4);
        let ancestry = walker(store).ancestors(chain[3].id).await.unwrap();
        assert_eq!(ancestry.ids(), vec![chain[0].id, chain[1].id, chain[2].id]);
    }

    #[tokio::test]
    async fn ancestors_of_unknown_recipe_is_not_found() {
        let err = walker(InMemoryStore::new())
            .ancestors(RecipeId::from_u128(404))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn cycle_in_parent_chain_stops_walk() {
        let store = InMemoryStore::new();
        let a = RecipeBuilder::root(1, "a").parent(2).build();
        let b = RecipeBuilder::root(2, "b").parent(1).build();
        store.insert_recipe(a.clone());
        store.insert_recipe(b.clone());

        let ancestry = walker(store).ancestors(a.id).await.unwrap();
        assert_eq!(ancestry.ids(), vec![b.id]);
        assert!(ancestry.truncated);
    }

    #[tokio::test]
    async fn resolve_root_prefers_cached_pointer() {
        let store = InMemoryStore::new();
        let orphan = RecipeBuilder::root(5, "orphan")
            .parent(6)
            .root_pointer(99)
            .build();
        store.insert_recipe(orphan.clone());
        let root = walker(store).resolve_root(orphan.id).await.unwrap();
        assert_eq!(root, RecipeId::from_u128(99));
    }

    #[tokio::test]
    async fn resolve_root_walks_without_cached_pointer() {
        let store = InMemoryStore::new();
        let chain = build_chain(&store, 3);
        let mut leaf = chain[2].clone();
        leaf.root_id = None;
        store.insert_recipe(leaf.clone());
        let root = walker(store).resolve_root(leaf.id).await.unwrap();
        assert_eq!(root, chain[0].id);
    }

    #[tokio::test]
    async fn path_to_node_runs_root_to_target() {
        let store = InMemoryStore::new();
        let chain = build_chain(&store, 4);
        let w = walker(store);

        let path = w.path_to_node(chain[1].id, chain[3].id).await.unwrap();
        assert_eq!(path, vec![chain[1].id, chain[2].id, chain[3].id]);

        let same = w.path_to_node(chain[0].id, chain[0].id).await.unwrap();
        assert_eq!(same, vec![chain[0].id]);
    }

    #[tokio::test]
    async fn tree_respects_depth_and_flags_cutoff() {
        let store = InMemoryStore::new();
        // 1 root, 2 children each, 3 levels deep
        let root = build_tree(&store, 2, 3);
        let tree = walker(store).descendant_tree(root.id, 2).await.unwrap();

        assert_eq!(tree.root.max_depth(), 2);
        assert_eq!(tree.node_count, 1 + 2 + 4);
        assert_eq!(tree.root.subtree_size(), tree.node_count);
        assert!(tree.max_depth_reached);
        assert!(!tree.deadline_exceeded);
    }

    #[tokio::test]
    async fn full_tree_does_not_flag_cutoff() {
        let store = InMemoryStore::new();
        let root = build_tree(&store, 2, 2);
        let tree = walker(store).descendant_tree(root.id, 2).await.unwrap();
        assert_eq!(tree.node_count, 7);
        assert!(!tree.max_depth_reached);
    }

    #[tokio::test]
    async fn fan_out_cap_sets_has_more_children() {
        let store = InMemoryStore::new();
        let root = build_tree(&store, 5, 1);
        let limits = TraversalLimits {
            max_children_per_node: 3,
            ..TraversalLimits::default()
        };
        let w = TreeWalker::with_limits(Arc::new(store), limits);
        let tree = w.descendant_tree(root.id, 3).await.unwrap();

        assert_eq!(tree.root.children.len(), 3);
        assert!(tree.root.has_more_children);
        assert!(tree.root.children.iter().all(|c| !c.has_more_children));
    }

    #[tokio::test]
    async fn children_ordered_by_popularity() {
        let store = InMemoryStore::new();
        let root = RecipeBuilder::root(1, "root").build();
        store.insert_recipe(root.clone());
        store.insert_recipe(RecipeBuilder::fork(&root, 2, "quiet").forks(0).minutes_ago(30).build());
        store.insert_recipe(RecipeBuilder::fork(&root, 3, "popular").forks(9).minutes_ago(10).build());
        store.insert_recipe(RecipeBuilder::fork(&root, 4, "older quiet").forks(0).minutes_ago(60).build());

        let tree = walker(store).descendant_tree(root.id, 1).await.unwrap();
        let titles: Vec<_> = tree.root.children.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["popular", "older quiet", "quiet"]);
    }

    #[tokio::test]
    async fn depth_is_clamped_to_configured_maximum() {
        let store = InMemoryStore::new();
        let chain = build_chain(&store, 6);
        let limits = TraversalLimits {
            max_depth: 2,
            default_depth: 2,
            ..TraversalLimits::default()
        };
        let w = TreeWalker::with_limits(Arc::new(store), limits);
        let tree = w.descendant_tree(chain[0].id, 50).await.unwrap();
        assert_eq!(tree.root.max_depth(), 2);
        assert!(tree.max_depth_reached);
    }

    #[tokio::test]
    async fn expired_deadline_returns_partial_tree() {
        let store = InMemoryStore::new();
        let root = build_tree(&store, 2, 2);
        let deadline = Instant::now();
        let tree = walker(store)
            .descendant_tree_with(root.id, TreeRequest::depth(2).with_deadline(deadline))
            .await
            .unwrap();
        assert!(tree.deadline_exceeded);
        assert_eq!(tree.node_count, 1);
        assert!(tree.root.children.is_empty());
    }

    fn widest(node: &GenealogyNode) -> usize {
        node.children
            .iter()
            .map(widest)
            .fold(node.children.len(), usize::max)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn tree_stays_within_depth_and_fan_out(
            fan_out in 1usize..4,
            depth in 0usize..4,
            requested in 0usize..5,
            cap in 1usize..4,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let store = InMemoryStore::new();
            let root = build_tree(&store, fan_out, depth);
            let limits = TraversalLimits {
                max_children_per_node: cap,
                ..TraversalLimits::default()
            };
            let w = TreeWalker::with_limits(Arc::new(store), limits);
            let tree = rt.block_on(w.descendant_tree(root.id, requested)).unwrap();

            let width = fan_out.min(cap);
            let expected: usize = (0..=depth.min(requested)).map(|d| width.pow(d as u32)).sum();
            prop_assert!(tree.root.max_depth() <= requested);
            prop_assert!(widest(&tree.root) <= cap);
            prop_assert_eq!(tree.node_count, expected);
            prop_assert_eq!(tree.root.subtree_size(), tree.node_count);
            prop_assert_eq!(tree.max_depth_reached, depth > requested);
        }
    }
}
