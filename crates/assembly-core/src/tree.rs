//! Production tree: an arena of nodes, each pairing a recipe with an instance
//! count.
//!
//! Children are owned by the arena and listed in order on their parent; the
//! parent link is a plain [`NodeId`] used only for upward traversal. A tree may
//! hold several disjoint roots, but planners always work from one of them.

use std::ops::Index;
use std::sync::Arc;

use slotmap::SlotMap;

use crate::id::NodeId;
use crate::recipe::Recipe;

/// One element of a production tree.
#[derive(Debug, Clone)]
pub struct ProductionNode {
    recipe: Arc<Recipe>,
    instance_count: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl ProductionNode {
    fn new(recipe: Arc<Recipe>, parent: Option<NodeId>) -> Self {
        Self {
            recipe,
            instance_count: 1.0,
            parent,
            children: Vec::new(),
        }
    }

    pub fn recipe(&self) -> &Arc<Recipe> {
        &self.recipe
    }

    /// Concurrently running copies of the recipe. May be fractional.
    pub fn instance_count(&self) -> f64 {
        self.instance_count
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Name of the primary product.
    pub fn product_name(&self) -> &str {
        &self.recipe.product().name
    }

    /// Primary product output per minute at the current instance count.
    pub fn product_rate(&self) -> f64 {
        self.instance_count * self.recipe.product().rate
    }

    /// Byproduct name and output per minute at the current instance count.
    pub fn byproduct_rate(&self) -> Option<(&str, f64)> {
        self.recipe
            .byproduct()
            .map(|b| (b.name.as_str(), self.instance_count * b.rate))
    }
}

/// Arena holding the nodes of one or more production trees.
#[derive(Debug, Clone, Default)]
pub struct ProductionTree {
    nodes: SlotMap<NodeId, ProductionNode>,
}

impl ProductionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parentless node with an instance count of 1.
    pub fn insert_root(&mut self, recipe: Arc<Recipe>) -> NodeId {
        self.nodes.insert(ProductionNode::new(recipe, None))
    }

    /// Append a child under `parent` with an instance count of 1.
    ///
    /// Returns `None` if `parent` is not in this tree.
    pub fn add_child(&mut self, parent: NodeId, recipe: Arc<Recipe>) -> Option<NodeId> {
        self.nodes
            .contains_key(parent)
            .then(|| self.push_child(parent, recipe))
    }

    /// Append a child under `parent` with an instance count of 1.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in this tree.
    pub(crate) fn push_child(&mut self, parent: NodeId, recipe: Arc<Recipe>) -> NodeId {
        assert!(self.nodes.contains_key(parent), "parent {parent:?} not in tree");
        let child = self.nodes.insert(ProductionNode::new(recipe, Some(parent)));
        self.nodes[parent].children.push(child);
        child
    }

    /// Remove every descendant of `node`, leaving `node` itself as a leaf.
    /// Returns how many nodes were removed.
    pub fn clear_children(&mut self, node: NodeId) -> usize {
        let Some(entry) = self.nodes.get_mut(node) else {
            return 0;
        };
        let mut stack = std::mem::take(&mut entry.children);
        let mut removed = 0;
        while let Some(id) = stack.pop() {
            if let Some(gone) = self.nodes.remove(id) {
                stack.extend(gone.children);
                removed += 1;
            }
        }
        removed
    }

    pub fn get(&self, id: NodeId) -> Option<&ProductionNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Total nodes in the arena, across all roots.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Overwrite a node's instance count. Returns false if the node is absent.
    pub fn set_instance_count(&mut self, id: NodeId, count: f64) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.instance_count = count;
                true
            }
            None => false,
        }
    }

    /// Depth-first pre-order walk starting at `root`, yielding each node with
    /// its depth relative to `root`.
    pub fn pre_order(&self, root: NodeId) -> PreOrder<'_> {
        let stack = if self.nodes.contains_key(root) {
            vec![(root, 0)]
        } else {
            Vec::new()
        };
        PreOrder { tree: self, stack }
    }
}

impl Index<NodeId> for ProductionTree {
    type Output = ProductionNode;

    fn index(&self, id: NodeId) -> &ProductionNode {
        &self.nodes[id]
    }
}

/// Iterator returned by [`ProductionTree::pre_order`].
pub struct PreOrder<'t> {
    tree: &'t ProductionTree,
    stack: Vec<(NodeId, usize)>,
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        if let Some(node) = self.tree.nodes.get(id) {
            self.stack
                .extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        Some((id, depth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, output: &str) -> Arc<Recipe> {
        Arc::new(
            Recipe::builder(name, "Constructor")
                .output(output, 10.0)
                .output(format!("{output} Dust"), 2.0)
                .build()
                .unwrap(),
        )
    }

    /// root -> (a -> (a1, a2), b)
    fn sample_tree() -> (ProductionTree, [NodeId; 5]) {
        let mut tree = ProductionTree::new();
        let root = tree.insert_root(recipe("Root", "R"));
        let a = tree.add_child(root, recipe("A", "A")).unwrap();
        let a1 = tree.add_child(a, recipe("A1", "A1")).unwrap();
        let a2 = tree.add_child(a, recipe("A2", "A2")).unwrap();
        let b = tree.add_child(root, recipe("B", "B")).unwrap();
        (tree, [root, a, a1, a2, b])
    }

    #[test]
    fn new_nodes_start_at_one_instance() {
        let (tree, ids) = sample_tree();
        for id in ids {
            assert_eq!(tree[id].instance_count(), 1.0);
        }
    }

    #[test]
    fn parent_links_point_upward() {
        let (tree, [root, a, a1, _, b]) = sample_tree();
        assert_eq!(tree[root].parent(), None);
        assert_eq!(tree[a].parent(), Some(root));
        assert_eq!(tree[a1].parent(), Some(a));
        assert_eq!(tree[b].parent(), Some(root));
        assert_eq!(tree[root].children(), &[a, b]);
    }

    #[test]
    fn pre_order_visits_parents_before_children_in_order() {
        let (tree, [root, a, a1, a2, b]) = sample_tree();
        let order: Vec<_> = tree.pre_order(root).collect();
        assert_eq!(order, vec![(root, 0), (a, 1), (a1, 2), (a2, 2), (b, 1)]);
    }

    #[test]
    fn pre_order_from_inner_node() {
        let (tree, [_, a, a1, a2, _]) = sample_tree();
        let order: Vec<_> = tree.pre_order(a).map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, a1, a2]);
    }

    #[test]
    fn clear_children_removes_whole_subtree() {
        let (mut tree, [root, a, a1, a2, b]) = sample_tree();
        assert_eq!(tree.clear_children(root), 4);
        assert_eq!(tree.len(), 1);
        assert!(tree[root].children().is_empty());
        for gone in [a, a1, a2, b] {
            assert!(!tree.contains(gone));
        }
    }

    #[test]
    fn clear_children_of_leaf_is_noop() {
        let (mut tree, [_, _, a1, _, _]) = sample_tree();
        assert_eq!(tree.clear_children(a1), 0);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn add_child_to_missing_parent_fails() {
        let (mut tree, [root, a, ..]) = sample_tree();
        tree.clear_children(root);
        assert!(tree.add_child(a, recipe("X", "X")).is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn push_child_links_both_ways() {
        let (mut tree, [_, _, _, _, b]) = sample_tree();
        let child = tree.push_child(b, recipe("B1", "B1"));
        assert_eq!(tree[child].parent(), Some(b));
        assert_eq!(tree[b].children(), &[child]);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    #[should_panic(expected = "not in tree")]
    fn push_child_to_missing_parent_panics() {
        let (mut tree, [root, a, ..]) = sample_tree();
        tree.clear_children(root);
        tree.push_child(a, recipe("X", "X"));
    }

    #[test]
    fn realized_rates_follow_instance_count() {
        let (mut tree, [root, ..]) = sample_tree();
        assert!(tree.set_instance_count(root, 2.5));
        assert_eq!(tree[root].product_name(), "R");
        assert_eq!(tree[root].product_rate(), 25.0);
        assert_eq!(tree[root].byproduct_rate(), Some(("R Dust", 5.0)));
    }
}
