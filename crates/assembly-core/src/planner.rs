//! Production planner: builds a production tree from a target recipe and
//! scales it to a throughput.
//!
//! # Build
//!
//! [`Planner::build`] expands each input of each node into a child node whose
//! recipe is chosen by a [`SelectionPolicy`] among the catalog's primary
//! producers of that input. Inputs with no producer are raw inputs. Every
//! product is expanded at most once per build: a later node with an already
//! expanded product stays a leaf. This bounds the recursion even when the
//! recipe graph has cycles. Use [`Planner::subtree_as_new_planner`] to expand
//! such a leaf on its own.
//!
//! # Scale
//!
//! [`Planner::scale`] pins the output of one node (the anchor) and rewrites
//! every other instance count so that each child produces exactly what its
//! parent consumes:
//!
//! ```text
//! child.instance_count * child.product.rate
//!     == parent.instance_count * parent.input(child.product).rate
//! ```
//!
//! Counts are computed downward from the anchor into its descendants, then
//! upward through each ancestor and down into that ancestor's other children.
//! The upward pass runs to the top of the arena, past the root of a planner
//! obtained from [`Planner::subtree_as_new_planner`].
//! All new counts are computed before any is written, so a failed scale leaves
//! the tree untouched.

use std::collections::{BTreeMap, HashSet};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::catalog::{Catalog, MachineFilter, Role};
use crate::error::PlanError;
use crate::id::NodeId;
use crate::options::{BuildOptions, MaxDepth};
use crate::policy::{Candidates, SelectionPolicy};
use crate::recipe::{Direction, Recipe};
use crate::tree::{PreOrder, ProductionNode, ProductionTree};

// ---------------------------------------------------------------------------
// Tree ownership
// ---------------------------------------------------------------------------

/// A planner either owns its arena or borrows the arena of the planner it was
/// extracted from.
#[derive(Debug)]
enum TreeHandle<'a> {
    Owned(ProductionTree),
    Borrowed(&'a mut ProductionTree),
}

impl Deref for TreeHandle<'_> {
    type Target = ProductionTree;

    fn deref(&self) -> &ProductionTree {
        match self {
            TreeHandle::Owned(tree) => tree,
            TreeHandle::Borrowed(tree) => tree,
        }
    }
}

impl DerefMut for TreeHandle<'_> {
    fn deref_mut(&mut self) -> &mut ProductionTree {
        match self {
            TreeHandle::Owned(tree) => tree,
            TreeHandle::Borrowed(tree) => tree,
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Plans a production chain rooted at one recipe.
#[derive(Debug)]
pub struct Planner<'a> {
    catalog: &'a Catalog,
    tree: TreeHandle<'a>,
    root: NodeId,
}

impl<'a> Planner<'a> {
    /// Start a fresh single-node tree rooted at `recipe`.
    pub fn from_recipe(catalog: &'a Catalog, recipe: Arc<Recipe>) -> Self {
        let mut tree = ProductionTree::new();
        let root = tree.insert_root(recipe);
        Self {
            catalog,
            tree: TreeHandle::Owned(tree),
            root,
        }
    }

    /// Start a fresh tree rooted at the catalog recipe called `name`.
    pub fn from_name(catalog: &'a Catalog, name: &str) -> Result<Self, PlanError> {
        let recipe = Arc::clone(catalog.lookup_by_name(name)?);
        Ok(Self::from_recipe(catalog, recipe))
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &ProductionNode {
        &self.tree[self.root]
    }

    /// The underlying arena. May hold nodes outside this planner's subtree
    /// when the planner was extracted from another one.
    pub fn tree(&self) -> &ProductionTree {
        &self.tree
    }

    pub fn node(&self, id: NodeId) -> Option<&ProductionNode> {
        self.tree.get(id)
    }

    /// Pre-order walk of this planner's tree, with depths relative to the root.
    pub fn pre_order(&self) -> PreOrder<'_> {
        self.tree.pre_order(self.root)
    }

    /// Number of nodes reachable from the root, root included.
    pub fn node_count(&self) -> usize {
        self.pre_order().count()
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Discard the current children of the root and expand the tree again.
    ///
    /// Returns the number of nodes in the rebuilt tree. Every node, the root
    /// included, ends with an instance count of 1.
    pub fn build<P>(&mut self, policy: &P, options: &BuildOptions) -> usize
    where
        P: SelectionPolicy + ?Sized,
    {
        let root = self.root;
        let discarded = self.tree.clear_children(root);
        self.tree.set_instance_count(root, 1.0);

        let mut expansion = Expansion {
            catalog: self.catalog,
            policy,
            excluded: &options.excluded_machines,
            expanded: options.seed_products.iter().cloned().collect(),
        };
        expansion.expand(&mut *self.tree, root, options.max_depth);

        let count = self.node_count();
        debug!(
            root = self.root().recipe().name(),
            discarded,
            nodes = count,
            "built production tree"
        );
        count
    }

    // -----------------------------------------------------------------------
    // Scale
    // -----------------------------------------------------------------------

    /// Set the node producing `anchor_good` to output `target_rate` per minute
    /// and make every other node in the tree consistent with it.
    pub fn scale(&mut self, anchor_good: &str, target_rate: f64) -> Result<(), PlanError> {
        let anchor = self.find_id_by_product(anchor_good)?;
        let tree: &ProductionTree = &self.tree;

        let anchor_count = tree[anchor].recipe().required_instances(
            Direction::Output,
            anchor_good,
            target_rate,
        )?;
        let mut updates = vec![(anchor, anchor_count)];
        plan_downward(tree, anchor, anchor_count, None, &mut updates)?;

        // Climbs the whole arena: an extracted planner's root may still have
        // ancestors in the planner it was taken from.
        let (mut current, mut current_count) = (anchor, anchor_count);
        while let Some(parent) = tree[current].parent() {
            let produced = current_count * tree[current].recipe().product().rate;
            let good = tree[current].product_name();
            let parent_count = tree[parent]
                .recipe()
                .required_instances(Direction::Input, good, produced)
                .map_err(|_| invariant_violation(&tree[parent], good))?;

            updates.push((parent, parent_count));
            plan_downward(tree, parent, parent_count, Some(current), &mut updates)?;
            current = parent;
            current_count = parent_count;
        }

        let rewritten = updates.len();
        for (id, count) in updates {
            self.tree.set_instance_count(id, count);
        }
        debug!(
            anchor = anchor_good,
            target_rate, rewritten, "scaled production tree"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Search and extraction
    // -----------------------------------------------------------------------

    /// First node in pre-order whose primary product is `good`.
    pub fn find_id_by_product(&self, good: &str) -> Result<NodeId, PlanError> {
        self.pre_order()
            .map(|(id, _)| id)
            .find(|&id| self.tree[id].product_name() == good)
            .ok_or_else(|| PlanError::ProductNotFound(good.to_string()))
    }

    pub fn find_by_product(&self, good: &str) -> Result<&ProductionNode, PlanError> {
        self.find_id_by_product(good).map(|id| &self.tree[id])
    }

    /// Adopt the node producing `good` as the root of a new planner sharing
    /// this planner's arena and catalog.
    ///
    /// The new planner mutably borrows this one, so the source planner cannot be
    /// used until the extracted planner is dropped. Changes made through the
    /// extracted planner (including a rebuild of the subtree) remain in the
    /// shared arena. Search, tally, summary and rendering see only the adopted
    /// subtree, but [`Planner::scale`] keeps propagating through the adopted
    /// node's ancestors so the whole arena stays consistent.
    pub fn subtree_as_new_planner(&mut self, good: &str) -> Result<Planner<'_>, PlanError> {
        let root = self.find_id_by_product(good)?;
        Ok(Planner {
            catalog: self.catalog,
            tree: TreeHandle::Borrowed(&mut *self.tree),
            root,
        })
    }

    // -----------------------------------------------------------------------
    // Aggregation
    // -----------------------------------------------------------------------

    /// Physical machines needed per machine type: each node contributes its
    /// instance count rounded up.
    pub fn tally_machines(&self) -> BTreeMap<String, u64> {
        let mut machines = BTreeMap::new();
        for (id, _) in self.pre_order() {
            let node = &self.tree[id];
            *machines
                .entry(node.recipe().machine_type().to_string())
                .or_insert(0) += node.instance_count().ceil() as u64;
        }
        machines
    }
}

// ---------------------------------------------------------------------------
// Build internals
// ---------------------------------------------------------------------------

/// Traversal state for one build call. The expanded-product set is shared by
/// every branch and dropped when the build returns.
struct Expansion<'p, P: ?Sized> {
    catalog: &'p Catalog,
    policy: &'p P,
    excluded: &'p MachineFilter,
    expanded: HashSet<String>,
}

impl<P: SelectionPolicy + ?Sized> Expansion<'_, P> {
    fn expand(&mut self, tree: &mut ProductionTree, node: NodeId, depth: MaxDepth) {
        if depth.is_exhausted() {
            return;
        }

        let recipe = Arc::clone(tree[node].recipe());
        let product = &recipe.product().name;
        if !self.expanded.insert(product.clone()) {
            trace!(product = %product, "product already expanded, leaving leaf");
            return;
        }

        for input in recipe.inputs() {
            let producers =
                self.catalog
                    .recipes_involving(&input.name, Role::PrimaryProducer, self.excluded);
            let Some(candidates) = Candidates::new(&producers) else {
                trace!(good = %input.name, "raw input");
                continue;
            };
            let chosen = self.policy.choose(candidates);
            let child = tree.push_child(node, chosen);
            self.expand(tree, child, depth.descend());
        }
    }
}

// ---------------------------------------------------------------------------
// Scale internals
// ---------------------------------------------------------------------------

fn invariant_violation(parent: &ProductionNode, good: &str) -> PlanError {
    PlanError::InvariantViolation {
        parent: parent.recipe().name().to_string(),
        good: good.to_string(),
    }
}

/// Compute new counts for every descendant of `node` (optionally skipping one
/// child subtree) given `node`'s new instance count.
fn plan_downward(
    tree: &ProductionTree,
    node: NodeId,
    count: f64,
    skip: Option<NodeId>,
    updates: &mut Vec<(NodeId, f64)>,
) -> Result<(), PlanError> {
    let parent = &tree[node];
    for &child_id in parent.children() {
        if Some(child_id) == skip {
            continue;
        }
        let child = &tree[child_id];
        let good = child.product_name();
        let ingredient = parent
            .recipe()
            .input(good)
            .ok_or_else(|| invariant_violation(parent, good))?;
        let child_count = child.recipe().required_instances(
            Direction::Output,
            good,
            ingredient.rate * count,
        )?;

        updates.push((child_id, child_count));
        plan_downward(tree, child_id, child_count, None, updates)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{MaxOutput, PreferredNames, Simplest};
    use crate::test_utils::*;

    fn widget_planner(catalog: &Catalog) -> Planner<'_> {
        let mut planner = Planner::from_name(catalog, "Make Widget").unwrap();
        planner.build(&Simplest, &BuildOptions::default());
        planner
    }

    #[test]
    fn from_name_unknown_recipe() {
        let catalog = widget_catalog();
        let err = Planner::from_name(&catalog, "Make Gizmo").unwrap_err();
        assert_eq!(err, PlanError::RecipeNotFound("Make Gizmo".to_string()));
    }

    #[test]
    fn fresh_planner_is_single_node() {
        let catalog = widget_catalog();
        let planner = Planner::from_name(&catalog, "make widget").unwrap();
        assert_eq!(planner.node_count(), 1);
        assert_eq!(planner.root().recipe().name(), "Make Widget");
        assert_eq!(planner.root().instance_count(), 1.0);
    }

    #[test]
    fn build_links_child_to_parent() {
        let catalog = widget_catalog();
        let planner = widget_planner(&catalog);
        assert_eq!(planner.node_count(), 2);
        let child_id = planner.root().children()[0];
        let child = planner.node(child_id).unwrap();
        assert_eq!(child.recipe().name(), "Smelt Ore");
        assert_eq!(child.parent(), Some(planner.root_id()));
        assert_eq!(child.instance_count(), 1.0);
    }

    #[test]
    fn build_is_repeatable() {
        let catalog = widget_catalog();
        let mut planner = widget_planner(&catalog);
        planner.scale("Widget", 25.0).unwrap();
        let count = planner.build(&Simplest, &BuildOptions::default());
        assert_eq!(count, 2);
        assert_eq!(planner.tree().len(), 2);
        for (id, _) in planner.pre_order() {
            assert_eq!(planner.tree()[id].instance_count(), 1.0);
        }
    }

    #[test]
    fn build_with_zero_depth_leaves_root_alone() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Modular Frame").unwrap();
        let count = planner.build(
            &MaxOutput,
            &BuildOptions::default().with_max_depth(MaxDepth::Levels(0)),
        );
        assert_eq!(count, 1);
        assert!(planner.root().children().is_empty());
    }

    #[test]
    fn build_with_depth_one_adds_direct_inputs_only() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Modular Frame").unwrap();
        planner.build(
            &Simplest,
            &BuildOptions::default().with_max_depth(MaxDepth::Levels(1)),
        );
        let depths: Vec<usize> = planner.pre_order().map(|(_, d)| d).collect();
        assert_eq!(depths, vec![0, 1, 1]);
        for &child in planner.root().children() {
            assert!(planner.node(child).unwrap().children().is_empty());
        }
    }

    #[test]
    fn raw_inputs_become_no_children() {
        let catalog = widget_catalog();
        let planner = widget_planner(&catalog);
        let smelter = planner.find_by_product("Bar").unwrap();
        assert!(smelter.children().is_empty());
    }

    #[test]
    fn shared_intermediate_expanded_once() {
        let catalog = diamond_catalog();
        let mut planner = Planner::from_name(&catalog, "Assemble Kit").unwrap();
        planner.build(&Simplest, &BuildOptions::default());

        let gear_nodes: Vec<NodeId> = planner
            .pre_order()
            .map(|(id, _)| id)
            .filter(|&id| planner.tree()[id].product_name() == "Gear")
            .collect();
        assert_eq!(gear_nodes.len(), 2);
        assert_eq!(planner.tree()[gear_nodes[0]].children().len(), 1);
        assert!(planner.tree()[gear_nodes[1]].children().is_empty());
    }

    #[test]
    fn seed_products_are_not_expanded() {
        let catalog = widget_catalog();
        let mut planner = Planner::from_name(&catalog, "Make Widget").unwrap();
        planner.build(&Simplest, &BuildOptions::default().with_seed_products(["Widget"]));
        assert_eq!(planner.node_count(), 1);

        planner.build(&Simplest, &BuildOptions::default().with_seed_products(["Bar"]));
        assert_eq!(planner.node_count(), 2);
        let bar = planner.find_by_product("Bar").unwrap();
        assert!(bar.children().is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let catalog = cyclic_catalog();
        let mut planner = Planner::from_name(&catalog, "Grow Seed").unwrap();
        let count = planner.build(&Simplest, &BuildOptions::default());
        // Seed -> Fruit -> Seed(leaf)
        assert_eq!(count, 3);
    }

    #[test]
    fn excluded_machines_are_never_chosen() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Diluted Packaged Fuel").unwrap();
        planner.build(&Simplest, &BuildOptions::default());
        assert!(planner.tally_machines().get("Packager").is_none());

        planner.build(
            &Simplest,
            &BuildOptions::default().with_excluded_machines(MachineFilter::none()),
        );
        assert!(planner.tally_machines().contains_key("Packager"));
    }

    #[test]
    fn byproduct_producers_are_not_children() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Silica Glass").unwrap();
        planner.build(&MaxOutput, &BuildOptions::default());
        let silica = planner.find_by_product("Silica").unwrap();
        assert_eq!(silica.recipe().name(), "Silica");
    }

    #[test]
    fn preferred_names_steer_choice() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Reinforced Iron Plate").unwrap();
        planner.build(
            &PreferredNames::new(["Cast Screw"]),
            &BuildOptions::default(),
        );
        assert_eq!(
            planner.find_by_product("Screw").unwrap().recipe().name(),
            "Cast Screw"
        );

        planner.build(&Simplest, &BuildOptions::default());
        assert_eq!(planner.find_by_product("Screw").unwrap().recipe().name(), "Screw");
    }

    #[test]
    fn scale_example_chain() {
        let catalog = widget_catalog();
        let mut planner = widget_planner(&catalog);
        planner.scale("Widget", 25.0).unwrap();

        assert_eq!(planner.root().instance_count(), 2.5);
        let bar = planner.find_by_product("Bar").unwrap();
        assert!((bar.instance_count() - 50.0 / 30.0).abs() < 1e-12);

        let machines = planner.tally_machines();
        assert_eq!(machines["Assembler"], 3);
        assert_eq!(machines["Smelter"], 2);
    }

    #[test]
    fn scale_from_leaf_propagates_to_root_and_siblings() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Reinforced Iron Plate").unwrap();
        planner.build(&Simplest, &BuildOptions::default());
        planner.scale("Iron Rod", 15.0).unwrap();
        assert_consistent(&planner);

        // 15 rods/min -> 1.5 screw constructors -> 60 screws/min -> 1 assembler.
        assert!((planner.root().instance_count() - 1.0).abs() < 1e-9);
        let plate = planner.find_by_product("Iron Plate").unwrap();
        assert!((plate.product_rate() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn scale_missing_anchor_is_not_found() {
        let catalog = widget_catalog();
        let mut planner = widget_planner(&catalog);
        let err = planner.scale("Gizmo", 10.0).unwrap_err();
        assert_eq!(err, PlanError::ProductNotFound("Gizmo".to_string()));
        assert!(err.is_not_found());
    }

    #[test]
    fn scale_detects_corrupt_tree_without_writing() {
        let catalog = widget_catalog();
        let mut planner = widget_planner(&catalog);
        let root = planner.root_id();
        let stray = Arc::clone(catalog.lookup_by_name("Make Widget").unwrap());
        // The root does not consume its own product.
        planner.tree.add_child(root, stray).unwrap();

        let err = planner.scale("Bar", 90.0).unwrap_err();
        assert!(matches!(err, PlanError::InvariantViolation { ref good, .. } if good == "Widget"));
        assert!(!err.is_not_found());
        for (id, _) in planner.pre_order() {
            assert_eq!(planner.tree()[id].instance_count(), 1.0);
        }
    }

    #[test]
    fn subtree_planner_expands_pruned_branch() {
        let catalog = diamond_catalog();
        let mut planner = Planner::from_name(&catalog, "Assemble Kit").unwrap();
        planner.build(&Simplest, &BuildOptions::default());
        planner.scale("Kit", 3.0).unwrap();
        let before = planner.tree().len();

        {
            // Motor's Gear input was pruned because Frame expanded Gear first.
            let mut motors = planner.subtree_as_new_planner("Motor").unwrap();
            assert_eq!(motors.root().recipe().name(), "Make Motor");
            let count = motors.build(&Simplest, &BuildOptions::default());
            assert_eq!(count, 4);
            motors.scale("Motor", 10.0).unwrap();
            assert_consistent(&motors);
        }

        assert_eq!(planner.tree().len(), before + 1);
        assert_eq!(planner.find_by_product("Motor").unwrap().instance_count(), 2.0);
        // 10 Motor/min feeds 10 Kit instances, which need 20 Frame/min.
        assert_consistent(&planner);
        assert_eq!(planner.root().instance_count(), 10.0);
        assert_eq!(planner.find_by_product("Frame").unwrap().instance_count(), 2.0);
    }

    #[test]
    fn build_expands_every_producible_input_once() {
        let catalog = factory_catalog();
        let mut planner = Planner::from_name(&catalog, "Modular Frame").unwrap();
        let options = BuildOptions::default();
        planner.build(&MaxOutput, &options);

        let mut seen = HashSet::new();
        for (id, _) in planner.pre_order() {
            let node = &planner.tree()[id];
            let children: Vec<&str> = node
                .children()
                .iter()
                .map(|&child| planner.tree()[child].product_name())
                .collect();
            if !seen.insert(node.product_name().to_string()) {
                assert!(children.is_empty(), "{} expanded twice", node.product_name());
                continue;
            }
            let producible: Vec<&str> = node
                .recipe()
                .inputs()
                .iter()
                .filter(|input| {
                    !catalog
                        .recipes_involving(
                            &input.name,
                            Role::PrimaryProducer,
                            &options.excluded_machines,
                        )
                        .is_empty()
                })
                .map(|input| input.name.as_str())
                .collect();
            assert_eq!(children, producible, "children of {}", node.recipe().name());
        }
    }

    #[test]
    fn subtree_planner_missing_good() {
        let catalog = widget_catalog();
        let mut planner = widget_planner(&catalog);
        assert!(planner.subtree_as_new_planner("Gizmo").is_err());
    }

    #[test]
    fn tally_rounds_each_node_up() {
        let catalog = diamond_catalog();
        let mut planner = Planner::from_name(&catalog, "Assemble Kit").unwrap();
        planner.build(&Simplest, &BuildOptions::default());
        planner.scale("Kit", 3.0).unwrap();

        let mut expected: BTreeMap<String, u64> = BTreeMap::new();
        for (id, _) in planner.pre_order() {
            let node = &planner.tree()[id];
            *expected
                .entry(node.recipe().machine_type().to_string())
                .or_default() += node.instance_count().ceil() as u64;
        }
        assert_eq!(planner.tally_machines(), expected);
    }
}
