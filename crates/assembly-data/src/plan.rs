//! Plan execution: turns a plan file into a built and scaled planner.
//!
//! A plan names a target recipe, a selection policy and build constraints,
//! an optional scale target, and follow-up sub-plans. Each sub-plan adopts the
//! first node producing its good and re-plans that subtree on its own, which
//! is how shared goods pruned during the main build get their own chain. A
//! sub-plan's scale target resizes the whole tree, not only its subtree.

use std::path::Path;

use assembly_core::{
    BuildOptions, Catalog, MachineFilter, MaxOutput, PlanError, Planner, PreferredNames,
    SelectionPolicy, Simplest,
};
use tracing::debug;

use crate::loader::{DataLoadError, deserialize_file};
use crate::schema::{PlanData, PolicyData, SubPlanData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while running a plan against a catalog.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The plan's target is not a recipe in the catalog.
    #[error("unknown target recipe '{0}'")]
    UnknownTarget(String),

    /// A sub-plan could not be extracted, built, or scaled.
    #[error("sub-plan for '{product}' failed: {source}")]
    SubPlan {
        product: String,
        #[source]
        source: PlanError,
    },

    /// The main plan could not be scaled.
    #[error(transparent)]
    Plan(#[from] PlanError),
}

// ===========================================================================
// Loading
// ===========================================================================

/// Read a plan file (RON, JSON, or TOML by extension).
pub fn load_plan(path: &Path) -> Result<PlanData, DataLoadError> {
    let plan: PlanData = deserialize_file(path)?;
    debug!(
        file = %path.display(),
        target = %plan.target,
        subplans = plan.subplans.len(),
        "loaded plan"
    );
    Ok(plan)
}

// ===========================================================================
// Resolution
// ===========================================================================

impl PolicyData {
    pub fn to_policy(&self) -> Box<dyn SelectionPolicy> {
        match self {
            PolicyData::Simplest => Box::new(Simplest),
            PolicyData::MaxOutput => Box::new(MaxOutput),
            PolicyData::PreferredNames(names) => {
                Box::new(PreferredNames::new(names.iter().cloned()))
            }
        }
    }
}

fn machine_filter(names: Option<&[String]>, inherited: &MachineFilter) -> MachineFilter {
    match names {
        Some(names) => names.iter().cloned().collect(),
        None => inherited.clone(),
    }
}

impl PlanData {
    pub fn build_options(&self) -> BuildOptions {
        let excluded =
            machine_filter(self.exclude_machines.as_deref(), &MachineFilter::default());
        BuildOptions::default()
            .with_excluded_machines(excluded)
            .with_seed_products(self.seed_products.iter().cloned())
            .with_max_depth(self.max_depth)
    }

    /// Build the target's tree, apply the scale target, then run every
    /// sub-plan in order against the same tree.
    pub fn run<'a>(&self, catalog: &'a Catalog) -> Result<Planner<'a>, RunError> {
        let mut planner = Planner::from_name(catalog, &self.target)
            .map_err(|_| RunError::UnknownTarget(self.target.clone()))?;

        let options = self.build_options();
        let nodes = planner.build(&*self.policy.to_policy(), &options);
        debug!(target = %self.target, nodes, "plan built");

        if let Some(scale) = &self.scale {
            planner.scale(&scale.good, scale.rate)?;
        }

        for sub in &self.subplans {
            sub.run(&mut planner, &self.policy, &options.excluded_machines)
                .map_err(|source| RunError::SubPlan {
                    product: sub.product.clone(),
                    source,
                })?;
        }

        Ok(planner)
    }
}

impl SubPlanData {
    /// Build options for this sub-plan; an omitted machine filter falls back
    /// to `inherited`.
    pub fn build_options(&self, inherited: &MachineFilter) -> BuildOptions {
        BuildOptions::default()
            .with_excluded_machines(machine_filter(self.exclude_machines.as_deref(), inherited))
            .with_seed_products(self.seed_products.iter().cloned())
            .with_max_depth(self.max_depth)
    }

    fn run(
        &self,
        planner: &mut Planner<'_>,
        inherited_policy: &PolicyData,
        inherited_filter: &MachineFilter,
    ) -> Result<usize, PlanError> {
        let mut sub = planner.subtree_as_new_planner(&self.product)?;
        let policy = self.policy.as_ref().unwrap_or(inherited_policy).to_policy();
        let nodes = sub.build(&*policy, &self.build_options(inherited_filter));

        if let Some(scale) = &self.scale {
            sub.scale(&scale.good, scale.rate)?;
        }
        debug!(product = %self.product, nodes, "sub-plan built");
        Ok(nodes)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
