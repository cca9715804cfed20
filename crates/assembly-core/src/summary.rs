//! Whole-tree aggregation: machines, power, unsupplied inputs and byproducts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::planner::Planner;

/// Totals over every node of a planner's tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanSummary {
    /// Physical machines per machine type (instance counts rounded up per node).
    pub machines: BTreeMap<String, u64>,
    /// Sum of `instance_count * energy` over all nodes.
    pub power: f64,
    /// Per-minute demand for inputs that no child node supplies: raw goods,
    /// inputs of pruned duplicate leaves, and inputs below the depth limit.
    pub raw_inputs: BTreeMap<String, f64>,
    /// Per-minute byproduct output.
    pub byproducts: BTreeMap<String, f64>,
}

impl Planner<'_> {
    pub fn summarize(&self) -> PlanSummary {
        let mut summary = PlanSummary {
            machines: self.tally_machines(),
            ..PlanSummary::default()
        };

        for (id, _) in self.pre_order() {
            let node = &self.tree()[id];
            let count = node.instance_count();
            summary.power += count * node.recipe().energy();

            for input in node.recipe().inputs() {
                let supplied = node
                    .children()
                    .iter()
                    .any(|&child| self.tree()[child].product_name() == input.name);
                if !supplied {
                    *summary.raw_inputs.entry(input.name.clone()).or_default() +=
                        count * input.rate;
                }
            }

            if let Some((good, rate)) = node.byproduct_rate() {
                *summary.byproducts.entry(good.to_string()).or_default() += rate;
            }
        }

        summary
    }
}
