use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::MachineFilter;

/// How many levels below the root `build` may expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MaxDepth {
    /// Expand until every branch reaches a raw input or a pruned duplicate.
    #[default]
    Unlimited,
    /// Expand at most this many levels. `Levels(0)` leaves the root childless.
    Levels(u32),
}

impl MaxDepth {
    /// Whether expansion must stop at this level.
    pub fn is_exhausted(self) -> bool {
        matches!(self, MaxDepth::Levels(0))
    }

    /// The budget for the next level down.
    pub fn descend(self) -> Self {
        match self {
            MaxDepth::Unlimited => MaxDepth::Unlimited,
            MaxDepth::Levels(n) => MaxDepth::Levels(n.saturating_sub(1)),
        }
    }
}

impl From<Option<u32>> for MaxDepth {
    fn from(levels: Option<u32>) -> Self {
        levels.map_or(MaxDepth::Unlimited, MaxDepth::Levels)
    }
}

/// Constraints for [`Planner::build`](crate::planner::Planner::build).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Machine types whose recipes are never chosen. Defaults to `{"Packager"}`.
    #[serde(default)]
    pub excluded_machines: MachineFilter,
    /// Products treated as already expanded before the build starts.
    #[serde(default)]
    pub seed_products: BTreeSet<String>,
    #[serde(default)]
    pub max_depth: MaxDepth,
}

impl BuildOptions {
    pub fn with_excluded_machines(mut self, excluded: MachineFilter) -> Self {
        self.excluded_machines = excluded;
        self
    }

    pub fn with_seed_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: impl Into<MaxDepth>) -> Self {
        self.max_depth = max_depth.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_never_exhausts() {
        let mut depth = MaxDepth::Unlimited;
        for _ in 0..10_000 {
            assert!(!depth.is_exhausted());
            depth = depth.descend();
        }
    }

    #[test]
    fn levels_count_down_to_zero() {
        let depth = MaxDepth::Levels(2);
        assert!(!depth.is_exhausted());
        assert!(!depth.descend().is_exhausted());
        assert!(depth.descend().descend().is_exhausted());
        assert!(depth.descend().descend().descend().is_exhausted());
    }

    #[test]
    fn defaults_exclude_packager_only() {
        let options = BuildOptions::default();
        assert!(options.excluded_machines.contains("Packager"));
        assert!(options.seed_products.is_empty());
        assert_eq!(options.max_depth, MaxDepth::Unlimited);
    }

    #[test]
    fn builder_methods() {
        let options = BuildOptions::default()
            .with_excluded_machines(MachineFilter::none())
            .with_seed_products(["Water"])
            .with_max_depth(Some(3u32));
        assert!(!options.excluded_machines.contains("Packager"));
        assert!(options.seed_products.contains("Water"));
        assert_eq!(options.max_depth, MaxDepth::Levels(3));
        assert_eq!(
            BuildOptions::default()
                .with_max_depth(None::<u32>)
                .max_depth,
            MaxDepth::Unlimited
        );
    }
}
