//! Assembly Core -- production chain planning for factory-building games.
//!
//! Given a catalog of recipes, this crate builds a dependency tree rooted at a
//! target recipe, picks one recipe among alternative producers of every
//! intermediate good, and computes how many machines each step needs to
//! sustain a chosen throughput anywhere in the tree.
//!
//! # Workflow
//!
//! ```rust,ignore
//! let catalog = Catalog::new(recipes);
//! let mut planner = Planner::from_name(&catalog, "Modular Frame")?;
//! planner.build(&Simplest, &BuildOptions::default());
//! planner.scale("Modular Frame", 10.0)?;
//! println!("{planner}");
//! let machines = planner.tally_machines();
//! ```
//!
//! # Key Types
//!
//! - [`recipe::Recipe`] -- Immutable conversion with per-minute input and
//!   output rates. The first output is the primary product.
//! - [`catalog::Catalog`] -- Immutable recipe collection with name and
//!   producer/consumer lookups.
//! - [`tree::ProductionTree`] -- Arena of [`tree::ProductionNode`]s keyed by
//!   [`id::NodeId`].
//! - [`policy::SelectionPolicy`] -- Picks one recipe among alternatives.
//! - [`planner::Planner`] -- Builds, scales, searches and aggregates a tree.

pub mod catalog;
pub mod error;
pub mod id;
pub mod options;
pub mod planner;
pub mod policy;
pub mod recipe;
pub mod render;
pub mod summary;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::{Catalog, MachineFilter, Role};
pub use error::PlanError;
pub use id::NodeId;
pub use options::{BuildOptions, MaxDepth};
pub use planner::Planner;
pub use policy::{Candidates, MaxOutput, PreferredNames, SelectionPolicy, Simplest};
pub use recipe::{Direction, Ingredient, Recipe, RecipeBuilder, RecipeError};
pub use summary::PlanSummary;
pub use tree::{ProductionNode, ProductionTree};
