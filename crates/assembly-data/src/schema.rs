//! Serde data file structs for recipe catalogs and plan files.
//!
//! These structs define the on-disk format. They are deserialized from RON,
//! JSON, or TOML data files and then validated into core types by the loader
//! and the plan runner.

use assembly_core::{Recipe, RecipeError};
use serde::Deserialize;

// ===========================================================================
// Recipes
// ===========================================================================

/// One input or output of a recipe, as a per-minute rate.
///
/// Accepts `quantity` as an alias for `rate`; spreadsheet exports carry it
/// alongside a `raw_quantity` field, which is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientData {
    pub name: String,
    #[serde(alias = "quantity")]
    pub rate: f64,
}

/// A recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(alias = "machine_type")]
    pub machine: String,
    /// Seconds per crafting cycle.
    #[serde(default, alias = "cycle_time")]
    pub time: f64,
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub inputs: Vec<IngredientData>,
    pub outputs: Vec<IngredientData>,
}

impl TryFrom<RecipeData> for Recipe {
    type Error = RecipeError;

    fn try_from(data: RecipeData) -> Result<Self, Self::Error> {
        let mut builder = Recipe::builder(data.name, data.machine)
            .cycle_time(data.time)
            .energy(data.energy);
        for input in data.inputs {
            builder = builder.input(input.name, input.rate);
        }
        for output in data.outputs {
            builder = builder.output(output.name, output.rate);
        }
        builder.build()
    }
}

// ===========================================================================
// Plans
// ===========================================================================

/// Which recipe to pick when several produce the same good.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub enum PolicyData {
    /// Fewest inputs.
    #[default]
    Simplest,
    /// Highest primary-product rate.
    MaxOutput,
    /// Listed recipe names first, then highest primary-product rate.
    PreferredNames(Vec<String>),
}

/// Pin the node producing `good` to `rate` per minute.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScaleData {
    pub good: String,
    pub rate: f64,
}

/// A planning session: build a tree for `target`, optionally scale it, then
/// re-plan selected shared goods as independent sub-trees.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanData {
    /// Name of the root recipe.
    pub target: String,
    #[serde(default)]
    pub policy: PolicyData,
    /// Machine types never chosen for child nodes. Omitted means the default
    /// filter (`Packager`); an empty list excludes nothing.
    #[serde(default)]
    pub exclude_machines: Option<Vec<String>>,
    /// Goods treated as already expanded.
    #[serde(default)]
    pub seed_products: Vec<String>,
    /// Omitted means unlimited.
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub scale: Option<ScaleData>,
    #[serde(default)]
    pub subplans: Vec<SubPlanData>,
}

/// A follow-up plan for the first node producing `product`. Omitted policy
/// and machine filter are inherited from the enclosing plan.
#[derive(Debug, Clone, Deserialize)]
pub struct SubPlanData {
    pub product: String,
    #[serde(default)]
    pub policy: Option<PolicyData>,
    #[serde(default)]
    pub exclude_machines: Option<Vec<String>>,
    #[serde(default)]
    pub seed_products: Vec<String>,
    #[serde(default)]
    pub max_depth: Option<u32>,
    #[serde(default)]
    pub scale: Option<ScaleData>,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of recipes in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlRecipes {
    pub recipes: Vec<RecipeData>,
}

// ===========================================================================
// Tests
// ===========================================================================
