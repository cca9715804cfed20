//! Immutable recipe catalog.
//!
//! The catalog is built once from an already-parsed list of recipes and never
//! mutated afterwards. Lookups preserve catalog (insertion) order.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::recipe::Recipe;

/// Machine type excluded from lookups unless the caller says otherwise.
pub const DEFAULT_EXCLUDED_MACHINE: &str = "Packager";

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// How a recipe must involve a good to match [`Catalog::recipes_involving`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The good is one of the recipe's inputs.
    Consumer,
    /// The good is one of the recipe's outputs (product or byproduct).
    Producer,
    /// The good is the recipe's primary product.
    PrimaryProducer,
    /// Consumer or producer.
    Either,
}

impl Role {
    fn matches(self, recipe: &Recipe, good: &str) -> bool {
        match self {
            Role::Consumer => recipe.consumes(good),
            Role::Producer => recipe.produces(good),
            Role::PrimaryProducer => recipe.product().name == good,
            Role::Either => recipe.consumes(good) || recipe.produces(good),
        }
    }
}

/// Set of machine types whose recipes are hidden from lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineFilter(BTreeSet<String>);

impl Default for MachineFilter {
    fn default() -> Self {
        Self::from_iter([DEFAULT_EXCLUDED_MACHINE])
    }
}

impl MachineFilter {
    /// A filter that excludes nothing.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, machine_type: &str) -> bool {
        self.0.contains(machine_type)
    }

    pub fn insert(&mut self, machine_type: impl Into<String>) -> bool {
        self.0.insert(machine_type.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for MachineFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable collection of recipes, shared read-only with production trees.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Arc<Recipe>>,
    /// Lowercased name -> index of the first recipe with that name.
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let recipes: Vec<Arc<Recipe>> = recipes.into_iter().map(Arc::new).collect();
        let mut by_name = HashMap::with_capacity(recipes.len());
        for (index, recipe) in recipes.iter().enumerate() {
            by_name.entry(recipe.name().to_lowercase()).or_insert(index);
        }
        Self { recipes, by_name }
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Iterate recipes in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.recipes.iter()
    }

    /// Case-insensitive exact lookup.
    pub fn lookup_by_name(&self, name: &str) -> Result<&Arc<Recipe>, PlanError> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.recipes[index])
            .ok_or_else(|| PlanError::RecipeNotFound(name.to_string()))
    }

    /// Look up several recipes by name. Fails on the first missing name.
    pub fn lookup_many<I, S>(&self, names: I) -> Result<Vec<Arc<Recipe>>, PlanError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| self.lookup_by_name(name.as_ref()).map(Arc::clone))
            .collect()
    }

    /// Recipes that involve `good` in the given role, skipping every recipe run
    /// by an excluded machine type. Results are in catalog order.
    pub fn recipes_involving(
        &self,
        good: &str,
        role: Role,
        exclude: &MachineFilter,
    ) -> Vec<Arc<Recipe>> {
        self.recipes
            .iter()
            .filter(|recipe| !exclude.contains(recipe.machine_type()))
            .filter(|recipe| role.matches(recipe, good))
            .cloned()
            .collect()
    }
}

impl FromIterator<Recipe> for Catalog {
    fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
        Self::new(iter)
    }
}
