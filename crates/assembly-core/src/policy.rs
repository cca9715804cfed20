//! Recipe selection policies.
//!
//! When several recipes produce the same intermediate good, the planner asks a
//! [`SelectionPolicy`] to pick one. The planner never asks with zero
//! candidates; [`Candidates`] carries that guarantee in its type.
//!
//! Any `Fn(Candidates<'_>) -> Arc<Recipe>` closure is a policy, so callers can
//! inject domain logic without defining a type.

use std::collections::HashSet;
use std::sync::Arc;

use crate::recipe::Recipe;

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A non-empty, ordered list of alternative recipes for one good.
#[derive(Debug, Clone, Copy)]
pub struct Candidates<'a> {
    recipes: &'a [Arc<Recipe>],
}

impl<'a> Candidates<'a> {
    /// Wrap `recipes`, or return `None` if the list is empty.
    pub fn new(recipes: &'a [Arc<Recipe>]) -> Option<Self> {
        if recipes.is_empty() {
            None
        } else {
            Some(Self { recipes })
        }
    }

    pub fn first(&self) -> &'a Arc<Recipe> {
        &self.recipes[0]
    }

    pub fn as_slice(&self) -> &'a [Arc<Recipe>] {
        self.recipes
    }

    pub fn iter(&self) -> std::slice::Iter<'a, Arc<Recipe>> {
        self.recipes.iter()
    }

    /// The first candidate with the greatest key. Ties keep catalog order.
    pub fn max_by_key<K, F>(&self, mut key: F) -> &'a Arc<Recipe>
    where
        K: PartialOrd,
        F: FnMut(&Recipe) -> K,
    {
        let first = self.first();
        let mut best_key = key(first);
        let mut best = first;
        for recipe in &self.recipes[1..] {
            let k = key(recipe);
            if k > best_key {
                best = recipe;
                best_key = k;
            }
        }
        best
    }

    /// The first candidate with the smallest key. Ties keep catalog order.
    pub fn min_by_key<K, F>(&self, mut key: F) -> &'a Arc<Recipe>
    where
        K: PartialOrd,
        F: FnMut(&Recipe) -> K,
    {
        let first = self.first();
        let mut best_key = key(first);
        let mut best = first;
        for recipe in &self.recipes[1..] {
            let k = key(recipe);
            if k < best_key {
                best = recipe;
                best_key = k;
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// SelectionPolicy
// ---------------------------------------------------------------------------

/// Strategy choosing one recipe among alternative producers of a good.
pub trait SelectionPolicy {
    fn choose(&self, candidates: Candidates<'_>) -> Arc<Recipe>;
}

impl<F> SelectionPolicy for F
where
    F: Fn(Candidates<'_>) -> Arc<Recipe>,
{
    fn choose(&self, candidates: Candidates<'_>) -> Arc<Recipe> {
        self(candidates)
    }
}

/// Fewest input ingredients.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplest;

impl SelectionPolicy for Simplest {
    fn choose(&self, candidates: Candidates<'_>) -> Arc<Recipe> {
        Arc::clone(candidates.min_by_key(|r| r.inputs().len()))
    }
}

/// Highest primary-product rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxOutput;

impl SelectionPolicy for MaxOutput {
    fn choose(&self, candidates: Candidates<'_>) -> Arc<Recipe> {
        Arc::clone(candidates.max_by_key(|r| r.product().rate))
    }
}

/// Prefer recipes from an allow-list (exact names), then highest output.
///
/// Falls back to [`MaxOutput`] over every candidate when none is allowed.
#[derive(Debug, Clone, Default)]
pub struct PreferredNames {
    names: HashSet<String>,
}

impl PreferredNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, recipe_name: &str) -> bool {
        self.names.contains(recipe_name)
    }
}

impl SelectionPolicy for PreferredNames {
    fn choose(&self, candidates: Candidates<'_>) -> Arc<Recipe> {
        let allowed: Vec<Arc<Recipe>> = candidates
            .iter()
            .filter(|r| self.allows(r.name()))
            .cloned()
            .collect();
        match Candidates::new(&allowed) {
            Some(preferred) => MaxOutput.choose(preferred),
            None => MaxOutput.choose(candidates),
        }
    }
}
