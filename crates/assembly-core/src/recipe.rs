//! Immutable recipe and ingredient value types.
//!
//! A [`Recipe`] converts a list of input goods into one or more output goods
//! at fixed per-minute rates for a single running machine. The first output is
//! the primary product; the optional second output is a byproduct.
//!
//! Recipes are constructed through [`RecipeBuilder`], which enforces the data
//! integrity rules every planner operation relies on: at least one output and
//! strictly positive, finite rates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

// ---------------------------------------------------------------------------
// Ingredient
// ---------------------------------------------------------------------------

/// A good consumed or produced by one running instance of a recipe, per minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub rate: f64,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, rate: f64) -> Self {
        Self {
            name: name.into(),
            rate,
        }
    }
}

/// Which ingredient list of a recipe to look in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data integrity errors
// ---------------------------------------------------------------------------

/// Data integrity violations detected while constructing a recipe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecipeError {
    #[error("recipe name is empty")]
    EmptyName,
    #[error("recipe '{recipe}' has no outputs")]
    NoOutputs { recipe: String },
    #[error("recipe '{recipe}' has invalid rate {rate} for '{good}' (must be positive)")]
    InvalidRate {
        recipe: String,
        good: String,
        rate: f64,
    },
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A named conversion run by a machine type. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    name: String,
    machine_type: String,
    cycle_time: f64,
    energy: f64,
    inputs: Vec<Ingredient>,
    outputs: Vec<Ingredient>,
}

impl Recipe {
    /// Start building a recipe run by `machine_type`.
    pub fn builder(name: impl Into<String>, machine_type: impl Into<String>) -> RecipeBuilder {
        RecipeBuilder {
            name: name.into(),
            machine_type: machine_type.into(),
            cycle_time: 0.0,
            energy: 0.0,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine_type(&self) -> &str {
        &self.machine_type
    }

    /// Seconds per crafting cycle.
    pub fn cycle_time(&self) -> f64 {
        self.cycle_time
    }

    /// Power draw of one running instance.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn inputs(&self) -> &[Ingredient] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Ingredient] {
        &self.outputs
    }

    /// The primary product (first output).
    pub fn product(&self) -> &Ingredient {
        // Non-empty outputs are guaranteed by `RecipeBuilder::build`.
        &self.outputs[0]
    }

    /// The byproduct (second output), if any.
    pub fn byproduct(&self) -> Option<&Ingredient> {
        self.outputs.get(1)
    }

    /// The input entry for `good`, if this recipe consumes it.
    pub fn input(&self, good: &str) -> Option<&Ingredient> {
        self.inputs.iter().find(|i| i.name == good)
    }

    /// The output entry for `good`, if this recipe produces it.
    pub fn output(&self, good: &str) -> Option<&Ingredient> {
        self.outputs.iter().find(|o| o.name == good)
    }

    pub fn consumes(&self, good: &str) -> bool {
        self.input(good).is_some()
    }

    /// Whether `good` appears anywhere in the outputs (product or byproduct).
    pub fn produces(&self, good: &str) -> bool {
        self.output(good).is_some()
    }

    /// Number of running instances needed to consume or produce `amount` of
    /// `good` per minute.
    pub fn required_instances(
        &self,
        direction: Direction,
        good: &str,
        amount: f64,
    ) -> Result<f64, PlanError> {
        let entry = match direction {
            Direction::Input => self.input(good),
            Direction::Output => self.output(good),
        };
        entry
            .map(|ingredient| amount / ingredient.rate)
            .ok_or_else(|| PlanError::IngredientNotFound {
                recipe: self.name.clone(),
                direction,
                good: good.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// RecipeBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Recipe`]. Validation happens in [`RecipeBuilder::build`].
#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    name: String,
    machine_type: String,
    cycle_time: f64,
    energy: f64,
    inputs: Vec<Ingredient>,
    outputs: Vec<Ingredient>,
}

impl RecipeBuilder {
    pub fn cycle_time(mut self, seconds: f64) -> Self {
        self.cycle_time = seconds;
        self
    }

    pub fn energy(mut self, energy: f64) -> Self {
        self.energy = energy;
        self
    }

    /// Append an input consumed at `rate` per minute.
    pub fn input(mut self, good: impl Into<String>, rate: f64) -> Self {
        self.inputs.push(Ingredient::new(good, rate));
        self
    }

    /// Append an output produced at `rate` per minute. The first output added
    /// is the primary product.
    pub fn output(mut self, good: impl Into<String>, rate: f64) -> Self {
        self.outputs.push(Ingredient::new(good, rate));
        self
    }

    pub fn build(self) -> Result<Recipe, RecipeError> {
        if self.name.trim().is_empty() {
            return Err(RecipeError::EmptyName);
        }
        if self.outputs.is_empty() {
            return Err(RecipeError::NoOutputs { recipe: self.name });
        }
        if let Some(bad) = self
            .inputs
            .iter()
            .chain(self.outputs.iter())
            .find(|i| !(i.rate.is_finite() && i.rate > 0.0))
        {
            return Err(RecipeError::InvalidRate {
                recipe: self.name.clone(),
                good: bad.name.clone(),
                rate: bad.rate,
            });
        }

        Ok(Recipe {
            name: self.name,
            machine_type: self.machine_type,
            cycle_time: self.cycle_time,
            energy: self.energy,
            inputs: self.inputs,
            outputs: self.outputs,
        })
    }
}
