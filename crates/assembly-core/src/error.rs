use crate::recipe::Direction;

/// Errors raised by catalog lookups and planner operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// No recipe with this name exists in the catalog (case-insensitive).
    #[error("no such recipe '{0}'")]
    RecipeNotFound(String),

    /// No node in the tree has this good as its primary product.
    #[error("no node in the tree produces '{0}'")]
    ProductNotFound(String),

    /// A recipe does not list the good on the requested side.
    #[error("no {direction} named '{good}' in recipe '{recipe}'")]
    IngredientNotFound {
        recipe: String,
        direction: Direction,
        good: String,
    },

    /// A parent does not consume the primary product of one of its children.
    ///
    /// A tree produced by `build` always has this correspondence, so seeing
    /// this means the tree was corrupted. Treat it as fatal.
    #[error("corrupt production tree: recipe '{parent}' does not consume '{good}'")]
    InvariantViolation { parent: String, good: String },
}

impl PlanError {
    /// Whether this is a caller/data error (as opposed to tree corruption).
    pub fn is_not_found(&self) -> bool {
        !matches!(self, PlanError::InvariantViolation { .. })
    }
}
