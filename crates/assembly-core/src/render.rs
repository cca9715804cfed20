//! Text rendering of a production tree.
//!
//! ```text
//! Make Widget: Assembler x2.50 -> Widget @ 25.00
//! └─Smelt Ore: Smelter x1.67 -> Bar @ 50.00
//! ```

use std::fmt;

use crate::id::NodeId;
use crate::planner::Planner;

const ELBOW: &str = "└─";
const TEE: &str = "├─";
const PIPE: &str = "│ ";
const BLANK: &str = "  ";

impl fmt::Display for Planner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(self, self.root_id(), f, "", None)
    }
}

/// `last` is `None` for the root, otherwise whether the node is its parent's
/// last child.
fn write_node(
    planner: &Planner<'_>,
    id: NodeId,
    f: &mut fmt::Formatter<'_>,
    header: &str,
    last: Option<bool>,
) -> fmt::Result {
    let node = &planner.tree()[id];
    let recipe = node.recipe();

    match last {
        None => {}
        Some(true) => write!(f, "\n{header}{ELBOW}")?,
        Some(false) => write!(f, "\n{header}{TEE}")?,
    }
    write!(
        f,
        "{}: {} x{:.2} -> {} @ {:.2}",
        recipe.name(),
        recipe.machine_type(),
        node.instance_count(),
        node.product_name(),
        node.product_rate(),
    )?;
    if let Some((byproduct, rate)) = node.byproduct_rate() {
        write!(f, " + {byproduct} @ {rate:.2}")?;
    }

    let child_header = match last {
        None => String::new(),
        Some(true) => format!("{header}{BLANK}"),
        Some(false) => format!("{header}{PIPE}"),
    };
    let children = node.children();
    for (i, &child) in children.iter().enumerate() {
        write_node(planner, child, f, &child_header, Some(i + 1 == children.len()))?;
    }
    Ok(())
}
