//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::catalog::Catalog;
use crate::planner::Planner;
use crate::recipe::Recipe;

/// Relative tolerance used by [`assert_consistent`].
pub const TOLERANCE: f64 = 1e-9;

// ===========================================================================
// Recipe helper
// ===========================================================================

/// Build a recipe from `(good, rate)` lists. Panics on invalid data.
pub fn recipe(
    name: &str,
    machine: &str,
    inputs: &[(&str, f64)],
    outputs: &[(&str, f64)],
) -> Recipe {
    let mut builder = Recipe::builder(name, machine);
    for &(good, rate) in inputs {
        builder = builder.input(good, rate);
    }
    for &(good, rate) in outputs {
        builder = builder.output(good, rate);
    }
    builder.build().expect("fixture recipe must be valid")
}

// ===========================================================================
// Fixture catalogs
// ===========================================================================

/// Two-step chain: Ore -> Bar -> Widget.
pub fn widget_catalog() -> Catalog {
    Catalog::new([
        recipe("Smelt Ore", "Smelter", &[("Ore", 60.0)], &[("Bar", 30.0)]),
        recipe("Make Widget", "Assembler", &[("Bar", 20.0)], &[("Widget", 10.0)]),
    ])
}

/// Kit needs Frame and Motor, which both need Gear.
pub fn diamond_catalog() -> Catalog {
    Catalog::new([
        recipe(
            "Assemble Kit",
            "Assembler",
            &[("Frame", 2.0), ("Motor", 1.0)],
            &[("Kit", 1.0)],
        ),
        recipe("Make Frame", "Constructor", &[("Gear", 4.0)], &[("Frame", 10.0)]),
        recipe(
            "Make Motor",
            "Assembler",
            &[("Gear", 6.0), ("Wire", 3.0)],
            &[("Motor", 5.0)],
        ),
        recipe("Cut Gear", "Constructor", &[("Steel", 10.0)], &[("Gear", 20.0)]),
        recipe("Draw Wire", "Constructor", &[("Copper", 5.0)], &[("Wire", 15.0)]),
        recipe("Smelt Steel", "Smelter", &[("Iron Ore", 45.0)], &[("Steel", 15.0)]),
    ])
}

/// Seed and Fruit each need the other.
pub fn cyclic_catalog() -> Catalog {
    Catalog::new([
        recipe("Grow Seed", "Farm", &[("Fruit", 2.0)], &[("Seed", 4.0)]),
        recipe(
            "Grow Fruit",
            "Farm",
            &[("Seed", 1.0), ("Water", 10.0)],
            &[("Fruit", 3.0)],
        ),
    ])
}

/// A small slice of a Satisfactory-style recipe book, with alternates, a
/// byproduct, a no-input extractor, and packaging recipes.
pub fn factory_catalog() -> Catalog {
    Catalog::new([
        recipe("Iron Ingot", "Smelter", &[("Iron Ore", 30.0)], &[("Iron Ingot", 30.0)]),
        recipe("Iron Plate", "Constructor", &[("Iron Ingot", 30.0)], &[("Iron Plate", 20.0)]),
        recipe("Iron Rod", "Constructor", &[("Iron Ingot", 15.0)], &[("Iron Rod", 15.0)]),
        recipe("Screw", "Constructor", &[("Iron Rod", 10.0)], &[("Screw", 40.0)]),
        recipe("Cast Screw", "Constructor", &[("Iron Ingot", 12.5)], &[("Screw", 50.0)]),
        recipe(
            "Reinforced Iron Plate",
            "Assembler",
            &[("Iron Plate", 30.0), ("Screw", 60.0)],
            &[("Reinforced Iron Plate", 5.0)],
        ),
        recipe(
            "Rotor",
            "Assembler",
            &[("Iron Rod", 20.0), ("Screw", 100.0)],
            &[("Rotor", 4.0)],
        ),
        recipe(
            "Modular Frame",
            "Assembler",
            &[("Reinforced Iron Plate", 3.0), ("Iron Rod", 12.0)],
            &[("Modular Frame", 2.0)],
        ),
        recipe(
            "Alumina Solution",
            "Refinery",
            &[("Bauxite", 120.0), ("Water", 180.0)],
            &[("Alumina Solution", 120.0), ("Silica", 50.0)],
        ),
        recipe("Silica", "Constructor", &[("Raw Quartz", 22.5)], &[("Silica", 37.5)]),
        recipe("Silica Glass", "Smelter", &[("Silica", 30.0)], &[("Glass", 15.0)]),
        recipe("Water Extractor", "Water Extractor", &[], &[("Water", 120.0)]),
        recipe("Packaged Water", "Packager", &[("Water", 60.0)], &[("Packaged Water", 60.0)]),
        recipe(
            "Diluted Packaged Fuel",
            "Refinery",
            &[("Heavy Oil Residue", 30.0), ("Packaged Water", 60.0)],
            &[("Packaged Fuel", 60.0)],
        ),
    ])
}

/// A linear chain `Stage 0 <- Stage 1 <- ... <- Stage {len-1}` where every stage
/// has `fan_out` alternative recipes. Used by benchmarks.
pub fn chain_catalog(len: usize, fan_out: usize) -> Catalog {
    let mut recipes = Vec::with_capacity(len * fan_out);
    for stage in 0..len {
        for alt in 0..fan_out {
            let output = format!("Part {stage}");
            let mut builder = Recipe::builder(format!("Make Part {stage} v{alt}"), "Assembler")
                .output(output, 10.0 + alt as f64);
            if stage + 1 < len {
                builder = builder.input(format!("Part {}", stage + 1), 5.0 + alt as f64);
            }
            recipes.push(builder.build().expect("chain recipe must be valid"));
        }
    }
    Catalog::new(recipes)
}

// ===========================================================================
// Assertions
// ===========================================================================

/// Relative float comparison.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Assert that every non-root node produces exactly what its parent consumes.
pub fn assert_consistent(planner: &Planner<'_>) {
    for (id, depth) in planner.pre_order() {
        if depth == 0 {
            continue;
        }
        let child = &planner.tree()[id];
        let parent_id = child.parent().expect("non-root node has a parent");
        let parent = &planner.tree()[parent_id];
        let ingredient = parent
            .recipe()
            .input(child.product_name())
            .expect("parent consumes child's product");
        let produced = child.product_rate();
        let consumed = parent.instance_count() * ingredient.rate;
        assert!(
            approx_eq(produced, consumed),
            "{} produces {produced} {} but {} consumes {consumed}",
            child.recipe().name(),
            child.product_name(),
            parent.recipe().name(),
        );
    }
}
