//! Production chain example: build, scale, and split off a sub-plan.
//!
//! Plans a Heat Sink line with a preferred set of alternate recipes, treating
//! Aluminum Ingot as already supplied. The aluminum line is then extracted,
//! expanded on its own, and sized to the available bauxite, which resizes the
//! whole Heat Sink line to match.
//!
//! Run with: `cargo run -p assembly-core --example production_chain`

use assembly_core::*;
use tracing::Level;

fn recipe(name: &str, machine: &str, inputs: &[(&str, f64)], outputs: &[(&str, f64)]) -> Recipe {
    let mut builder = Recipe::builder(name, machine);
    for &(good, rate) in inputs {
        builder = builder.input(good, rate);
    }
    for &(good, rate) in outputs {
        builder = builder.output(good, rate);
    }
    builder.build().expect("example recipes are valid")
}

fn catalog() -> Catalog {
    Catalog::new([
        recipe(
            "Heat Sink",
            "Assembler",
            &[("Alclad Aluminum Sheet", 37.5), ("Copper Sheet", 22.5)],
            &[("Heat Sink", 7.5)],
        ),
        recipe(
            "Alclad Aluminum Sheet",
            "Assembler",
            &[("Aluminum Ingot", 30.0), ("Copper Ingot", 10.0)],
            &[("Alclad Aluminum Sheet", 30.0)],
        ),
        recipe("Copper Sheet", "Constructor", &[("Copper Ingot", 20.0)], &[("Copper Sheet", 10.0)]),
        recipe("Copper Ingot", "Smelter", &[("Copper Ore", 30.0)], &[("Copper Ingot", 30.0)]),
        recipe(
            "Aluminum Ingot",
            "Foundry",
            &[("Aluminum Scrap", 90.0), ("Silica", 75.0)],
            &[("Aluminum Ingot", 60.0)],
        ),
        recipe(
            "Pure Aluminum Ingot",
            "Smelter",
            &[("Aluminum Scrap", 60.0)],
            &[("Aluminum Ingot", 30.0)],
        ),
        recipe(
            "Aluminum Scrap",
            "Refinery",
            &[("Alumina Solution", 240.0), ("Coal", 120.0)],
            &[("Aluminum Scrap", 360.0), ("Water", 120.0)],
        ),
        recipe(
            "Alumina Solution",
            "Refinery",
            &[("Bauxite", 120.0), ("Water", 180.0)],
            &[("Alumina Solution", 120.0), ("Silica", 50.0)],
        ),
        recipe("Silica", "Constructor", &[("Raw Quartz", 22.5)], &[("Silica", 37.5)]),
        recipe("Bauxite Miner", "Miner", &[], &[("Bauxite", 120.0)]),
        recipe("Water Extractor", "Water Extractor", &[], &[("Water", 120.0)]),
        recipe("Packaged Water", "Packager", &[("Water", 60.0)], &[("Packaged Water", 60.0)]),
    ])
}

fn main() -> Result<(), PlanError> {
    let _ = tracing_subscriber::fmt().with_max_level(Level::DEBUG).try_init();

    let catalog = catalog();
    let policy = PreferredNames::new(["Pure Aluminum Ingot", "Copper Ingot", "Water Extractor"]);

    // --- Main line, with aluminum supplied from elsewhere ---

    let mut planner = Planner::from_name(&catalog, "Heat Sink")?;
    planner.build(
        &policy,
        &BuildOptions::default().with_seed_products(["Aluminum Ingot"]),
    );
    planner.scale("Heat Sink", 15.0)?;

    println!("{planner}\n");
    let summary = planner.summarize();
    println!("Machines:");
    for (machine, count) in &summary.machines {
        println!("  {machine}: {count}");
    }
    println!("Unsupplied inputs:");
    for (good, rate) in &summary.raw_inputs {
        println!("  {good}: {rate:.2}/min");
    }

    // --- Aluminum line, sized by the bauxite on hand ---

    let mut aluminum = planner.subtree_as_new_planner("Aluminum Ingot")?;
    aluminum.build(&policy, &BuildOptions::default());
    aluminum.scale("Bauxite", 240.0)?;

    println!("\n{aluminum}\n");
    for (machine, count) in aluminum.tally_machines() {
        println!("  {machine}: {count}");
    }
    drop(aluminum);

    // --- Whole factory, resized by the bauxite ---

    println!("\n{planner}\n");
    for (machine, count) in planner.tally_machines() {
        println!("  {machine}: {count}");
    }

    Ok(())
}
