//! Assembly Data -- recipe catalogs and plan files on disk.
//!
//! Recipe catalogs and plan files are read from RON, JSON, or TOML (chosen by
//! file extension), validated, and turned into [`assembly_core`] values.

pub mod loader;
pub mod plan;
pub mod schema;

pub use loader::{DataLoadError, load_catalog, load_catalog_from_dir, load_recipes};
pub use plan::{RunError, load_plan};
