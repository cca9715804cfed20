//! Catalog loading: reads recipe data files, validates them, builds a catalog.
//!
//! Data files are RON, JSON, or TOML, picked by extension. The
//! deserialization helpers here are shared with the plan-file loader.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use assembly_core::{Catalog, Recipe, RecipeError};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::schema::RecipeData;

/// Base name of the recipe file looked up by [`load_catalog_from_dir`].
pub const RECIPES_FILE: &str = "recipes";

/// Top-level key holding the recipe array in TOML files.
pub const RECIPES_TOML_KEY: &str = "recipes";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors raised while reading recipe or plan data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// No `{file}.ron`, `{file}.toml`, or `{file}.json` exists in `dir`.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same data file exists in more than one format.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Two recipes share a name (compared case-insensitively).
    #[error("duplicate recipe name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// A recipe record violates data integrity.
    #[error("invalid recipe in {file}: {source}")]
    InvalidRecipe {
        file: PathBuf,
        #[source]
        source: RecipeError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

// ===========================================================================
// Formats
// ===========================================================================

/// Data file formats, told apart by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Every format, in the order a directory is searched.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let extension = path.extension().and_then(|ext| ext.to_str());
        Self::ALL
            .into_iter()
            .find(|format| extension == Some(format.extension()))
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// The single `{stem}.{ron,toml,json}` file in `dir`.
pub fn locate_data_file(dir: &Path, stem: &str) -> Result<PathBuf, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|format| dir.join(format!("{stem}.{}", format.extension())))
        .filter(|path| path.is_file());

    match (present.next(), present.next()) {
        (Some(path), None) => Ok(path),
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (None, _) => Err(DataLoadError::MissingRequired {
            file: stem.to_string(),
            dir: dir.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read `path` and deserialize it in the format named by its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    format.parse(&text).map_err(|detail| parse_error(path, detail))
}

/// Read a list of records. RON and JSON files hold the list itself; TOML has
/// no top-level arrays, so the list sits under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    match Format::from_path(path)? {
        Format::Ron | Format::Json => deserialize_file(path),
        Format::Toml => {
            let mut table: toml::Table = deserialize_file(path)?;
            let list = table
                .remove(toml_key)
                .ok_or_else(|| parse_error(path, format!("no '{toml_key}' array")))?;
            list.try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Catalog loading
// ===========================================================================

/// Record `name` as seen, returning a `DuplicateName` error if a recipe with
/// the same case-insensitive name was already recorded.
pub fn check_duplicate(
    seen: &mut HashSet<String>,
    name: &str,
    file: &Path,
) -> Result<(), DataLoadError> {
    if seen.insert(name.to_lowercase()) {
        Ok(())
    } else {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    }
}

/// Read and validate every recipe in a data file, in file order.
pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, DataLoadError> {
    let records: Vec<RecipeData> = deserialize_list(path, RECIPES_TOML_KEY)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut recipes = Vec::with_capacity(records.len());

    for record in records {
        check_duplicate(&mut seen, &record.name, path)?;
        let recipe = Recipe::try_from(record).map_err(|source| DataLoadError::InvalidRecipe {
            file: path.to_path_buf(),
            source,
        })?;
        recipes.push(recipe);
    }

    debug!(file = %path.display(), recipes = recipes.len(), "loaded recipes");
    Ok(recipes)
}

/// Load a catalog from a single recipe data file.
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    load_recipes(path).map(Catalog::new)
}

/// Load a catalog from the `recipes.{ron,toml,json}` file in `dir`.
pub fn load_catalog_from_dir(dir: &Path) -> Result<Catalog, DataLoadError> {
    let path = locate_data_file(dir, RECIPES_FILE)?;
    load_catalog(&path)
}

// ===========================================================================
// Tests
// ===========================================================================
