//! Filesystem boundary: dataset directories and preference profile files.

use std::path::{Path, PathBuf};
use std::{env, fs};

use mealdb_core::{CatalogData, PreferenceProfile, RawPreferences, StaticCatalog};

use crate::error::{Result, StoreError};

const MEALS_FILE: &str = "meals.json";
const INGREDIENTS_FILE: &str = "ingredients.json";
const LINKS_FILE: &str = "meal_ingredients.json";
const BUNDLE_FILE: &str = "catalog.json";

/// Default base directory for mealdb data.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".mealdb")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })
}

/// Load a dataset from a directory holding either the three relation files
/// (`meals.json`, `ingredients.json`, `meal_ingredients.json`) or a single
/// `catalog.json` bundle. A path to a bundle file is accepted too.
pub fn load_dataset_dir(path: &Path) -> Result<CatalogData> {
    if path.is_file() {
        let source = StaticCatalog::from_json(&read(path)?)?;
        return Ok(source.data().clone());
    }

    let bundle = path.join(BUNDLE_FILE);
    if bundle.is_file() {
        tracing::debug!("loading bundled catalog {}", bundle.display());
        let source = StaticCatalog::from_json(&read(&bundle)?)?;
        return Ok(source.data().clone());
    }

    let meals = read(&path.join(MEALS_FILE))?;
    let ingredients = read(&path.join(INGREDIENTS_FILE))?;
    let links = read(&path.join(LINKS_FILE))?;
    let source = StaticCatalog::from_json_parts(&meals, &ingredients, &links)?;
    Ok(source.data().clone())
}

/// Parse a preference payload. TOML when `is_toml`, JSON otherwise.
///
/// Unknown allergen ids are dropped with a warning rather than failing the
/// whole profile.
pub fn parse_profile(content: &str, is_toml: bool) -> Result<PreferenceProfile> {
    let raw: RawPreferences = if is_toml {
        toml::from_str(content)
            .map_err(|e| StoreError::InvalidData(format!("invalid preferences TOML: {e}")))?
    } else {
        serde_json::from_str(content)
            .map_err(|e| StoreError::InvalidData(format!("invalid preferences JSON: {e}")))?
    };

    let (profile, unknown) = PreferenceProfile::from_raw(raw);
    for id in &unknown {
        tracing::warn!("ignoring unknown allergen '{id}' in preferences");
    }
    Ok(profile)
}

/// Load a preference profile file; the extension picks the format.
pub fn load_profile(path: &Path) -> Result<PreferenceProfile> {
    let content = read(path)?;
    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    parse_profile(&content, is_toml)
}
