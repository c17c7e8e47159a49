//! Catalog sources: anything that can supply the three relations.

use crate::catalog::CatalogIndex;
use crate::error::{CatalogError, Result};
use crate::model::{CatalogData, Ingredient, Meal, MealIngredient};

/// Single data-access seam in front of the engine. Bundled datasets and
/// queryable stores both implement it; the engine only sees `CatalogData`.
pub trait CatalogSource {
    type Error: std::error::Error;

    fn load(&self) -> std::result::Result<CatalogData, Self::Error>;

    /// Load and index in one step.
    fn load_index(&self) -> std::result::Result<CatalogIndex, Self::Error> {
        Ok(CatalogIndex::from_data(self.load()?))
    }
}

/// In-memory dataset, typically parsed from bundled JSON.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    data: CatalogData,
}

impl StaticCatalog {
    pub fn new(data: CatalogData) -> Self {
        Self { data }
    }

    /// Parse a single `{ meals, ingredients, mealIngredients }` document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Parse the three relations from separate JSON arrays.
    pub fn from_json_parts(meals: &str, ingredients: &str, meal_ingredients: &str) -> Result<Self> {
        let meals: Vec<Meal> = serde_json::from_str(meals)
            .map_err(|e| CatalogError::InvalidData(format!("meals: {e}")))?;
        let ingredients: Vec<Ingredient> = serde_json::from_str(ingredients)
            .map_err(|e| CatalogError::InvalidData(format!("ingredients: {e}")))?;
        let meal_ingredients: Vec<MealIngredient> = serde_json::from_str(meal_ingredients)
            .map_err(|e| CatalogError::InvalidData(format!("meal_ingredients: {e}")))?;
        Ok(Self::new(CatalogData::new(meals, ingredients, meal_ingredients)))
    }

    pub fn data(&self) -> &CatalogData {
        &self.data
    }
}

impl CatalogSource for StaticCatalog {
    type Error = CatalogError;

    fn load(&self) -> Result<CatalogData> {
        Ok(self.data.clone())
    }
}

/// Serialize the three relations as one pretty-printed document.
pub fn export_json(data: &CatalogData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}
