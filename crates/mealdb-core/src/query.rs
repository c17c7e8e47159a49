use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::constants::ALL;
use crate::error::{CatalogError, Result};
use crate::model::Meal;
use crate::normalize::normalize;
use crate::recipe::{Projection, Recipe, build_recipe};

/// Result ordering. `Catalog` keeps catalog iteration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Catalog,
    Name,
}

/// Four AND-composed filter axes. `"All"` or empty leaves an axis open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeQuery {
    pub category: Option<String>,
    pub area: Option<String>,
    /// Exact ingredient display name.
    pub ingredient: Option<String>,
    /// Case-insensitive substring of the meal name.
    pub text: String,
    pub sort: SortOrder,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.ingredient = Some(ingredient.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn sorted_by_name(mut self) -> Self {
        self.sort = SortOrder::Name;
        self
    }

    /// True when any of category, area or ingredient constrains the result.
    pub fn has_active_filters(&self) -> bool {
        axis(&self.category).is_some()
            || axis(&self.area).is_some()
            || axis(&self.ingredient).is_some()
    }

    /// No text and no active axis. Search surfaces show nothing for a
    /// blank query rather than the whole catalog.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && !self.has_active_filters()
    }
}

/// Constrained value of an axis, or `None` for the sentinel/empty.
fn axis(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        None => None,
        Some(v) if v.is_empty() || v == ALL => None,
        Some(v) => Some(v),
    }
}

/// Stateless query processor over a CatalogIndex.
pub struct QueryEngine;

impl QueryEngine {
    /// Matching recipes in list projection.
    ///
    /// Never fails: unknown categories and areas simply match nothing, and an
    /// ingredient name that does not resolve empties the whole result.
    pub fn run(index: &CatalogIndex, query: &RecipeQuery) -> Vec<Recipe> {
        let mut meals = Self::matching_meals(index, query);
        if query.sort == SortOrder::Name {
            meals.sort_by_cached_key(|m| m.name.to_lowercase());
        }
        meals
            .into_iter()
            .map(|m| build_recipe(index, m, Projection::List))
            .collect()
    }

    /// Detail projection of a single recipe.
    pub fn get_by_id(index: &CatalogIndex, id_meal: &str) -> Result<Recipe> {
        id_meal
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| index.meal(id))
            .map(|meal| build_recipe(index, meal, Projection::Detail))
            .ok_or_else(|| CatalogError::NotFound(id_meal.to_string()))
    }

    /// Matching meal rows in catalog order.
    pub fn matching_meals<'a>(index: &'a CatalogIndex, query: &RecipeQuery) -> Vec<&'a Meal> {
        let category = axis(&query.category);
        let area = axis(&query.area);
        let text = normalize(&query.text);

        let linked: Option<&HashSet<i64>> = match axis(&query.ingredient) {
            None => None,
            Some(name) => {
                // Fail closed: filtering on something nonexistent is not "no filter"
                let Some(id) = index.ingredient_id_by_name(name) else {
                    return Vec::new();
                };
                match index.meals_with_ingredient(id) {
                    Some(meals) => Some(meals),
                    None => return Vec::new(),
                }
            }
        };

        index
            .meals()
            .iter()
            .filter(|m| category.is_none_or(|c| m.category == c))
            .filter(|m| area.is_none_or(|a| m.area == a))
            .filter(|m| linked.is_none_or(|ids| ids.contains(&m.external_id)))
            .filter(|m| text.is_empty() || m.name.to_lowercase().contains(&text))
            .collect()
    }
}
