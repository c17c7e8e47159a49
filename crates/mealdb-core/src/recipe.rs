use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::constants::MAX_INGREDIENT_SLOTS;
use crate::model::Meal;
use crate::wire::WireRecipe;

// List numbering only counts when followed by whitespace, so "1.5 cups" survives
static STEP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:step\s*\d+\s*[:.)-]?\s*|\d+\s*[.)](?:\s+|$))").unwrap()
});
static STEP_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*step\s*\d+\s*$").unwrap());

/// Which fields `build_recipe` populates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    /// Browsing shape: no ingredient slots.
    List,
    /// Opened-recipe shape: up to MAX_INGREDIENT_SLOTS slots.
    Detail,
}

/// One positional ingredient/measure pair.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSlot {
    /// Display name; empty when the ingredient id did not resolve.
    pub name: String,
    pub measure: String,
}

/// Read-only recipe view model.
///
/// Serializes to the legacy `idMeal`/`strMeal`/`strIngredientN` shape so
/// existing consumers keyed on those names keep working.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "WireRecipe")]
pub struct Recipe {
    pub id_meal: String,
    pub name: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail: String,
    pub tags: Option<String>,
    pub youtube: Option<String>,
    /// Empty in the list projection; at most MAX_INGREDIENT_SLOTS entries.
    pub ingredients: Vec<IngredientSlot>,
}

impl Recipe {
    /// Integer meal id for index lookups. `None` if the id is not numeric.
    pub fn meal_id(&self) -> Option<i64> {
        self.id_meal.trim().parse().ok()
    }

    pub fn has_details(&self) -> bool {
        !self.ingredients.is_empty()
    }

    /// "measure name" per non-blank slot, as shown on the detail screen.
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .filter(|slot| !slot.name.trim().is_empty())
            .map(|slot| format!("{} {}", slot.measure.trim(), slot.name.trim()))
            .map(|line| line.trim().to_string())
            .collect()
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Instructions split into cooking-mode steps.
    /// Strips "STEP n" headers and "1." / "1)" numbering.
    pub fn steps(&self) -> Vec<String> {
        self.instructions
            .lines()
            .filter(|line| !STEP_ONLY.is_match(line))
            .map(|line| STEP_PREFIX.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Project a meal row into a recipe.
///
/// The detail projection walks the meal's reachable links in relation order;
/// a link whose ingredient does not resolve keeps its slot with an empty name.
pub fn build_recipe(index: &CatalogIndex, meal: &Meal, projection: Projection) -> Recipe {
    let ingredients = match projection {
        Projection::List => Vec::new(),
        Projection::Detail => index
            .links_for(meal.external_id)
            .iter()
            .take(MAX_INGREDIENT_SLOTS)
            .map(|link| IngredientSlot {
                name: index
                    .ingredient_name(link.ingredient_id)
                    .unwrap_or_default()
                    .to_string(),
                measure: link.measure.clone().unwrap_or_default(),
            })
            .collect(),
    };

    Recipe {
        id_meal: meal.id_meal(),
        name: meal.name.clone(),
        category: meal.category.clone(),
        area: meal.area.clone(),
        instructions: meal.instructions.clone(),
        thumbnail: meal.thumbnail_url.clone(),
        tags: meal.tags.clone(),
        youtube: meal.youtube_url.clone(),
        ingredients,
    }
}
