//! Recipe filtering and preference-matching engine.
//!
//! Builds lookup structures over a meal catalog (meals, ingredients and their
//! ordered links), answers category/area/ingredient/text queries, reduces
//! results by a user's dietary preference profile, and samples
//! recommendations.
//!
//! Zero I/O: catalogs come in through [`CatalogSource`], results go out as
//! immutable [`Recipe`] values.

pub mod allergen;
pub mod catalog;
pub mod constants;
pub mod error;
pub mod model;
pub mod normalize;
pub mod preferences;
pub mod query;
pub mod recipe;
pub mod sampler;
pub mod shopping;
pub mod source;
pub mod suggest;
pub mod wire;

pub use allergen::{AllergenId, UnknownAllergen};
pub use catalog::{CatalogIndex, CatalogStats};
pub use constants::{ALL, DEFAULT_RECOMMENDATIONS, EXAMPLE_LIMIT, MAX_INGREDIENT_SLOTS, SUGGESTION_LIMIT};
pub use error::{CatalogError, Result};
pub use model::{CatalogData, Ingredient, Meal, MealIngredient};
pub use normalize::normalize;
pub use preferences::{
    ExclusionSet, PreferenceField, PreferenceProfile, RawPreferences, apply_preferences,
};
pub use query::{QueryEngine, RecipeQuery, SortOrder};
pub use recipe::{IngredientSlot, Projection, Recipe, build_recipe};
pub use sampler::{sample, sample_with};
pub use shopping::{ShoppingItem, shopping_items};
pub use source::{CatalogSource, StaticCatalog, export_json};
pub use suggest::{examples, ingredient_examples, suggest};

/// Detail projection of one recipe; `NotFound` if the id does not resolve.
pub fn get_recipe_by_id(index: &CatalogIndex, id_meal: &str) -> Result<Recipe> {
    QueryEngine::get_by_id(index, id_meal)
}
