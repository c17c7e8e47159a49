use serde::{Deserialize, Serialize};

/// Reference row: an ingredient and its display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
}

/// Storage-side meal row. `external_id` is the stable identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub external_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// Comma-separated tag list.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

impl Meal {
    /// Public recipe id: the stringified external id.
    pub fn id_meal(&self) -> String {
        self.external_id.to_string()
    }
}

/// Join row between a meal and an ingredient.
///
/// Row order within a meal is the authored order and is surfaced
/// positionally, so every consumer must keep relation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealIngredient {
    pub meal_external_id: i64,
    pub ingredient_id: i64,
    #[serde(default)]
    pub measure: Option<String>,
}

/// The three flat relations a catalog source supplies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogData {
    pub meals: Vec<Meal>,
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "mealIngredients", alias = "meal_ingredients")]
    pub meal_ingredients: Vec<MealIngredient>,
}

impl CatalogData {
    pub fn new(
        meals: Vec<Meal>,
        ingredients: Vec<Ingredient>,
        meal_ingredients: Vec<MealIngredient>,
    ) -> Self {
        Self {
            meals,
            ingredients,
            meal_ingredients,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}
