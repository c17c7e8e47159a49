//! Legacy recipe wire shape.
//!
//! Recipes travel as flat objects with `str`-prefixed keys and positional
//! `strIngredientN` / `strMeasureN` pairs (N = 1..=20). Internally the slots
//! are an ordered `Vec<IngredientSlot>`; this module is the only place the
//! positional keys exist.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::constants::MAX_INGREDIENT_SLOTS;
use crate::recipe::{IngredientSlot, Recipe};

#[derive(Deserialize, Debug)]
pub struct WireRecipe {
    #[serde(rename = "idMeal")]
    pub id_meal: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strTags", default)]
    pub tags: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    /// Positional slot keys; anything else is ignored, whatever its type.
    #[serde(flatten)]
    pub slots: HashMap<String, Value>,
}

impl WireRecipe {
    /// `None` if the key is absent; non-string values read as empty.
    fn take_slot(&mut self, key: &str) -> Option<String> {
        self.slots
            .remove(key)
            .map(|v| v.as_str().map(str::to_string).unwrap_or_default())
    }
}

impl From<WireRecipe> for Recipe {
    fn from(mut wire: WireRecipe) -> Self {
        let mut ingredients = Vec::new();
        for n in 1..=MAX_INGREDIENT_SLOTS {
            let Some(name) = wire.take_slot(&format!("strIngredient{n}")) else {
                continue;
            };
            let measure = wire
                .take_slot(&format!("strMeasure{n}"))
                .unwrap_or_default();
            ingredients.push(IngredientSlot { name, measure });
        }

        Recipe {
            id_meal: wire.id_meal,
            name: wire.name,
            category: wire.category.unwrap_or_default(),
            area: wire.area.unwrap_or_default(),
            instructions: wire.instructions.unwrap_or_default(),
            thumbnail: wire.thumbnail.unwrap_or_default(),
            tags: wire.tags,
            youtube: wire.youtube,
            ingredients,
        }
    }
}

impl Serialize for Recipe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(8 + self.ingredients.len() * 2))?;
        map.serialize_entry("idMeal", &self.id_meal)?;
        map.serialize_entry("strMeal", &self.name)?;
        map.serialize_entry("strCategory", &self.category)?;
        map.serialize_entry("strArea", &self.area)?;
        map.serialize_entry("strInstructions", &self.instructions)?;
        map.serialize_entry("strMealThumb", &self.thumbnail)?;
        map.serialize_entry("strTags", &self.tags)?;
        map.serialize_entry("strYoutube", &self.youtube)?;
        for (i, slot) in self.ingredients.iter().take(MAX_INGREDIENT_SLOTS).enumerate() {
            map.serialize_entry(&format!("strIngredient{}", i + 1), &slot.name)?;
            map.serialize_entry(&format!("strMeasure{}", i + 1), &slot.measure)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::two_meal_catalog;
    use crate::recipe::{Projection, build_recipe};

    #[test]
    fn test_detail_serializes_positional_keys() {
        let index = two_meal_catalog();
        let recipe = build_recipe(&index, index.meal(1).unwrap(), Projection::Detail);
        let json = serde_json::to_value(&recipe).unwrap();

        assert_eq!(json["idMeal"], "1");
        assert_eq!(json["strMeal"], "Spicy Beef");
        assert_eq!(json["strIngredient1"], "Beef");
        assert_eq!(json["strMeasure1"], "500g");
        assert_eq!(json["strIngredient2"], "Chili");
        assert!(json.get("strIngredient3").is_none());
        assert!(json["strTags"].is_null());
    }

    #[test]
    fn test_list_projection_has_no_positional_keys() {
        let index = two_meal_catalog();
        let recipe = build_recipe(&index, index.meal(2).unwrap(), Projection::List);
        let json = serde_json::to_value(&recipe).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.keys().any(|k| k.starts_with("strIngredient")));
    }

    #[test]
    fn test_parse_legacy_object() {
        let json = r#"{
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strCategory": "Chicken",
            "strArea": "Japanese",
            "strInstructions": "Preheat oven.",
            "strMealThumb": "https://img.example/52772.jpg",
            "strTags": "Meat,Casserole",
            "strYoutube": null,
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup",
            "strIngredient2": "water",
            "strMeasure2": null,
            "strSource": "ignored"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.meal_id(), Some(52772));
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].measure, "3/4 cup");
        assert_eq!(recipe.ingredients[1].measure, "");
        assert!(recipe.youtube.is_none());
    }

    #[test]
    fn test_parse_minimal_object() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"idMeal": "9", "strMeal": "Toast"}"#).unwrap();
        assert_eq!(recipe.category, "");
        assert!(!recipe.has_details());
    }

    #[test]
    fn test_parse_ignores_non_string_extras() {
        let json = r#"{
            "idMeal": "1",
            "strMeal": "X",
            "dateModified": 17000,
            "strCreativeCommonsConfirmed": false,
            "strIngredient1": "Flour",
            "strMeasure1": 200
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.name, "X");
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.ingredients[0].name, "Flour");
        assert_eq!(recipe.ingredients[0].measure, "");
    }
}
