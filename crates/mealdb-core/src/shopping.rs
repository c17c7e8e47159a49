use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recipe::Recipe;

/// One shopping-list entry. Where the list is kept is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: Uuid,
    pub name: String,
    pub measure: String,
    pub checked: bool,
    #[serde(default)]
    pub recipe_id: Option<String>,
    #[serde(default)]
    pub recipe_name: Option<String>,
}

impl ShoppingItem {
    pub fn new(name: &str, measure: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            measure: measure.trim().to_string(),
            checked: false,
            recipe_id: None,
            recipe_name: None,
        }
    }
}

/// Unchecked items for every named ingredient slot of a detail recipe.
pub fn shopping_items(recipe: &Recipe) -> Vec<ShoppingItem> {
    recipe
        .ingredients
        .iter()
        .filter(|slot| !slot.name.trim().is_empty())
        .map(|slot| ShoppingItem {
            recipe_id: Some(recipe.id_meal.clone()),
            recipe_name: Some(recipe.name.clone()),
            ..ShoppingItem::new(&slot.name, &slot.measure)
        })
        .collect()
}
