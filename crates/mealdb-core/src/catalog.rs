use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::constants::MAX_INGREDIENT_SLOTS;
use crate::model::{CatalogData, Ingredient, Meal, MealIngredient};
use crate::normalize::normalize;

/// Row counts describing how much of the catalog is reachable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub meals: usize,
    pub ingredients: usize,
    pub links: usize,
    /// Links whose ingredient id has no ingredient row.
    pub unresolved_links: usize,
    /// Links pointing at a meal that is not in the catalog.
    pub orphan_links: usize,
    /// Links past the per-meal slot cap.
    pub truncated_links: usize,
}

/// Read-only lookup structures over the three catalog relations.
///
/// Built once per catalog load and never mutated afterwards; a reload
/// builds a fresh index and the consumer swaps its shared reference.
/// Dangling references are dropped during the build instead of failing.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    meals: Vec<Meal>,
    meal_positions: HashMap<i64, usize>,
    ingredient_names: HashMap<i64, String>,
    ingredient_ids_by_name: HashMap<String, i64>,
    /// First MAX_INGREDIENT_SLOTS links per meal, relation order.
    links_by_meal: HashMap<i64, Vec<MealIngredient>>,
    /// Normalized names for the capped links that resolve.
    names_by_meal: HashMap<i64, Vec<String>>,
    /// Every meal linked to an ingredient, uncapped.
    meals_by_ingredient: HashMap<i64, HashSet<i64>>,
    stats: CatalogStats,
}

impl CatalogIndex {
    pub fn build(
        meals: Vec<Meal>,
        ingredients: Vec<Ingredient>,
        meal_ingredients: Vec<MealIngredient>,
    ) -> Self {
        let mut index = CatalogIndex::default();

        // A repeated id replaces the earlier row but keeps its position,
        // matching how the store upserts
        for meal in meals {
            match index.meal_positions.get(&meal.external_id) {
                Some(&pos) => index.meals[pos] = meal,
                None => {
                    index
                        .meal_positions
                        .insert(meal.external_id, index.meals.len());
                    index.meals.push(meal);
                }
            }
        }

        for ingredient in &ingredients {
            index
                .ingredient_names
                .insert(ingredient.id, ingredient.name.clone());
        }
        // Lowest row position wins for display-name lookups, among rows that
        // survived the id dedup
        for ingredient in &ingredients {
            if index.ingredient_names.get(&ingredient.id) == Some(&ingredient.name) {
                index
                    .ingredient_ids_by_name
                    .entry(ingredient.name.clone())
                    .or_insert(ingredient.id);
            }
        }

        let mut stats = CatalogStats {
            meals: index.meals.len(),
            ingredients: index.ingredient_names.len(),
            links: meal_ingredients.len(),
            ..CatalogStats::default()
        };

        for link in meal_ingredients {
            if !index.meal_positions.contains_key(&link.meal_external_id) {
                stats.orphan_links += 1;
                continue;
            }

            let resolved = index.ingredient_names.get(&link.ingredient_id);
            if resolved.is_none() {
                stats.unresolved_links += 1;
            }

            index
                .meals_by_ingredient
                .entry(link.ingredient_id)
                .or_default()
                .insert(link.meal_external_id);

            let slots = index
                .links_by_meal
                .entry(link.meal_external_id)
                .or_default();
            if slots.len() >= MAX_INGREDIENT_SLOTS {
                stats.truncated_links += 1;
                continue;
            }

            if let Some(name) = resolved {
                index
                    .names_by_meal
                    .entry(link.meal_external_id)
                    .or_default()
                    .push(normalize(name));
            }
            slots.push(link);
        }

        index.stats = stats;
        index
    }

    pub fn from_data(data: CatalogData) -> Self {
        Self::build(data.meals, data.ingredients, data.meal_ingredients)
    }

    /// Normalized ingredient names of a meal, in authored order.
    /// Empty for unknown meals.
    pub fn ingredient_names_for(&self, meal_id: i64) -> &[String] {
        self.names_by_meal
            .get(&meal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn ingredient_name(&self, ingredient_id: i64) -> Option<&str> {
        self.ingredient_names.get(&ingredient_id).map(String::as_str)
    }

    /// Resolve an exact display name to an ingredient id.
    pub fn ingredient_id_by_name(&self, name: &str) -> Option<i64> {
        self.ingredient_ids_by_name.get(name).copied()
    }

    /// Meals linked to an ingredient at any position.
    pub fn meals_with_ingredient(&self, ingredient_id: i64) -> Option<&HashSet<i64>> {
        self.meals_by_ingredient.get(&ingredient_id)
    }

    /// Reachable links of a meal: at most MAX_INGREDIENT_SLOTS, relation order.
    pub fn links_for(&self, meal_id: i64) -> &[MealIngredient] {
        self.links_by_meal
            .get(&meal_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn meal(&self, meal_id: i64) -> Option<&Meal> {
        self.meal_positions.get(&meal_id).map(|&i| &self.meals[i])
    }

    /// All meals in catalog order.
    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    /// Distinct non-empty categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        distinct_sorted(self.meals.iter().map(|m| m.category.as_str()))
    }

    /// Distinct non-empty areas, sorted.
    pub fn areas(&self) -> Vec<String> {
        distinct_sorted(self.meals.iter().map(|m| m.area.as_str()))
    }

    /// Distinct ingredient display names, sorted.
    pub fn ingredient_display_names(&self) -> Vec<String> {
        distinct_sorted(self.ingredient_names.values().map(String::as_str))
    }

    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
