//! Integration tests exercising the full engine pipeline:
//! load → index → query → preferences → sample, across module boundaries.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use mealdb_core::{
    ALL, AllergenId, CatalogIndex, CatalogSource, Ingredient, Meal, MealIngredient,
    PreferenceProfile, QueryEngine, Recipe, RecipeQuery, StaticCatalog, apply_preferences,
    get_recipe_by_id, sample_with,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const CATALOG: &str = r#"{
  "meals": [
    {"external_id": 52772, "name": "Teriyaki Chicken Casserole", "category": "Chicken", "area": "Japanese",
     "instructions": "Preheat oven to 350.\nCombine soy sauce and sugar.", "thumbnail_url": "t1", "tags": "Meat,Casserole"},
    {"external_id": 52773, "name": "Honey Teriyaki Salmon", "category": "Seafood", "area": "Japanese",
     "instructions": "Mix honey and soy sauce.", "thumbnail_url": "t2"},
    {"external_id": 52774, "name": "Pad See Ew", "category": "Chicken", "area": "Thai",
     "instructions": "Fry the noodles.", "thumbnail_url": "t3"},
    {"external_id": 52775, "name": "Vegan Lasagna", "category": "Vegan", "area": "Italian",
     "instructions": "Layer and bake.", "thumbnail_url": "t4"},
    {"external_id": 52776, "name": "Baba Ghanoush", "category": "Vegetarian", "area": "Egyptian",
     "instructions": "Roast the eggplant.", "thumbnail_url": "t5"}
  ],
  "ingredients": [
    {"id": 1, "name": "Soy Sauce"}, {"id": 2, "name": "Chicken"}, {"id": 3, "name": "Salmon"},
    {"id": 4, "name": "Rice Noodles"}, {"id": 5, "name": "Lasagne Sheets"}, {"id": 6, "name": "Eggplant"},
    {"id": 7, "name": "Garlic"}, {"id": 8, "name": "Honey"}
  ],
  "mealIngredients": [
    {"meal_external_id": 52772, "ingredient_id": 1, "measure": "3/4 cup"},
    {"meal_external_id": 52772, "ingredient_id": 2, "measure": "2 breasts"},
    {"meal_external_id": 52773, "ingredient_id": 3, "measure": "1 lb"},
    {"meal_external_id": 52773, "ingredient_id": 8, "measure": "2 tbs"},
    {"meal_external_id": 52773, "ingredient_id": 1, "measure": "2 tbs"},
    {"meal_external_id": 52774, "ingredient_id": 4, "measure": "200g"},
    {"meal_external_id": 52774, "ingredient_id": 2, "measure": "1"},
    {"meal_external_id": 52775, "ingredient_id": 5, "measure": "1 pack"},
    {"meal_external_id": 52775, "ingredient_id": 7, "measure": null},
    {"meal_external_id": 52776, "ingredient_id": 6, "measure": "2"},
    {"meal_external_id": 52776, "ingredient_id": 7, "measure": "1 clove"},
    {"meal_external_id": 99999, "ingredient_id": 7, "measure": "orphan"}
  ]
}"#;

fn index() -> CatalogIndex {
    StaticCatalog::from_json(CATALOG).unwrap().load_index().unwrap()
}

fn ids(recipes: &[Recipe]) -> Vec<&str> {
    recipes.iter().map(|r| r.id_meal.as_str()).collect()
}

/// The two-meal scenario: category preference, harmless allergen, exclusion.
#[test]
fn two_meal_scenario() {
    let index = CatalogIndex::build(
        vec![
            Meal {
                external_id: 1,
                name: "Spicy Beef".into(),
                category: "Beef".into(),
                area: "Ethiopian".into(),
                instructions: "Cook it".into(),
                thumbnail_url: "url".into(),
                tags: None,
                youtube_url: None,
            },
            Meal {
                external_id: 2,
                name: "Vegetable Stew".into(),
                category: "Vegetarian".into(),
                area: "Ethiopian".into(),
                instructions: "Boil it".into(),
                thumbnail_url: "url".into(),
                tags: None,
                youtube_url: None,
            },
        ],
        ["Beef", "Chili", "Carrot", "Potato"]
            .iter()
            .enumerate()
            .map(|(i, n)| Ingredient { id: i as i64 + 1, name: n.to_string() })
            .collect(),
        [(1, 1), (1, 2), (2, 3), (2, 4)]
            .into_iter()
            .map(|(m, i)| MealIngredient { meal_external_id: m, ingredient_id: i, measure: None })
            .collect(),
    );
    let both = QueryEngine::run(&index, &RecipeQuery::new());

    let veg = PreferenceProfile {
        preferred_categories: BTreeSet::from(["Vegetarian".to_string()]),
        ..Default::default()
    };
    assert_eq!(ids(&apply_preferences(&index, both.clone(), Some(&veg))), ["2"]);

    let gluten = PreferenceProfile {
        allergens: BTreeSet::from([AllergenId::Gluten]),
        ..Default::default()
    };
    assert_eq!(ids(&apply_preferences(&index, both.clone(), Some(&gluten))), ["1", "2"]);

    let no_chili = PreferenceProfile {
        excluded_ingredients: BTreeSet::from(["chili".to_string()]),
        ..Default::default()
    };
    assert_eq!(ids(&apply_preferences(&index, both, Some(&no_chili))), ["2"]);
}

/// Search then filter, the way a search surface chains the two.
#[test]
fn search_then_preferences() {
    let index = index();
    let q = RecipeQuery::new().category("Chicken");
    let base = QueryEngine::run(&index, &q);
    assert_eq!(ids(&base), ["52772", "52774"]);

    let soy_free = PreferenceProfile {
        allergens: BTreeSet::from([AllergenId::Soy]),
        ..Default::default()
    };
    assert_eq!(ids(&apply_preferences(&index, base.clone(), Some(&soy_free))), ["52774"]);

    let gluten_free = PreferenceProfile {
        allergens: BTreeSet::from([AllergenId::Gluten]),
        ..Default::default()
    };
    assert_eq!(ids(&apply_preferences(&index, base, Some(&gluten_free))), ["52772"]);
}

#[test]
fn eggs_allergen_excludes_eggplant_dish() {
    let index = index();
    let all = QueryEngine::run(&index, &RecipeQuery::new());
    let profile = PreferenceProfile {
        allergens: BTreeSet::from([AllergenId::Eggs]),
        ..Default::default()
    };
    let out = apply_preferences(&index, all, Some(&profile));
    assert!(!ids(&out).contains(&"52776"));
    assert_eq!(out.len(), 4);
}

#[test]
fn fail_closed_unknown_ingredient() {
    let index = index();
    let q = RecipeQuery::new().category(ALL).area(ALL).ingredient("Unicorn Dust");
    assert!(QueryEngine::run(&index, &q).is_empty());
}

#[test]
fn detail_lookup_and_not_found() {
    let index = index();
    let recipe = get_recipe_by_id(&index, "52773").unwrap();
    assert_eq!(recipe.ingredient_lines(), ["1 lb Salmon", "2 tbs Honey", "2 tbs Soy Sauce"]);
    assert!(get_recipe_by_id(&index, "1").is_err());
}

#[test]
fn orphan_link_does_not_leak() {
    let index = index();
    assert_eq!(index.stats().orphan_links, 1);
    let q = RecipeQuery::new().ingredient("Garlic");
    assert_eq!(ids(&QueryEngine::run(&index, &q)), ["52775", "52776"]);
}

#[test]
fn recommendations_after_preferences() {
    let index = index();
    let all = QueryEngine::run(&index, &RecipeQuery::new());
    let profile = PreferenceProfile {
        preferred_areas: BTreeSet::from(["Japanese".to_string(), "Thai".to_string()]),
        ..Default::default()
    };
    let pool = apply_preferences(&index, all, Some(&profile));
    let picks = sample_with(pool.clone(), 2, &mut SmallRng::seed_from_u64(42));
    assert_eq!(picks.len(), 2);
    let pool_ids: HashSet<&str> = ids(&pool).into_iter().collect();
    assert!(ids(&picks).iter().all(|id| pool_ids.contains(id)));
}

#[test]
fn reload_rebuilds_index_and_keeps_old_snapshot() {
    let source = StaticCatalog::from_json(CATALOG).unwrap();
    let mut data = source.data().clone();
    data.meals.retain(|m| m.category != "Chicken");

    let previous = Arc::new(source.load_index().unwrap());
    let reader = Arc::clone(&previous);
    let current = Arc::new(StaticCatalog::new(data).load_index().unwrap());
    drop(previous);

    let chicken = RecipeQuery::new().category("Chicken");
    assert_eq!(QueryEngine::run(&reader, &chicken).len(), 2);
    assert!(QueryEngine::run(&current, &chicken).is_empty());

    let soy = RecipeQuery::new().ingredient("Soy Sauce");
    assert_eq!(ids(&QueryEngine::run(&reader, &soy)), ["52772", "52773"]);
    assert_eq!(ids(&QueryEngine::run(&current, &soy)), ["52773"]);

    assert!(get_recipe_by_id(&reader, "52772").is_ok());
    assert!(get_recipe_by_id(&current, "52772").is_err());
    assert!(current.stats().orphan_links > 0);
}

fn profile_strategy() -> impl Strategy<Value = PreferenceProfile> {
    let allergens = proptest::sample::subsequence(AllergenId::ALL.to_vec(), 0..3);
    let categories = proptest::sample::subsequence(
        vec!["Chicken", "Seafood", "Vegan", "Vegetarian", "Dessert"],
        0..3,
    );
    let excluded = proptest::sample::subsequence(vec!["garlic", "Honey", "chicken "], 0..2);
    (allergens, categories, excluded).prop_map(|(a, c, e)| PreferenceProfile {
        allergens: a.into_iter().collect(),
        preferred_categories: c.into_iter().map(str::to_string).collect(),
        excluded_ingredients: e.into_iter().map(str::to_string).collect(),
        ..Default::default()
    })
}

fn axis_strategy(values: Vec<&'static str>) -> impl Strategy<Value = String> {
    proptest::sample::select(values).prop_map(str::to_string)
}

proptest! {
    #[test]
    fn prop_no_profile_is_identity(text in "[a-z ]{0,4}") {
        let index = index();
        let recipes = QueryEngine::run(&index, &RecipeQuery::new().text(text));
        prop_assert_eq!(apply_preferences(&index, recipes.clone(), None), recipes);
    }

    #[test]
    fn prop_preferences_idempotent_and_narrowing(profile in profile_strategy()) {
        let index = index();
        let all = QueryEngine::run(&index, &RecipeQuery::new());
        let once = apply_preferences(&index, all.clone(), Some(&profile));
        let twice = apply_preferences(&index, once.clone(), Some(&profile));
        prop_assert_eq!(&once, &twice);

        // Subsequence of the input, order kept
        let mut it = all.iter();
        prop_assert!(once.iter().all(|r| it.any(|a| a == r)));
    }

    #[test]
    fn prop_axes_only_narrow(
        category in axis_strategy(vec!["All", "Chicken", "Seafood", "Vegan"]),
        area in axis_strategy(vec!["All", "Japanese", "Thai", "Italian"]),
        ingredient in axis_strategy(vec!["All", "Soy Sauce", "Garlic", "Chicken"]),
        text in axis_strategy(vec!["", "teriyaki", "a", "xyz"]),
    ) {
        let index = index();
        let combined = QueryEngine::run(
            &index,
            &RecipeQuery::new()
                .category(category.clone())
                .area(area.clone())
                .ingredient(ingredient.clone())
                .text(text.clone()),
        );
        let singles = [
            QueryEngine::run(&index, &RecipeQuery::new().category(category)),
            QueryEngine::run(&index, &RecipeQuery::new().area(area)),
            QueryEngine::run(&index, &RecipeQuery::new().ingredient(ingredient)),
            QueryEngine::run(&index, &RecipeQuery::new().text(text)),
        ];
        for recipe in &combined {
            for single in &singles {
                prop_assert!(single.contains(recipe));
            }
        }
    }
}
