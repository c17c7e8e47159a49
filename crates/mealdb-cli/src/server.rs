use std::sync::Arc;

use mealdb_core::{
    CatalogIndex, CatalogSource, DEFAULT_RECOMMENDATIONS, PreferenceProfile, QueryEngine,
    RawPreferences, Recipe, RecipeQuery, SortOrder, apply_preferences, get_recipe_by_id,
    sample_with,
};
use mealdb_store::Store;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct MealServer {
    state: Arc<Mutex<ServerState>>,
    tool_router: ToolRouter<Self>,
}

struct ServerState {
    store: Store,
    /// Current catalog snapshot. Handlers clone the Arc and query outside the
    /// lock; reload swaps in a new index without disturbing them.
    index: Arc<CatalogIndex>,
    rng: SmallRng,
}

impl MealServer {
    pub fn new(store: Store) -> mealdb_store::Result<Self> {
        let index = store.load_index()?;
        tracing::info!("loaded catalog with {} meals", index.len());
        Ok(Self {
            state: Arc::new(Mutex::new(ServerState {
                store,
                index: Arc::new(index),
                rng: SmallRng::from_os_rng(),
            })),
            tool_router: Self::tool_router(),
        })
    }

    async fn snapshot(&self) -> Arc<CatalogIndex> {
        Arc::clone(&self.state.lock().await.index)
    }

    fn recipes_json(recipes: &[Recipe]) -> serde_json::Value {
        serde_json::json!({
            "count": recipes.len(),
            "recipes": recipes,
        })
    }
}

fn json_result(value: &serde_json::Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )])
}

// --- Tool parameter types ---

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(default)]
struct PreferencesParam {
    /// Allergen ids to avoid: dairy, eggs, gluten, peanuts, tree_nuts, fish,
    /// shellfish, soy, sesame
    allergens: Vec<String>,
    /// Ingredient names to exclude (exact, case-insensitive)
    excluded_ingredients: Vec<String>,
    /// Keep only these categories when non-empty
    preferred_categories: Vec<String>,
    /// Keep only these areas when non-empty
    preferred_areas: Vec<String>,
}

impl PreferencesParam {
    /// Validated profile plus the allergen ids that were not recognized.
    fn into_profile(self) -> (PreferenceProfile, Vec<String>) {
        let (profile, unknown) = PreferenceProfile::from_raw(RawPreferences {
            allergens: self.allergens,
            excluded_ingredients: self.excluded_ingredients,
            preferred_categories: self.preferred_categories,
            preferred_areas: self.preferred_areas,
        });
        for id in &unknown {
            tracing::warn!("ignoring unknown allergen '{id}'");
        }
        (profile, unknown)
    }
}

fn resolve_preferences(
    prefs: Option<PreferencesParam>,
) -> (Option<PreferenceProfile>, Vec<String>) {
    match prefs {
        Some(p) => {
            let (profile, unknown) = p.into_profile();
            (Some(profile), unknown)
        }
        None => (None, Vec::new()),
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchRequest {
    /// Case-insensitive substring of the recipe name
    #[serde(default)]
    text: String,
    /// Exact category, "All" or omitted for any
    category: Option<String>,
    /// Exact area, "All" or omitted for any
    area: Option<String>,
    /// Exact ingredient name; an unknown name matches nothing
    ingredient: Option<String>,
    /// Sort by recipe name instead of catalog order
    #[serde(default)]
    sort_by_name: bool,
    /// Optional preference profile applied after the search
    preferences: Option<PreferencesParam>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetRequest {
    /// Recipe id (idMeal)
    id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RecommendRequest {
    /// Maximum number of recipes to return (default 10)
    count: Option<usize>,
    /// Optional preference profile the recommendations must respect
    preferences: Option<PreferencesParam>,
}

#[tool_router]
impl MealServer {
    #[tool(
        description = "Search recipes by name text and category, area or ingredient filters, optionally reduced by a dietary preference profile. A search with no text and no filters returns nothing. Returns recipes in list form (id, name, category, area, thumbnail)."
    )]
    async fn recipe_search(
        &self,
        Parameters(req): Parameters<SearchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = RecipeQuery {
            category: req.category,
            area: req.area,
            ingredient: req.ingredient,
            text: req.text,
            sort: if req.sort_by_name {
                SortOrder::Name
            } else {
                SortOrder::Catalog
            },
        };
        let (profile, ignored) = resolve_preferences(req.preferences);

        let recipes = if query.is_blank() {
            Vec::new()
        } else {
            let index = self.snapshot().await;
            let found = QueryEngine::run(&index, &query);
            apply_preferences(&index, found, profile.as_ref())
        };

        let mut result = Self::recipes_json(&recipes);
        if !ignored.is_empty() {
            result["ignoredAllergens"] = serde_json::json!(ignored);
        }
        Ok(json_result(&result))
    }

    #[tool(
        description = "Get one recipe in full: instructions, tags, video link and up to 20 ingredient/measure pairs."
    )]
    async fn recipe_get(
        &self,
        Parameters(req): Parameters<GetRequest>,
    ) -> Result<CallToolResult, McpError> {
        let index = self.snapshot().await;
        let recipe = get_recipe_by_id(&index, &req.id)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let value = serde_json::to_value(&recipe)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(json_result(&value))
    }

    #[tool(
        description = "Random recipe recommendations drawn from the whole catalog, respecting an optional preference profile."
    )]
    async fn recipe_recommend(
        &self,
        Parameters(req): Parameters<RecommendRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (profile, ignored) = resolve_preferences(req.preferences);
        let count = req.count.unwrap_or(DEFAULT_RECOMMENDATIONS);

        let index = self.snapshot().await;
        let candidates = QueryEngine::run(&index, &RecipeQuery::new());
        let candidates = apply_preferences(&index, candidates, profile.as_ref());
        let picked = {
            let mut state = self.state.lock().await;
            sample_with(candidates, count, &mut state.rng)
        };

        let mut result = Self::recipes_json(&picked);
        if !ignored.is_empty() {
            result["ignoredAllergens"] = serde_json::json!(ignored);
        }
        Ok(json_result(&result))
    }

    #[tool(
        description = "List the catalog's distinct categories, areas and ingredient names, sorted."
    )]
    async fn catalog_facets(&self) -> Result<CallToolResult, McpError> {
        let index = self.snapshot().await;
        Ok(json_result(&serde_json::json!({
            "categories": index.categories(),
            "areas": index.areas(),
            "ingredients": index.ingredient_display_names(),
        })))
    }

    #[tool(
        description = "Catalog statistics: stored row counts and index diagnostics (unresolved, orphaned and truncated ingredient links)."
    )]
    async fn catalog_stats(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let counts = state
            .store
            .counts()
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(json_result(&serde_json::json!({
            "stored": counts,
            "index": state.index.stats(),
        })))
    }

    #[tool(
        description = "Reload the catalog from the database after it has been re-seeded. Searches already running keep the previous snapshot."
    )]
    async fn catalog_reload(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let index = state
            .store
            .load_index()
            .map_err(|e| McpError::internal_error(format!("failed to reload catalog: {e}"), None))?;
        tracing::info!("reloaded catalog with {} meals", index.len());
        state.index = Arc::new(index);

        Ok(json_result(&serde_json::json!({
            "reloaded": true,
            "index": state.index.stats(),
        })))
    }
}

#[tool_handler]
impl ServerHandler for MealServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Recipe catalog with dietary preference filtering.\n\n\
                 - Use recipe_search to find recipes by name, category, area or a main ingredient. \
                   Pass a preferences object to drop recipes that contain the user's allergens or \
                   excluded ingredients, or that fall outside their preferred categories and areas.\n\
                 - Use recipe_get with an id from search results for instructions and ingredients.\n\
                 - Use recipe_recommend for a random selection that respects the same preferences.\n\
                 - catalog_facets lists valid category, area and ingredient values."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealdb_core::StaticCatalog;

    const CATALOG: &str = r#"{
        "meals": [
            {"external_id": 1, "name": "Spicy Beef", "category": "Beef", "area": "Ethiopian",
             "instructions": "STEP 1 Brown the beef.\nSTEP 2 Add chili.", "thumbnail_url": "b.jpg",
             "tags": "Spicy,Stew"},
            {"external_id": 2, "name": "Vegetable Stew", "category": "Vegetarian", "area": "British",
             "instructions": "Simmer.", "thumbnail_url": "v.jpg"},
            {"external_id": 3, "name": "Egg Fried Rice", "category": "Vegetarian", "area": "Chinese",
             "instructions": "Fry.", "thumbnail_url": "e.jpg"}
        ],
        "ingredients": [
            {"id": 10, "name": "Beef"}, {"id": 11, "name": "Chili"},
            {"id": 12, "name": "Carrot"}, {"id": 13, "name": "Eggs"}, {"id": 14, "name": "Rice"}
        ],
        "mealIngredients": [
            {"meal_external_id": 1, "ingredient_id": 10, "measure": "500g"},
            {"meal_external_id": 1, "ingredient_id": 11, "measure": "2"},
            {"meal_external_id": 2, "ingredient_id": 12, "measure": "3"},
            {"meal_external_id": 3, "ingredient_id": 13, "measure": "2"},
            {"meal_external_id": 3, "ingredient_id": 14, "measure": "1 cup"}
        ]
    }"#;

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        let data = StaticCatalog::from_json(CATALOG).unwrap().data().clone();
        store.seed(&data).unwrap();
        store
    }

    fn make_server() -> MealServer {
        MealServer::new(seeded_store()).unwrap()
    }

    fn text_from_result(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn parse_result(result: &CallToolResult) -> serde_json::Value {
        let text = text_from_result(result);
        serde_json::from_str(&text).expect("handler should return valid JSON")
    }

    fn search(text: &str) -> SearchRequest {
        SearchRequest {
            text: text.to_string(),
            category: None,
            area: None,
            ingredient: None,
            sort_by_name: false,
            preferences: None,
        }
    }

    fn names(json: &serde_json::Value) -> Vec<String> {
        json["recipes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["strMeal"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_search_by_text() {
        let server = make_server();
        let json = parse_result(&server.recipe_search(Parameters(search("stew"))).await.unwrap());
        assert_eq!(json["count"], 1);
        assert_eq!(names(&json), vec!["Vegetable Stew"]);
    }

    #[tokio::test]
    async fn test_blank_search_returns_nothing() {
        let server = make_server();
        let json = parse_result(&server.recipe_search(Parameters(search("  "))).await.unwrap());
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn test_search_category_with_preferences() {
        let server = make_server();
        let req = SearchRequest {
            category: Some("Vegetarian".to_string()),
            sort_by_name: true,
            preferences: Some(PreferencesParam {
                allergens: vec!["eggs".to_string(), "mustard".to_string()],
                ..Default::default()
            }),
            ..search("")
        };
        let json = parse_result(&server.recipe_search(Parameters(req)).await.unwrap());
        assert_eq!(names(&json), vec!["Vegetable Stew"]);
        assert_eq!(json["ignoredAllergens"], serde_json::json!(["mustard"]));
    }

    #[tokio::test]
    async fn test_search_unknown_ingredient_matches_nothing() {
        let server = make_server();
        let req = SearchRequest {
            ingredient: Some("Unicorn".to_string()),
            ..search("")
        };
        let json = parse_result(&server.recipe_search(Parameters(req)).await.unwrap());
        assert_eq!(json["count"], 0);
    }

    #[tokio::test]
    async fn test_get_detail() {
        let server = make_server();
        let json = parse_result(
            &server
                .recipe_get(Parameters(GetRequest { id: "1".to_string() }))
                .await
                .unwrap(),
        );
        assert_eq!(json["strMeal"], "Spicy Beef");
        assert_eq!(json["strIngredient1"], "Beef");
        assert_eq!(json["strMeasure2"], "2");
        assert_eq!(json["strTags"], "Spicy,Stew");
    }

    #[tokio::test]
    async fn test_get_missing_is_error() {
        let server = make_server();
        let result = server
            .recipe_get(Parameters(GetRequest { id: "999".to_string() }))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recommend_respects_preferences() {
        let server = make_server();
        let req = RecommendRequest {
            count: Some(10),
            preferences: Some(PreferencesParam {
                excluded_ingredients: vec!["beef".to_string()],
                ..Default::default()
            }),
        };
        let json = parse_result(&server.recipe_recommend(Parameters(req)).await.unwrap());
        let mut got = names(&json);
        got.sort();
        assert_eq!(got, vec!["Egg Fried Rice", "Vegetable Stew"]);
    }

    #[tokio::test]
    async fn test_recommend_reads_current_snapshot() {
        let server = make_server();
        let before = server.snapshot().await;

        {
            let state = server.state.lock().await;
            state.store.clear().unwrap();
        }
        server.catalog_reload().await.unwrap();

        let req = RecommendRequest {
            count: Some(10),
            preferences: None,
        };
        let json = parse_result(&server.recipe_recommend(Parameters(req)).await.unwrap());
        assert_eq!(json["count"], 0);
        // The lock is free again and the old snapshot is untouched
        assert!(server.state.try_lock().is_ok());
        assert_eq!(before.len(), 3);
    }

    #[tokio::test]
    async fn test_recommend_caps_count() {
        let server = make_server();
        let req = RecommendRequest {
            count: Some(2),
            preferences: None,
        };
        let json = parse_result(&server.recipe_recommend(Parameters(req)).await.unwrap());
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn test_facets() {
        let server = make_server();
        let json = parse_result(&server.catalog_facets().await.unwrap());
        assert_eq!(json["categories"], serde_json::json!(["Beef", "Vegetarian"]));
        assert_eq!(
            json["areas"],
            serde_json::json!(["British", "Chinese", "Ethiopian"])
        );
        assert_eq!(json["ingredients"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_stats_and_reload() {
        let server = make_server();
        let stats = parse_result(&server.catalog_stats().await.unwrap());
        assert_eq!(stats["stored"]["meals"], 3);
        assert_eq!(stats["index"]["links"], 5);

        {
            let state = server.state.lock().await;
            state.store.clear().unwrap();
        }
        // Snapshot is unchanged until reload
        let before = server.snapshot().await;
        assert_eq!(before.len(), 3);

        let json = parse_result(&server.catalog_reload().await.unwrap());
        assert_eq!(json["reloaded"], true);
        assert_eq!(json["index"]["meals"], 0);
        assert_eq!(before.len(), 3);
        assert!(server.snapshot().await.is_empty());
    }
}
