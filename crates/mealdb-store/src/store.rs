use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{Connection, params};
use serde::Serialize;

use mealdb_core::{CatalogData, CatalogSource, Ingredient, Meal, MealIngredient};

use crate::error::{Result, StoreError};
use crate::schema;

/// Rows written by one `seed` call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub meals: usize,
    pub ingredients: usize,
    pub links: usize,
}

/// Current row counts per table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub meals: i64,
    pub ingredients: i64,
    pub links: i64,
}

/// SQLite-backed catalog: the queryable counterpart of a bundled dataset.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::debug!("opened catalog store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Seed ---

    /// Upsert meals and ingredients by id and replace the links of every
    /// meal the batch mentions, keeping the batch's link order.
    pub fn seed(&self, data: &CatalogData) -> Result<SeedReport> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut upsert_meal = tx.prepare(
                "INSERT INTO meals (external_id, name, category, area, instructions, thumbnail_url, tags, youtube_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(external_id) DO UPDATE SET
                    name = excluded.name,
                    category = excluded.category,
                    area = excluded.area,
                    instructions = excluded.instructions,
                    thumbnail_url = excluded.thumbnail_url,
                    tags = excluded.tags,
                    youtube_url = excluded.youtube_url",
            )?;
            for meal in &data.meals {
                upsert_meal.execute(params![
                    meal.external_id,
                    meal.name,
                    meal.category,
                    meal.area,
                    meal.instructions,
                    meal.thumbnail_url,
                    meal.tags,
                    meal.youtube_url,
                ])?;
            }

            let mut upsert_ingredient = tx.prepare(
                "INSERT INTO ingredients (id, name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            )?;
            for ingredient in &data.ingredients {
                upsert_ingredient.execute(params![ingredient.id, ingredient.name])?;
            }

            let touched: BTreeSet<i64> = data
                .meals
                .iter()
                .map(|m| m.external_id)
                .chain(data.meal_ingredients.iter().map(|l| l.meal_external_id))
                .collect();
            let mut clear_links =
                tx.prepare("DELETE FROM meal_ingredients WHERE meal_external_id = ?1")?;
            for meal_id in &touched {
                clear_links.execute([meal_id])?;
            }

            let mut insert_link = tx.prepare(
                "INSERT INTO meal_ingredients (meal_external_id, ingredient_id, measure)
                 VALUES (?1, ?2, ?3)",
            )?;
            for link in &data.meal_ingredients {
                insert_link.execute(params![
                    link.meal_external_id,
                    link.ingredient_id,
                    link.measure,
                ])?;
            }
        }

        tx.commit()?;

        let report = SeedReport {
            meals: data.meals.len(),
            ingredients: data.ingredients.len(),
            links: data.meal_ingredients.len(),
        };
        tracing::info!(
            meals = report.meals,
            ingredients = report.ingredients,
            links = report.links,
            "seeded catalog"
        );
        Ok(report)
    }

    /// Remove every catalog row. Metadata is kept.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM meal_ingredients; DELETE FROM ingredients; DELETE FROM meals;",
        )?;
        Ok(())
    }

    // --- Load ---

    /// All three relations. Meals come back sorted by name, links in
    /// insertion order.
    pub fn load_catalog(&self) -> Result<CatalogData> {
        let meals = self.load_meals()?;
        let ingredients = self.load_ingredients()?;
        let meal_ingredients = self.load_links()?;
        tracing::debug!(
            meals = meals.len(),
            ingredients = ingredients.len(),
            links = meal_ingredients.len(),
            "loaded catalog"
        );
        Ok(CatalogData::new(meals, ingredients, meal_ingredients))
    }

    fn load_meals(&self) -> Result<Vec<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT external_id, name, category, area, instructions, thumbnail_url, tags, youtube_url
             FROM meals ORDER BY name, external_id",
        )?;
        let meals = stmt
            .query_map([], |row| {
                Ok(Meal {
                    external_id: row.get(0)?,
                    name: row.get(1)?,
                    category: row.get(2)?,
                    area: row.get(3)?,
                    instructions: row.get(4)?,
                    thumbnail_url: row.get(5)?,
                    tags: row.get(6)?,
                    youtube_url: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(meals)
    }

    fn load_ingredients(&self) -> Result<Vec<Ingredient>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM ingredients ORDER BY id")?;
        let ingredients = stmt
            .query_map([], |row| {
                Ok(Ingredient {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ingredients)
    }

    fn load_links(&self) -> Result<Vec<MealIngredient>> {
        let mut stmt = self.conn.prepare(
            "SELECT meal_external_id, ingredient_id, measure FROM meal_ingredients ORDER BY seq",
        )?;
        let links = stmt
            .query_map([], |row| {
                Ok(MealIngredient {
                    meal_external_id: row.get(0)?,
                    ingredient_id: row.get(1)?,
                    measure: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(links)
    }

    /// Single meal row, if present.
    pub fn get_meal(&self, external_id: i64) -> Result<Option<Meal>> {
        let mut stmt = self.conn.prepare(
            "SELECT external_id, name, category, area, instructions, thumbnail_url, tags, youtube_url
             FROM meals WHERE external_id = ?1",
        )?;
        let mut rows = stmt.query([external_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(Meal {
                external_id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                area: row.get(3)?,
                instructions: row.get(4)?,
                thumbnail_url: row.get(5)?,
                tags: row.get(6)?,
                youtube_url: row.get(7)?,
            })),
            None => Ok(None),
        }
    }

    pub fn counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<i64> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n)
        };
        Ok(TableCounts {
            meals: count("meals")?,
            ingredients: count("ingredients")?,
            links: count("meal_ingredients")?,
        })
    }

    /// Fail if the store holds no meals. Used before serving queries.
    pub fn verify_seeded(&self) -> Result<TableCounts> {
        let counts = self.counts()?;
        if counts.meals == 0 {
            return Err(StoreError::InvalidData(
                "catalog is empty; run `mealdb seed` first".to_string(),
            ));
        }
        Ok(counts)
    }
}

impl CatalogSource for Store {
    type Error = StoreError;

    fn load(&self) -> Result<CatalogData> {
        self.load_catalog()
    }
}
