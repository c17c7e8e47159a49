use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    // No foreign keys: dangling links are legal input and are dropped when
    // the index is built, not at insert time.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS meals (
            external_id   INTEGER PRIMARY KEY,
            name          TEXT NOT NULL,
            category      TEXT NOT NULL DEFAULT '',
            area          TEXT NOT NULL DEFAULT '',
            instructions  TEXT NOT NULL DEFAULT '',
            thumbnail_url TEXT NOT NULL DEFAULT '',
            tags          TEXT,
            youtube_url   TEXT
        );

        CREATE TABLE IF NOT EXISTS ingredients (
            id   INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- seq preserves authored order within a meal
        CREATE TABLE IF NOT EXISTS meal_ingredients (
            seq              INTEGER PRIMARY KEY AUTOINCREMENT,
            meal_external_id INTEGER NOT NULL,
            ingredient_id    INTEGER NOT NULL,
            measure          TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_mi_meal ON meal_ingredients(meal_external_id);
        CREATE INDEX IF NOT EXISTS idx_mi_ingredient ON meal_ingredients(ingredient_id);
        CREATE INDEX IF NOT EXISTS idx_meals_category ON meals(category);
        CREATE INDEX IF NOT EXISTS idx_meals_area ON meals(area);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    tracing::debug!("catalog schema v{SCHEMA_VERSION} ready");
    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}
