//! Database query functions for the `dishes` table.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{Category, Dish};

/// List every dish in the catalog, ordered by name.
pub async fn list_dishes(pool: &PgPool) -> Result<Vec<Dish>> {
    let dishes = sqlx::query_as::<_, Dish>("SELECT * FROM dishes ORDER BY name")
        .fetch_all(pool)
        .await
        .context("failed to list dishes")?;

    Ok(dishes)
}

/// Fetch a dish by its name.
pub async fn get_dish(pool: &PgPool, name: &str) -> Result<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>("SELECT * FROM dishes WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
        .context("failed to fetch dish")?;

    Ok(dish)
}

/// Insert or replace a dish record.
///
/// The name is the primary key; a conflicting insert replaces every other
/// column, so there is no partial-field patch at this level.
pub async fn upsert_dish(pool: &PgPool, dish: &Dish) -> Result<()> {
    sqlx::query(
        "INSERT INTO dishes (name, category, calories, protein, fat, carbs, sodium) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (name) DO UPDATE SET \
             category = EXCLUDED.category, \
             calories = EXCLUDED.calories, \
             protein = EXCLUDED.protein, \
             fat = EXCLUDED.fat, \
             carbs = EXCLUDED.carbs, \
             sodium = EXCLUDED.sodium",
    )
    .bind(&dish.name)
    .bind(dish.category)
    .bind(dish.calories)
    .bind(dish.protein)
    .bind(dish.fat)
    .bind(dish.carbs)
    .bind(dish.sodium)
    .execute(pool)
    .await
    .with_context(|| format!("failed to upsert dish {:?}", dish.name))?;

    Ok(())
}

/// Delete a dish by name. Deleting an absent name is a no-op.
pub async fn delete_dish(pool: &PgPool, name: &str) -> Result<()> {
    sqlx::query("DELETE FROM dishes WHERE name = $1")
        .bind(name)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete dish {name:?}"))?;

    Ok(())
}

/// List the names of every dish in one category, ordered by name.
///
/// The ordering makes the result stable within a call, which the plan
/// generator relies on for reproducible seeded sampling.
pub async fn dish_names_in_category(pool: &PgPool, category: Category) -> Result<Vec<String>> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT name FROM dishes WHERE category = $1 ORDER BY name")
            .bind(category)
            .fetch_all(pool)
            .await
            .with_context(|| format!("failed to list dishes in category {category}"))?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Count all dishes in the catalog.
pub async fn count_dishes(pool: &PgPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dishes")
        .fetch_one(pool)
        .await
        .context("failed to count dishes")?;

    Ok(count.0)
}
