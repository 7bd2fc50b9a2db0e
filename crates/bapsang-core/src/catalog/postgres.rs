//! PostgreSQL-backed catalog accessor, delegating to the `bapsang-db`
//! query functions.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use bapsang_db::models::{Category, Dish};
use bapsang_db::queries::dishes;

use super::trait_def::CatalogAccessor;

/// Catalog accessor over the `dishes` table.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogAccessor for PgCatalog {
    async fn list_all(&self) -> Result<Vec<Dish>> {
        dishes::list_dishes(&self.pool).await
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Dish>> {
        dishes::get_dish(&self.pool, name).await
    }

    async fn upsert(&self, dish: &Dish) -> Result<()> {
        dishes::upsert_dish(&self.pool, dish).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        dishes::delete_dish(&self.pool, name).await
    }

    async fn names_in_category(&self, category: Category) -> Result<Vec<String>> {
        dishes::dish_names_in_category(&self.pool, category).await
    }
}
