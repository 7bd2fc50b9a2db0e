//! In-memory catalog accessor.
//!
//! Backs tests and the offline CLI path. A `BTreeMap` keeps names sorted so
//! `names_in_category` has the same stable ordering as the postgres
//! implementation (`ORDER BY name`).

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use bapsang_db::models::{Category, Dish};

use super::trait_def::CatalogAccessor;

/// Catalog accessor over a process-local map.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    dishes: Mutex<BTreeMap<String, Dish>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog pre-populated with the given dishes.
    pub fn with_dishes(dishes: impl IntoIterator<Item = Dish>) -> Self {
        let map = dishes
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect::<BTreeMap<_, _>>();
        Self {
            dishes: Mutex::new(map),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Dish>> {
        // A poisoned lock means a previous holder panicked; the map itself
        // is still structurally sound, so keep going.
        self.dishes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CatalogAccessor for MemoryCatalog {
    async fn list_all(&self) -> Result<Vec<Dish>> {
        Ok(self.lock().values().cloned().collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Dish>> {
        Ok(self.lock().get(name).cloned())
    }

    async fn upsert(&self, dish: &Dish) -> Result<()> {
        self.lock().insert(dish.name.clone(), dish.clone());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        self.lock().remove(name);
        Ok(())
    }

    async fn names_in_category(&self, category: Category) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .values()
            .filter(|d| d.category == category)
            .map(|d| d.name.clone())
            .collect())
    }
}
