//! The `CatalogAccessor` trait -- the seam between the planning core and
//! the dish store.
//!
//! Every core component takes `&dyn CatalogAccessor` rather than a concrete
//! store, so tests run against [`super::MemoryCatalog`] and production runs
//! against [`super::PgCatalog`]. The trait is intentionally object-safe.

use anyhow::Result;
use async_trait::async_trait;

use bapsang_db::models::{Category, Dish};

/// Read/write operations over the dish catalog.
///
/// The store keys records by dish name; `upsert` replaces the whole record
/// on conflict, and single-row atomicity is the only transactional guarantee
/// callers may rely on. Writers must be serialized by the caller -- the core
/// does no locking of its own.
#[async_trait]
pub trait CatalogAccessor: Send + Sync {
    /// Every dish in the catalog.
    async fn list_all(&self) -> Result<Vec<Dish>>;

    /// Look up one dish by name. `Ok(None)` is a miss, not an error.
    async fn get_by_name(&self, name: &str) -> Result<Option<Dish>>;

    /// Insert or replace a dish record. Idempotent.
    async fn upsert(&self, dish: &Dish) -> Result<()>;

    /// Delete a dish by name. Deleting an absent name is a no-op.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Names of every dish in a category, in an order that is stable within
    /// one call. The plan generator samples from this list.
    async fn names_in_category(&self, category: Category) -> Result<Vec<String>>;
}

// Compile-time assertion: CatalogAccessor must be object-safe.
// If this line compiles, the trait can be used as `dyn CatalogAccessor`.
const _: () = {
    fn _assert_object_safe(_: &dyn CatalogAccessor) {}
};
