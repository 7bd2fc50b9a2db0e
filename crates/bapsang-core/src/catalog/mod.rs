//! Catalog access: the trait boundary plus the postgres and in-memory
//! implementations.

pub mod memory;
pub mod postgres;
pub mod trait_def;

pub use memory::MemoryCatalog;
pub use postgres::PgCatalog;
pub use trait_def::CatalogAccessor;
