//! PostgreSQL persistence for the dish catalog.
//!
//! One table, `dishes`, keyed by dish name. Everything else in the system
//! treats this crate through the `CatalogAccessor` trait in `bapsang-core`;
//! the query functions here are the postgres half of that contract.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
