//! Planning core: catalog access, dish classification, plan generation,
//! nutrient aggregation, and the two post-processing passes (diversity and
//! nutrient balance).
//!
//! Every component is injected with its collaborators: the catalog through
//! [`catalog::CatalogAccessor`], the generative classifier through
//! [`classifier::DishClassifier`], and randomness through a caller-supplied
//! [`rand::Rng`] so seeded runs are reproducible. The shared interchange
//! shape is [`plan::MealPlan`]; nothing in this crate knows about
//! spreadsheets or terminals.

pub mod catalog;
pub mod classifier;
pub mod nutrition;
pub mod plan;
