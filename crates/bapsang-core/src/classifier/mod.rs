//! Dish classification through a generative text service.
//!
//! The classifier is best-effort enrichment, never a hard dependency: any
//! failure collapses to the documented default record through
//! [`classify_or_default`].

pub mod gemini;
pub mod response;
pub mod trait_def;

pub use gemini::GeminiClassifier;
pub use trait_def::{
    ClassifierError, DishClassifier, OfflineClassifier, classify_or_default, fallback_dish,
};
