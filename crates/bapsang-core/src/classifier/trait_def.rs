//! The `DishClassifier` trait and its failure-is-fine wrapper.
//!
//! Implementors wrap a generative text service that estimates a category
//! and nutrient profile for a dish name, or invents whole new dish records.
//! The trait is object-safe so it can be held as `Box<dyn DishClassifier>`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use bapsang_db::models::{Category, Dish};

/// Fallback nutrient values used whenever the service cannot produce a
/// usable estimate: 300 kcal, 10 g protein, 5 g fat, 50 g carbs, 500 mg
/// sodium, category `main`.
pub const DEFAULT_CALORIES: f64 = 300.0;
pub const DEFAULT_PROTEIN: f64 = 10.0;
pub const DEFAULT_FAT: f64 = 5.0;
pub const DEFAULT_CARBS: f64 = 50.0;
pub const DEFAULT_SODIUM: f64 = 500.0;
pub const DEFAULT_CATEGORY: Category = Category::Main;

/// Errors from a classification attempt. None of these ever propagate out
/// of analysis or dish-creation paths; they are absorbed by
/// [`classify_or_default`].
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("no JSON payload found in classifier response")]
    MissingJson,

    #[error("malformed JSON in classifier response: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("classifier response missing required field {0:?}")]
    MissingField(&'static str),

    #[error("classifier response contained no candidates")]
    EmptyResponse,
}

/// Adapter interface for dish classification services.
#[async_trait]
pub trait DishClassifier: Send + Sync {
    /// Human-readable name for this classifier (e.g. "gemini").
    fn name(&self) -> &str;

    /// Estimate the category and nutrient profile for one dish name.
    ///
    /// The returned record's `name` matches the requested name.
    async fn classify(&self, dish_name: &str) -> Result<Dish, ClassifierError>;

    /// Invent up to `count` new dish records whose names do not collide
    /// with `existing`.
    async fn invent(&self, count: usize, existing: &[String]) -> Result<Vec<Dish>, ClassifierError>;
}

// Compile-time assertion: DishClassifier must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn DishClassifier) {}
};

/// The default record for a dish the service could not classify.
pub fn fallback_dish(name: &str) -> Dish {
    Dish::new(
        name,
        DEFAULT_CATEGORY,
        DEFAULT_CALORIES,
        DEFAULT_PROTEIN,
        DEFAULT_FAT,
        DEFAULT_CARBS,
        DEFAULT_SODIUM,
    )
}

/// Classify a dish name, degrading to [`fallback_dish`] on any failure.
///
/// This is the only classification entry point the aggregator and the CLI
/// use: it never fails, and it pins the returned record's name to the
/// requested one even if the service answered with something else.
pub async fn classify_or_default(classifier: &dyn DishClassifier, dish_name: &str) -> Dish {
    match classifier.classify(dish_name).await {
        Ok(mut dish) => {
            dish.name = dish_name.to_owned();
            dish
        }
        Err(err) => {
            warn!(
                classifier = classifier.name(),
                dish = dish_name,
                error = %err,
                "classification failed, using fallback record"
            );
            fallback_dish(dish_name)
        }
    }
}

/// A classifier for deployments without a configured service. Every call
/// fails with [`ClassifierError::Unavailable`], so wrapped callers always
/// see the fallback record.
#[derive(Debug, Default)]
pub struct OfflineClassifier;

#[async_trait]
impl DishClassifier for OfflineClassifier {
    fn name(&self) -> &str {
        "offline"
    }

    async fn classify(&self, _dish_name: &str) -> Result<Dish, ClassifierError> {
        Err(ClassifierError::Unavailable(
            "no classifier configured".to_owned(),
        ))
    }

    async fn invent(
        &self,
        _count: usize,
        _existing: &[String],
    ) -> Result<Vec<Dish>, ClassifierError> {
        Err(ClassifierError::Unavailable(
            "no classifier configured".to_owned(),
        ))
    }
}
