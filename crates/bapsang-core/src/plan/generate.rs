//! Plan generation: category-constrained sampling without replacement.
//!
//! One "used" set spans the whole plan, not one day: a dish picked on
//! Monday is avoided for the rest of the week until its category runs out
//! of unused names, at which point repeats are allowed again. This greedy
//! policy is the only diversity guarantee at generation time; real
//! duplicate cleanup is [`super::diversity`]'s job.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;
use tracing::debug;

use bapsang_db::models::Category;

use crate::catalog::CatalogAccessor;

use super::types::{DayMenu, MIXED_GRAIN_RICE, MealPlan, MealType, PlanLength, Slot, SlotEntry};

/// Errors from plan generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A required category has no dishes at all. This is the only hard
    /// failure the planner surfaces; it must never silently produce a
    /// plan with missing slots.
    #[error("no dishes in catalog for category {0}")]
    EmptyCategory(Category),

    #[error(transparent)]
    Catalog(#[from] anyhow::Error),
}

/// Dish name pools per sampled category, fetched once per generation call
/// so every slot draws from the same catalog snapshot.
struct CategoryPools {
    soup: Vec<String>,
    main: Vec<String>,
    side: Vec<String>,
}

impl CategoryPools {
    async fn load(catalog: &dyn CatalogAccessor) -> Result<Self, GenerateError> {
        let pools = Self {
            soup: catalog.names_in_category(Category::Soup).await?,
            main: catalog.names_in_category(Category::Main).await?,
            side: catalog.names_in_category(Category::Side).await?,
        };

        for (category, pool) in [
            (Category::Soup, &pools.soup),
            (Category::Main, &pools.main),
            (Category::Side, &pools.side),
        ] {
            if pool.is_empty() {
                return Err(GenerateError::EmptyCategory(category));
            }
        }

        Ok(pools)
    }

    fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Soup => &self.soup,
            Category::Main => &self.main,
            Category::Side => &self.side,
            // Rice slots never sample; they hold the fixed literal.
            Category::Rice => &[],
        }
    }
}

/// Pick one name from `pool`, preferring names not yet used anywhere in the
/// plan. When the whole pool has been used, fall back to the full pool and
/// allow a repeat. The chosen name joins the used set either way.
fn pick_dish<R>(pool: &[String], used: &mut HashSet<String>, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let fresh: Vec<&String> = pool.iter().filter(|name| !used.contains(*name)).collect();

    let chosen = match fresh.choose(rng) {
        Some(name) => (*name).clone(),
        None => pool
            .choose(rng)
            .cloned()
            .unwrap_or_default(),
    };

    used.insert(chosen.clone());
    chosen
}

/// Generate a plan by sampling the catalog.
///
/// Purely reads the catalog; never writes it. Randomness comes from the
/// caller so seeded runs reproduce exactly.
pub async fn generate_plan<R>(
    catalog: &dyn CatalogAccessor,
    meal_type: MealType,
    length: PlanLength,
    rng: &mut R,
) -> Result<MealPlan, GenerateError>
where
    R: Rng + ?Sized,
{
    let pools = CategoryPools::load(catalog).await?;
    let slots = Slot::ordered(meal_type);
    let mut used: HashSet<String> = HashSet::new();

    let mut days = Vec::with_capacity(length.day_count());
    for &day in length.weekdays() {
        let mut entries = Vec::with_capacity(slots.len());
        for &slot in &slots {
            let dish = if slot.is_rice() {
                MIXED_GRAIN_RICE.to_owned()
            } else {
                pick_dish(pools.for_category(slot.category()), &mut used, rng)
            };
            entries.push(SlotEntry { slot, dish });
        }
        days.push(DayMenu { day, entries });
    }

    debug!(
        days = days.len(),
        distinct = used.len(),
        "generated plan"
    );

    Ok(MealPlan { meal_type, days })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
