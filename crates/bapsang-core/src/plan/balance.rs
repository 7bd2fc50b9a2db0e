//! Balance pass: pull under-target days toward the fixed daily targets.
//!
//! A local, greedy, best-effort repair. Each call attempts at most one
//! substitution per (day, nutrient); it does not iterate to a fixed point,
//! and a day with no qualifying candidate is left unchanged for that
//! nutrient. Callers wanting convergence call repeatedly with a bounded
//! retry count.

use std::collections::BTreeSet;

use anyhow::Result;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use bapsang_db::models::{Category, Dish};

use crate::catalog::CatalogAccessor;
use crate::classifier::DishClassifier;
use crate::nutrition::{DailyTotal, Nutrient, analyze, daily_totals};

use super::types::MealPlan;

/// Daily nutrient targets: kcal, grams, grams, grams, milligrams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sodium: f64,
}

/// The fixed reference targets. Not personalized.
pub const DEFAULT_TARGETS: DailyTargets = DailyTargets {
    calories: 2000.0,
    protein: 60.0,
    fat: 65.0,
    carbs: 250.0,
    sodium: 2000.0,
};

/// A day is imbalanced when any nutrient's relative deviation exceeds
/// this, strictly: a deviation of exactly 20% is still in balance.
pub const IMBALANCE_TOLERANCE: f64 = 0.20;

/// A candidate dish must contribute more than `actual / 3` of a deficient
/// nutrient to count as a meaningfully large single-dish contribution.
const SUBSTANTIAL_SHARE_DIVISOR: f64 = 3.0;

impl Nutrient {
    fn target(self, targets: &DailyTargets) -> f64 {
        match self {
            Self::Calories => targets.calories,
            Self::Protein => targets.protein,
            Self::Fat => targets.fat,
            Self::Carbs => targets.carbs,
            Self::Sodium => targets.sodium,
        }
    }
}

fn is_imbalanced(total: &DailyTotal, targets: &DailyTargets) -> bool {
    Nutrient::ALL.iter().any(|nutrient| {
        let target = nutrient.target(targets);
        ((nutrient.of_total(total) - target).abs() / target) > IMBALANCE_TOLERANCE
    })
}

/// Nudge every imbalanced day toward the targets by substitution.
///
/// For each nutrient a day is under on by more than 20%, one dish from a
/// category *not yet on that day's tray* with a substantial amount of the
/// nutrient replaces the first slot (in column order) whose current dish
/// belongs to one of the day's present categories. Days over target are
/// not repaired downward.
pub async fn rebalance_nutrition<R>(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    plan: &mut MealPlan,
    targets: &DailyTargets,
    rng: &mut R,
) -> Result<()>
where
    R: Rng + ?Sized,
{
    let rows = analyze(catalog, classifier, plan).await?;
    let totals = daily_totals(&rows);
    let all_dishes = catalog.list_all().await?;

    for day_index in 0..plan.days.len() {
        let day = plan.days[day_index].day;
        let Some((_, total)) = totals.iter().find(|(d, _)| *d == day) else {
            continue;
        };
        if !is_imbalanced(total, targets) {
            continue;
        }

        // Categories currently on this day's tray, per the catalog. Every
        // dish name is in the catalog by now -- analyze enriched the misses.
        let mut present: BTreeSet<Category> = BTreeSet::new();
        for entry in &plan.days[day_index].entries {
            if let Some(record) = catalog.get_by_name(&entry.dish).await? {
                present.insert(record.category);
            }
        }

        for nutrient in Nutrient::ALL {
            let target = nutrient.target(targets);
            let actual = nutrient.of_total(total);
            if actual >= target * (1.0 - IMBALANCE_TOLERANCE) {
                continue;
            }

            let threshold = actual / SUBSTANTIAL_SHARE_DIVISOR;
            let candidates: Vec<&Dish> = all_dishes
                .iter()
                .filter(|d| nutrient.of_dish(d) > threshold && !present.contains(&d.category))
                .collect();

            let Some(pick) = candidates.choose(rng) else {
                debug!(day = %day, nutrient = %nutrient, "no substitution candidate");
                continue;
            };

            // Substitute into the first slot holding a dish from one of the
            // day's present categories. Rice slots are exempt from all
            // substitution logic.
            for entry_index in 0..plan.days[day_index].entries.len() {
                if plan.days[day_index].entries[entry_index].slot.is_rice() {
                    continue;
                }
                let current_name = plan.days[day_index].entries[entry_index].dish.clone();
                let Some(current) = catalog.get_by_name(&current_name).await? else {
                    continue;
                };
                if present.contains(&current.category) {
                    let entry = &mut plan.days[day_index].entries[entry_index];
                    debug!(
                        day = %day,
                        slot = %entry.slot,
                        nutrient = %nutrient,
                        from = %current_name,
                        to = %pick.name,
                        "substituting to raise deficient nutrient"
                    );
                    entry.dish = pick.name.clone();
                    break;
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
