//! Diversity pass: replace dishes that appear in two or more slots.
//!
//! Replacements are drawn independently per occurrence, without updating
//! the occurrence tally mid-pass and without checking the rest of the
//! plan, so one pass reduces duplicates but does not guarantee their
//! elimination. Callers wanting a stronger guarantee can run the pass
//! again; once satisfies the contract.

use std::collections::BTreeMap;

use anyhow::Result;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::catalog::CatalogAccessor;

use super::types::MealPlan;

/// Rewrite every dish that occurs in at least two non-rice slots with
/// same-category alternatives from the catalog.
///
/// Mutates the plan in place; the shape never changes. A repeated dish the
/// catalog does not know, or whose category has no alternative, is left
/// alone. Rice slots are never touched.
pub async fn rebalance_diversity<R>(
    catalog: &dyn CatalogAccessor,
    plan: &mut MealPlan,
    rng: &mut R,
) -> Result<()>
where
    R: Rng + ?Sized,
{
    // Tally every non-rice dish across the whole plan. BTreeMap keeps the
    // processing order deterministic for seeded runs.
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for day in &plan.days {
        for entry in &day.entries {
            if !entry.slot.is_rice() {
                *counts.entry(entry.dish.clone()).or_default() += 1;
            }
        }
    }

    for (name, count) in counts {
        if count < 2 {
            continue;
        }

        // The catalog decides the category; an unknown dish cannot be
        // substituted safely, so it stays.
        let Some(record) = catalog.get_by_name(&name).await? else {
            debug!(dish = %name, "repeated dish not in catalog, skipping");
            continue;
        };

        let candidates: Vec<String> = catalog
            .names_in_category(record.category)
            .await?
            .into_iter()
            .filter(|candidate| candidate != &name)
            .collect();
        if candidates.is_empty() {
            continue;
        }

        for day in &mut plan.days {
            for entry in &mut day.entries {
                if entry.slot.is_rice() || entry.dish != name {
                    continue;
                }
                if let Some(replacement) = candidates.choose(rng) {
                    debug!(
                        day = %day.day,
                        slot = %entry.slot,
                        from = %name,
                        to = %replacement,
                        "replacing repeated dish"
                    );
                    entry.dish = replacement.clone();
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use bapsang_db::models::{Category, Dish};

    use crate::catalog::MemoryCatalog;
    use crate::plan::types::{DayMenu, MealType, Slot, SlotEntry, Weekday, MIXED_GRAIN_RICE};

    fn dish(name: &str, category: Category) -> Dish {
        Dish::new(name, category, 100.0, 5.0, 3.0, 10.0, 400.0)
    }

    /// A lunch-only plan with the given (day, slot, dish) cells.
    fn plan_of(cells: &[(Weekday, &str, &str)]) -> MealPlan {
        let mut days: Vec<DayMenu> = Vec::new();
        for &(day, slot, name) in cells {
            let slot: Slot = slot.parse().unwrap();
            let entry = SlotEntry {
                slot,
                dish: name.to_owned(),
            };
            match days.iter_mut().find(|d| d.day == day) {
                Some(existing) => existing.entries.push(entry),
                None => days.push(DayMenu {
                    day,
                    entries: vec![entry],
                }),
            }
        }
        MealPlan {
            meal_type: MealType::LunchOnly,
            days,
        }
    }

    fn occurrences(plan: &MealPlan, name: &str) -> usize {
        plan.days
            .iter()
            .flat_map(|d| d.entries.iter())
            .filter(|e| e.dish == name)
            .count()
    }

    #[tokio::test]
    async fn repeated_dish_count_never_increases() {
        let catalog = MemoryCatalog::with_dishes([
            dish("제육볶음", Category::Main),
            dish("불고기", Category::Main),
        ]);
        let mut plan = plan_of(&[
            (Weekday::Mon, "Main", "제육볶음"),
            (Weekday::Tue, "Main", "제육볶음"),
            (Weekday::Wed, "Main", "제육볶음"),
        ]);
        let before = occurrences(&plan, "제육볶음");

        let mut rng = StdRng::seed_from_u64(11);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        assert!(occurrences(&plan, "제육볶음") <= before);
        // With exactly one alternative, every occurrence became 불고기.
        assert_eq!(occurrences(&plan, "불고기"), 3);
    }

    #[tokio::test]
    async fn replacements_stay_in_category() {
        let catalog = MemoryCatalog::with_dishes([
            dish("된장국", Category::Soup),
            dish("미역국", Category::Soup),
            dish("육개장", Category::Soup),
            dish("불고기", Category::Main),
        ]);
        let mut plan = plan_of(&[
            (Weekday::Mon, "Soup", "된장국"),
            (Weekday::Tue, "Soup", "된장국"),
        ]);

        let mut rng = StdRng::seed_from_u64(5);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        let soup = "Soup".parse::<Slot>().unwrap();
        for day in &plan.days {
            let name = day.dish(soup).unwrap();
            let record = catalog.get_by_name(name).await.unwrap().unwrap();
            assert_eq!(record.category, Category::Soup, "replacement left category");
        }
    }

    #[tokio::test]
    async fn no_alternative_means_no_change() {
        let catalog = MemoryCatalog::with_dishes([dish("제육볶음", Category::Main)]);
        let mut plan = plan_of(&[
            (Weekday::Mon, "Main", "제육볶음"),
            (Weekday::Tue, "Main", "제육볶음"),
        ]);
        let original = plan.clone();

        let mut rng = StdRng::seed_from_u64(2);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        assert_eq!(plan, original);
    }

    #[tokio::test]
    async fn unknown_repeated_dish_is_left_alone() {
        let catalog = MemoryCatalog::new();
        let mut plan = plan_of(&[
            (Weekday::Mon, "Main", "mystery"),
            (Weekday::Tue, "Main", "mystery"),
        ]);
        let original = plan.clone();

        let mut rng = StdRng::seed_from_u64(2);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        assert_eq!(plan, original);
    }

    #[tokio::test]
    async fn rice_slots_are_exempt() {
        let catalog = MemoryCatalog::with_dishes([
            dish(MIXED_GRAIN_RICE, Category::Rice),
            dish("흰쌀밥", Category::Rice),
        ]);
        let mut plan = plan_of(&[
            (Weekday::Mon, "Rice", MIXED_GRAIN_RICE),
            (Weekday::Tue, "Rice", MIXED_GRAIN_RICE),
            (Weekday::Wed, "Rice", MIXED_GRAIN_RICE),
        ]);

        let mut rng = StdRng::seed_from_u64(8);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        assert_eq!(occurrences(&plan, MIXED_GRAIN_RICE), 3);
    }

    #[tokio::test]
    async fn unique_dishes_are_untouched() {
        let catalog = MemoryCatalog::with_dishes([
            dish("된장국", Category::Soup),
            dish("미역국", Category::Soup),
        ]);
        let mut plan = plan_of(&[
            (Weekday::Mon, "Soup", "된장국"),
            (Weekday::Tue, "Soup", "미역국"),
        ]);
        let original = plan.clone();

        let mut rng = StdRng::seed_from_u64(6);
        rebalance_diversity(&catalog, &mut plan, &mut rng)
            .await
            .unwrap();

        assert_eq!(plan, original);
    }
}
