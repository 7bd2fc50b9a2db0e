//! Nutrient aggregation over a plan.
//!
//! `analyze` walks the plan cell by cell in the fixed slot order and copies
//! nutrient values out of the catalog. A name the catalog has never seen is
//! enriched lazily: the classifier's best-effort record (or the documented
//! defaults) is upserted before analysis continues. That upsert is the one
//! place the core writes the catalog as a side effect of a read-shaped
//! operation, so it is logged explicitly.

use std::fmt;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use bapsang_db::models::Dish;

use crate::catalog::CatalogAccessor;
use crate::classifier::{DishClassifier, classify_or_default};
use crate::plan::{MealPlan, Slot, Weekday};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One analyzed plan cell: the dish name plus its nutrient values as of
/// analysis time. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientRow {
    pub day: Weekday,
    pub slot: Slot,
    pub dish: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sodium: f64,
}

/// Summed nutrient values for one day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DailyTotal {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sodium: f64,
}

impl DailyTotal {
    fn accumulate(&mut self, row: &NutrientRow) {
        self.calories += row.calories;
        self.protein += row.protein;
        self.fat += row.fat;
        self.carbs += row.carbs;
        self.sodium += row.sodium;
    }
}

/// One of the five tracked nutrients, for code that treats them uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Calories,
    Protein,
    Fat,
    Carbs,
    Sodium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 5] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbs,
        Nutrient::Sodium,
    ];

    /// This nutrient's value in a single dish record.
    pub fn of_dish(self, dish: &Dish) -> f64 {
        match self {
            Self::Calories => dish.calories,
            Self::Protein => dish.protein,
            Self::Fat => dish.fat,
            Self::Carbs => dish.carbs,
            Self::Sodium => dish.sodium,
        }
    }

    /// This nutrient's value in a daily total.
    pub fn of_total(self, total: &DailyTotal) -> f64 {
        match self {
            Self::Calories => total.calories,
            Self::Protein => total.protein,
            Self::Fat => total.fat,
            Self::Carbs => total.carbs,
            Self::Sodium => total.sodium,
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Fat => "fat",
            Self::Carbs => "carbs",
            Self::Sodium => "sodium",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Produce one [`NutrientRow`] per plan cell, in plan order.
///
/// Looks every dish name up in the catalog; a miss triggers lazy
/// enrichment through the classifier (which never fails -- it degrades to
/// the documented defaults). Analyzing the same plan twice against an
/// unchanged catalog yields identical rows.
pub async fn analyze(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    plan: &MealPlan,
) -> Result<Vec<NutrientRow>> {
    let mut rows = Vec::new();

    for day in &plan.days {
        for entry in &day.entries {
            let dish = match catalog.get_by_name(&entry.dish).await? {
                Some(dish) => dish,
                None => {
                    let estimated = classify_or_default(classifier, &entry.dish).await;
                    info!(
                        dish = %entry.dish,
                        category = %estimated.category,
                        "catalog miss during analysis, enriching from classifier"
                    );
                    catalog.upsert(&estimated).await?;
                    estimated
                }
            };

            rows.push(NutrientRow {
                day: day.day,
                slot: entry.slot,
                dish: entry.dish.clone(),
                calories: dish.calories,
                protein: dish.protein,
                fat: dish.fat,
                carbs: dish.carbs,
                sodium: dish.sodium,
            });
        }
    }

    Ok(rows)
}

/// Sum rows by day label, preserving the day order of the input. Slot
/// labels play no part in totals.
pub fn daily_totals(rows: &[NutrientRow]) -> Vec<(Weekday, DailyTotal)> {
    let mut totals: Vec<(Weekday, DailyTotal)> = Vec::new();

    for row in rows {
        match totals.iter_mut().find(|(day, _)| *day == row.day) {
            Some((_, total)) => total.accumulate(row),
            None => {
                let mut total = DailyTotal::default();
                total.accumulate(row);
                totals.push((row.day, total));
            }
        }
    }

    totals
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use bapsang_db::models::Category;

    use crate::catalog::MemoryCatalog;
    use crate::classifier::{OfflineClassifier, fallback_dish};
    use crate::plan::{DayMenu, MealType, SlotEntry};

    fn dish(name: &str, category: Category, calories: f64) -> Dish {
        Dish::new(name, category, calories, 10.0, 5.0, 20.0, 300.0)
    }

    fn one_day_plan(dishes: &[(&str, &str)]) -> MealPlan {
        MealPlan {
            meal_type: MealType::LunchOnly,
            days: vec![DayMenu {
                day: Weekday::Mon,
                entries: dishes
                    .iter()
                    .map(|(slot, dish)| SlotEntry {
                        slot: slot.parse().unwrap(),
                        dish: (*dish).to_owned(),
                    })
                    .collect(),
            }],
        }
    }

    #[tokio::test]
    async fn rows_follow_plan_order_and_copy_catalog_values() {
        let catalog = MemoryCatalog::with_dishes([
            dish("된장국", Category::Soup, 150.0),
            dish("제육볶음", Category::Main, 450.0),
        ]);
        let plan = one_day_plan(&[("Soup", "된장국"), ("Main", "제육볶음")]);

        let rows = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].dish, "된장국");
        assert_eq!(rows[0].calories, 150.0);
        assert_eq!(rows[1].dish, "제육볶음");
        assert_eq!(rows[1].calories, 450.0);
    }

    #[tokio::test]
    async fn unknown_dish_is_enriched_with_defaults() {
        let catalog = MemoryCatalog::new();
        let plan = one_day_plan(&[("Main", "unknown-dish")]);

        let rows = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();

        // The row exists, carries the fallback values, and the catalog now
        // holds the enriched record.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].calories, 300.0);
        assert_eq!(rows[0].protein, 10.0);

        let enriched = catalog.get_by_name("unknown-dish").await.unwrap().unwrap();
        assert_eq!(enriched, fallback_dish("unknown-dish"));
    }

    #[tokio::test]
    async fn analysis_is_idempotent() {
        let catalog = MemoryCatalog::with_dishes([dish("된장국", Category::Soup, 150.0)]);
        let plan = one_day_plan(&[("Soup", "된장국"), ("Main", "새로운메뉴")]);

        let first = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();
        let second = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn daily_totals_group_by_day_in_order() {
        let row = |day: Weekday, calories: f64| NutrientRow {
            day,
            slot: "Main".parse().unwrap(),
            dish: "x".to_owned(),
            calories,
            protein: 1.0,
            fat: 2.0,
            carbs: 3.0,
            sodium: 4.0,
        };

        let rows = vec![
            row(Weekday::Mon, 100.0),
            row(Weekday::Mon, 200.0),
            row(Weekday::Tue, 50.0),
        ];

        let totals = daily_totals(&rows);
        assert_eq!(totals.len(), 2);

        let (mon, mon_total) = totals[0];
        assert_eq!(mon, Weekday::Mon);
        assert_eq!(mon_total.calories, 300.0);
        assert_eq!(mon_total.protein, 2.0);
        assert_eq!(mon_total.sodium, 8.0);

        let (tue, tue_total) = totals[1];
        assert_eq!(tue, Weekday::Tue);
        assert_eq!(tue_total.calories, 50.0);
    }

    #[test]
    fn daily_totals_of_nothing_is_empty() {
        assert!(daily_totals(&[]).is_empty());
    }
}
