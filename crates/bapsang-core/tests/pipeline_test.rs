//! End-to-end pipeline scenarios: generate, analyze, and rebalance against
//! an in-memory catalog.

use std::collections::HashSet;

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;

use bapsang_core::catalog::{CatalogAccessor, MemoryCatalog};
use bapsang_core::classifier::{ClassifierError, DishClassifier, OfflineClassifier, fallback_dish};
use bapsang_core::nutrition::{analyze, daily_totals};
use bapsang_core::plan::{
    DEFAULT_TARGETS, MIXED_GRAIN_RICE, MealType, PlanLength, Slot, generate_plan,
    rebalance_diversity, rebalance_nutrition,
};
use bapsang_db::models::{Category, Dish};

/// A classifier that answers with malformed, JSON-free text.
struct BabblingClassifier;

#[async_trait]
impl DishClassifier for BabblingClassifier {
    fn name(&self) -> &str {
        "babbling"
    }

    async fn classify(&self, dish_name: &str) -> Result<Dish, ClassifierError> {
        // Run real response normalization over prose with no JSON in it.
        bapsang_core::classifier::response::parse_dish(
            "I would rather chat about the weather.",
            dish_name,
        )
    }

    async fn invent(
        &self,
        _count: usize,
        _existing: &[String],
    ) -> Result<Vec<Dish>, ClassifierError> {
        Err(ClassifierError::MissingJson)
    }
}

fn scenario_catalog() -> MemoryCatalog {
    // One soup, one main, exactly two sides.
    MemoryCatalog::with_dishes([
        Dish::new("된장국", Category::Soup, 150.0, 8.0, 5.0, 12.0, 900.0),
        Dish::new("제육볶음", Category::Main, 450.0, 25.0, 22.0, 30.0, 1100.0),
        Dish::new("콩나물무침", Category::Side, 80.0, 4.0, 2.0, 8.0, 300.0),
        Dish::new("시금치나물", Category::Side, 60.0, 3.0, 2.0, 6.0, 250.0),
    ])
}

#[tokio::test]
async fn scarce_catalog_plan_repeats_only_when_forced() {
    let catalog = scenario_catalog();
    let mut rng = StdRng::seed_from_u64(17);

    let plan = generate_plan(&catalog, MealType::LunchOnly, PlanLength::FiveDay, &mut rng)
        .await
        .expect("generation should succeed");

    assert_eq!(plan.days.len(), 5);
    assert!(plan.is_complete());

    let rice = "Rice".parse::<Slot>().unwrap();
    let soup = "Soup".parse::<Slot>().unwrap();
    let main = "Main".parse::<Slot>().unwrap();
    let side1 = "Side-1".parse::<Slot>().unwrap();
    let side2 = "Side-2".parse::<Slot>().unwrap();

    for day in &plan.days {
        assert_eq!(day.dish(rice), Some(MIXED_GRAIN_RICE));
        // Single soup and single main in the catalog: repeats are forced.
        assert_eq!(day.dish(soup), Some("된장국"));
        assert_eq!(day.dish(main), Some("제육볶음"));

        // Side slots only ever hold the two catalog sides.
        for slot in [side1, side2] {
            let side = day.dish(slot).unwrap();
            assert!(["콩나물무침", "시금치나물"].contains(&side), "unexpected side {side}");
        }
    }

    // On Monday both sides are still fresh, so they appear in some order.
    let monday_sides: HashSet<&str> = [
        plan.days[0].dish(side1).unwrap(),
        plan.days[0].dish(side2).unwrap(),
    ]
    .into_iter()
    .collect();
    assert_eq!(monday_sides, HashSet::from(["콩나물무침", "시금치나물"]));
}

#[tokio::test]
async fn malformed_classifier_output_still_yields_rows_and_enriches() {
    let catalog = scenario_catalog();
    let mut rng = StdRng::seed_from_u64(17);

    let mut plan = generate_plan(&catalog, MealType::LunchOnly, PlanLength::FiveDay, &mut rng)
        .await
        .unwrap();

    // Inject a dish the catalog has never seen.
    let main = "Main".parse::<Slot>().unwrap();
    plan.days[0].set_dish(main, "unknown-dish");

    let rows = analyze(&catalog, &BabblingClassifier, &plan).await.unwrap();

    let row = rows
        .iter()
        .find(|r| r.dish == "unknown-dish")
        .expect("the unknown dish still gets a row");
    assert_eq!(row.calories, 300.0);
    assert_eq!(row.protein, 10.0);
    assert_eq!(row.fat, 5.0);
    assert_eq!(row.carbs, 50.0);
    assert_eq!(row.sodium, 500.0);

    let enriched = catalog.get_by_name("unknown-dish").await.unwrap();
    assert_eq!(enriched, Some(fallback_dish("unknown-dish")));
}

#[tokio::test]
async fn analyze_twice_gives_identical_rows() {
    let catalog = scenario_catalog();
    let mut rng = StdRng::seed_from_u64(23);

    let plan = generate_plan(&catalog, MealType::LunchOnly, PlanLength::FiveDay, &mut rng)
        .await
        .unwrap();

    let first = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();
    let second = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn full_pipeline_keeps_plan_shape() {
    let catalog = MemoryCatalog::with_dishes([
        Dish::new("된장국", Category::Soup, 150.0, 8.0, 5.0, 12.0, 900.0),
        Dish::new("미역국", Category::Soup, 90.0, 5.0, 3.0, 6.0, 700.0),
        Dish::new("육개장", Category::Soup, 210.0, 14.0, 9.0, 10.0, 1200.0),
        Dish::new("제육볶음", Category::Main, 450.0, 25.0, 22.0, 30.0, 1100.0),
        Dish::new("불고기", Category::Main, 400.0, 28.0, 18.0, 20.0, 900.0),
        Dish::new("고등어구이", Category::Main, 320.0, 30.0, 20.0, 2.0, 600.0),
        Dish::new("콩나물무침", Category::Side, 80.0, 4.0, 2.0, 8.0, 300.0),
        Dish::new("시금치나물", Category::Side, 60.0, 3.0, 2.0, 6.0, 250.0),
        Dish::new("계란말이", Category::Side, 150.0, 10.0, 10.0, 2.0, 350.0),
        Dish::new("감자조림", Category::Side, 130.0, 2.0, 3.0, 25.0, 450.0),
    ]);
    let mut rng = StdRng::seed_from_u64(31);

    let mut plan = generate_plan(&catalog, MealType::LunchAndDinner, PlanLength::SevenDay, &mut rng)
        .await
        .unwrap();
    let slot_count = plan.days.iter().map(|d| d.entries.len()).sum::<usize>();

    rebalance_diversity(&catalog, &mut plan, &mut rng)
        .await
        .unwrap();
    rebalance_nutrition(
        &catalog,
        &OfflineClassifier,
        &mut plan,
        &DEFAULT_TARGETS,
        &mut rng,
    )
    .await
    .unwrap();

    // Both passes mutate in place without changing the table shape.
    assert_eq!(plan.days.len(), 7);
    assert_eq!(
        plan.days.iter().map(|d| d.entries.len()).sum::<usize>(),
        slot_count
    );
    assert!(plan.is_complete());

    // Rice slots survived both passes untouched.
    for day in &plan.days {
        for entry in &day.entries {
            if entry.slot.is_rice() {
                assert_eq!(entry.dish, MIXED_GRAIN_RICE);
            }
        }
    }

    // Totals still cover every day.
    let rows = analyze(&catalog, &OfflineClassifier, &plan).await.unwrap();
    assert_eq!(daily_totals(&rows).len(), 7);
}
