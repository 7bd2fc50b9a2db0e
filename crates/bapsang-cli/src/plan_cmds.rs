//! CLI handlers for `bapsang plan` subcommands.
//!
//! Plans live on disk as the canonical JSON table; every subcommand here
//! reads that shape, drives the core, and (for the mutating passes)
//! rewrites the same file.

use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use bapsang_core::catalog::CatalogAccessor;
use bapsang_core::classifier::DishClassifier;
use bapsang_core::nutrition::{DailyTotal, NutrientRow, analyze, daily_totals};
use bapsang_core::plan::{
    DEFAULT_TARGETS, MealPlan, MealType, PlanLength, Slot, Weekday, generate_plan,
    rebalance_diversity, rebalance_nutrition,
};

use crate::PlanCommands;
use crate::export;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
) -> Result<()> {
    match command {
        PlanCommands::Generate {
            days,
            meals,
            seed,
            output,
        } => cmd_generate(catalog, days, &meals, seed, &output).await,
        PlanCommands::Show { file } => cmd_show(&file),
        PlanCommands::Analyze { file } => cmd_analyze(catalog, classifier, &file).await,
        PlanCommands::Diversify { file, seed } => {
            cmd_diversify(catalog, &file, seed).await
        }
        PlanCommands::Balance { file, seed, rounds } => {
            cmd_balance(catalog, classifier, &file, seed, rounds).await
        }
        PlanCommands::Export { file, output } => {
            cmd_export(catalog, classifier, &file, &output).await
        }
    }
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn parse_meals(raw: &str) -> Result<MealType> {
    match raw {
        "lunch" => Ok(MealType::LunchOnly),
        "lunch-dinner" => Ok(MealType::LunchAndDinner),
        other => anyhow::bail!("invalid meals {other:?} (expected lunch or lunch-dinner)"),
    }
}

fn load_plan(path: &str) -> Result<MealPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {path:?}"))?;
    let plan: MealPlan = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse plan file {path:?}"))?;
    Ok(plan)
}

fn save_plan(path: &str, plan: &MealPlan) -> Result<()> {
    let contents = serde_json::to_string_pretty(plan).context("failed to serialize plan")?;
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write plan file {path:?}"))?;
    Ok(())
}

fn print_plan(plan: &MealPlan) {
    let slots = Slot::ordered(plan.meal_type);

    print!("{:<5}", "DAY");
    for slot in &slots {
        print!(" {:<14}", slot.to_string());
    }
    println!();
    println!("{}", "-".repeat(5 + slots.len() * 15));

    for day in &plan.days {
        print!("{:<5}", day.day.to_string());
        for &slot in &slots {
            print!(" {:<14}", day.dish(slot).unwrap_or("-"));
        }
        println!();
    }
}

fn print_rows(rows: &[NutrientRow]) {
    println!(
        "{:<5} {:<14} {:<24} {:>8} {:>8} {:>6} {:>6} {:>8}",
        "DAY", "SLOT", "DISH", "CALORIES", "PROTEIN", "FAT", "CARBS", "SODIUM"
    );
    println!("{}", "-".repeat(86));
    for row in rows {
        println!(
            "{:<5} {:<14} {:<24} {:>8} {:>8} {:>6} {:>6} {:>8}",
            row.day.to_string(),
            row.slot.to_string(),
            row.dish,
            row.calories,
            row.protein,
            row.fat,
            row.carbs,
            row.sodium
        );
    }
}

fn print_totals(totals: &[(Weekday, DailyTotal)]) {
    println!(
        "{:<5} {:>8} {:>8} {:>6} {:>6} {:>8}",
        "DAY", "CALORIES", "PROTEIN", "FAT", "CARBS", "SODIUM"
    );
    println!("{}", "-".repeat(46));
    for (day, total) in totals {
        println!(
            "{:<5} {:>8} {:>8} {:>6} {:>6} {:>8}",
            day.to_string(),
            total.calories,
            total.protein,
            total.fat,
            total.carbs,
            total.sodium
        );
    }
}

// -----------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------

async fn cmd_generate(
    catalog: &dyn CatalogAccessor,
    days: u8,
    meals: &str,
    seed: Option<u64>,
    output: &str,
) -> Result<()> {
    let length = PlanLength::try_from(days)?;
    let meal_type = parse_meals(meals)?;
    let mut rng = make_rng(seed);

    let plan = generate_plan(catalog, meal_type, length, &mut rng).await?;
    save_plan(output, &plan)?;

    print_plan(&plan);
    println!();
    println!("Plan written to {output}.");
    Ok(())
}

fn cmd_show(file: &str) -> Result<()> {
    let plan = load_plan(file)?;
    print_plan(&plan);
    Ok(())
}

async fn cmd_analyze(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    file: &str,
) -> Result<()> {
    let plan = load_plan(file)?;

    let rows = analyze(catalog, classifier, &plan).await?;
    let totals = daily_totals(&rows);

    print_rows(&rows);
    println!();
    println!("Daily totals (targets: 2000 kcal, 60 g protein, 65 g fat, 250 g carbs, 2000 mg sodium):");
    print_totals(&totals);
    Ok(())
}

async fn cmd_diversify(
    catalog: &dyn CatalogAccessor,
    file: &str,
    seed: Option<u64>,
) -> Result<()> {
    let mut plan = load_plan(file)?;
    let mut rng = make_rng(seed);

    rebalance_diversity(catalog, &mut plan, &mut rng).await?;
    save_plan(file, &plan)?;

    print_plan(&plan);
    println!();
    println!("Diversity pass applied; {file} rewritten.");
    Ok(())
}

async fn cmd_balance(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    file: &str,
    seed: Option<u64>,
    rounds: usize,
) -> Result<()> {
    let mut plan = load_plan(file)?;
    let mut rng = make_rng(seed);

    // The optimizer attempts one substitution per (day, nutrient) per call;
    // convergence comes from bounded repetition here.
    for _ in 0..rounds {
        rebalance_nutrition(catalog, classifier, &mut plan, &DEFAULT_TARGETS, &mut rng).await?;
    }
    save_plan(file, &plan)?;

    print_plan(&plan);
    println!();
    println!("{rounds} balance passes applied; {file} rewritten.");
    Ok(())
}

async fn cmd_export(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    file: &str,
    output: &str,
) -> Result<()> {
    let plan = load_plan(file)?;

    let rows = analyze(catalog, classifier, &plan).await?;
    let totals = daily_totals(&rows);

    let written = export::export_plan_csv(&plan, &rows, &totals, Path::new(output))?;

    println!("Exported:");
    for path in &written {
        println!("  {}", path.display());
    }
    Ok(())
}
