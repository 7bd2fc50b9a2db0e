//! CLI handlers for `bapsang menu` subcommands.

use anyhow::{Context, Result};
use tracing::warn;

use bapsang_core::catalog::CatalogAccessor;
use bapsang_core::classifier::{DishClassifier, classify_or_default};
use bapsang_db::models::{Category, Dish};

use crate::MenuCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `MenuCommands` variant to the appropriate handler.
pub async fn run_menu_command(
    command: MenuCommands,
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
) -> Result<()> {
    match command {
        MenuCommands::Add { name } => cmd_add(catalog, classifier, &name).await,
        MenuCommands::List { category } => cmd_list(catalog, category.as_deref()).await,
        MenuCommands::Remove { name } => cmd_remove(catalog, &name).await,
        MenuCommands::SetNutrition {
            name,
            calories,
            protein,
            fat,
            carbs,
            sodium,
        } => cmd_set_nutrition(catalog, &name, [calories, protein, fat, carbs, sodium]).await,
        MenuCommands::SetCategory { name, category } => {
            cmd_set_category(catalog, &name, &category).await
        }
        MenuCommands::Seed { count } => cmd_seed(catalog, classifier, count).await,
        MenuCommands::Import { file } => cmd_import(catalog, classifier, &file).await,
    }
}

// -----------------------------------------------------------------------
// Handlers
// -----------------------------------------------------------------------

async fn cmd_add(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    name: &str,
) -> Result<()> {
    let dish = classify_or_default(classifier, name).await;
    catalog.upsert(&dish).await?;
    println!(
        "Added {:?} as {} ({} kcal, {} g protein).",
        dish.name, dish.category, dish.calories, dish.protein
    );
    Ok(())
}

async fn cmd_list(catalog: &dyn CatalogAccessor, category: Option<&str>) -> Result<()> {
    let dishes = match category {
        Some(raw) => {
            let category: Category = raw
                .parse()
                .with_context(|| format!("invalid category {raw:?}"))?;
            let mut filtered = catalog.list_all().await?;
            filtered.retain(|d| d.category == category);
            filtered
        }
        None => catalog.list_all().await?,
    };

    if dishes.is_empty() {
        println!("No dishes found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<8} {:>8} {:>8} {:>6} {:>6} {:>8}",
        "NAME", "CATEGORY", "CALORIES", "PROTEIN", "FAT", "CARBS", "SODIUM"
    );
    println!("{}", "-".repeat(74));
    for dish in &dishes {
        println!(
            "{:<24} {:<8} {:>8} {:>8} {:>6} {:>6} {:>8}",
            dish.name, dish.category, dish.calories, dish.protein, dish.fat, dish.carbs, dish.sodium
        );
    }
    println!("{} dishes.", dishes.len());
    Ok(())
}

async fn cmd_remove(catalog: &dyn CatalogAccessor, name: &str) -> Result<()> {
    if catalog.get_by_name(name).await?.is_none() {
        anyhow::bail!("dish {name:?} not found in catalog");
    }
    catalog.delete(name).await?;
    println!("Removed {name:?}.");
    Ok(())
}

async fn cmd_set_nutrition(
    catalog: &dyn CatalogAccessor,
    name: &str,
    [calories, protein, fat, carbs, sodium]: [f64; 5],
) -> Result<()> {
    let existing = catalog
        .get_by_name(name)
        .await?
        .with_context(|| format!("dish {name:?} not found in catalog"))?;

    let updated = Dish {
        calories,
        protein,
        fat,
        carbs,
        sodium,
        ..existing
    };
    catalog.upsert(&updated).await?;
    println!("Updated nutrition for {name:?}.");
    Ok(())
}

async fn cmd_set_category(catalog: &dyn CatalogAccessor, name: &str, category: &str) -> Result<()> {
    let category: Category = category
        .parse()
        .with_context(|| format!("invalid category {category:?}"))?;

    let existing = catalog
        .get_by_name(name)
        .await?
        .with_context(|| format!("dish {name:?} not found in catalog"))?;

    catalog
        .upsert(&Dish {
            category,
            ..existing
        })
        .await?;
    println!("Moved {name:?} to {category}.");
    Ok(())
}

async fn cmd_seed(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    count: usize,
) -> Result<()> {
    let existing: Vec<String> = catalog
        .list_all()
        .await?
        .into_iter()
        .map(|d| d.name)
        .collect();

    let invented = match classifier.invent(count, &existing).await {
        Ok(dishes) => dishes,
        Err(err) => {
            warn!(error = %err, "dish invention failed");
            println!("Classifier could not generate dishes: {err}");
            return Ok(());
        }
    };

    let mut added = 0usize;
    for dish in &invented {
        if existing.contains(&dish.name) {
            continue;
        }
        catalog.upsert(dish).await?;
        added += 1;
    }

    println!("Added {added} new dishes.");
    Ok(())
}

async fn cmd_import(
    catalog: &dyn CatalogAccessor,
    classifier: &dyn DishClassifier,
    file: &str,
) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read name list {file:?}"))?;

    let mut added = 0usize;
    for line in contents.lines() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }
        let dish = classify_or_default(classifier, name).await;
        catalog.upsert(&dish).await?;
        added += 1;
    }

    println!("Imported {added} dishes from {file:?}.");
    Ok(())
}
