//! CSV export of a plan and its nutrient analysis.
//!
//! Writes the same three sheets the interactive reports carry -- the plan
//! table, per-slot nutrient rows, and daily totals -- as CSV files inside
//! a timestamped directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use bapsang_core::nutrition::{DailyTotal, NutrientRow};
use bapsang_core::plan::{MealPlan, Slot, Weekday};

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn plan_sheet(plan: &MealPlan) -> String {
    let slots = Slot::ordered(plan.meal_type);
    let mut out = String::new();

    out.push_str("day");
    for slot in &slots {
        let _ = write!(out, ",{}", csv_field(&slot.to_string()));
    }
    out.push('\n');

    for day in &plan.days {
        out.push_str(&day.day.to_string());
        for &slot in &slots {
            let _ = write!(out, ",{}", csv_field(day.dish(slot).unwrap_or("")));
        }
        out.push('\n');
    }

    out
}

fn nutrients_sheet(rows: &[NutrientRow]) -> String {
    let mut out = String::from("day,slot,dish,calories,protein,fat,carbs,sodium\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            row.day,
            csv_field(&row.slot.to_string()),
            csv_field(&row.dish),
            row.calories,
            row.protein,
            row.fat,
            row.carbs,
            row.sodium
        );
    }
    out
}

fn totals_sheet(totals: &[(Weekday, DailyTotal)]) -> String {
    let mut out = String::from("day,calories,protein,fat,carbs,sodium\n");
    for (day, total) in totals {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            day, total.calories, total.protein, total.fat, total.carbs, total.sodium
        );
    }
    out
}

/// Write `plan.csv`, `nutrients.csv`, and `daily_totals.csv` under a new
/// timestamped directory inside `out_dir`. Returns the written paths.
pub fn export_plan_csv(
    plan: &MealPlan,
    rows: &[NutrientRow],
    totals: &[(Weekday, DailyTotal)],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let dir = out_dir.join(format!("plan_{stamp}"));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let sheets = [
        ("plan.csv", plan_sheet(plan)),
        ("nutrients.csv", nutrients_sheet(rows)),
        ("daily_totals.csv", totals_sheet(totals)),
    ];

    let mut written = Vec::with_capacity(sheets.len());
    for (name, contents) in sheets {
        let path = dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
