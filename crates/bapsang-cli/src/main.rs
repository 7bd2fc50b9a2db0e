mod config;
mod export;
mod menu_cmds;
mod plan_cmds;

use anyhow::Context;
use clap::{Parser, Subcommand};

use bapsang_core::catalog::PgCatalog;
use bapsang_db::pool;
use bapsang_db::queries::dishes;

use config::{BapsangConfig, ClassifierSection, ConfigFile, DatabaseSection};

#[derive(Parser)]
#[command(name = "bapsang", about = "Weekly cafeteria menu planner and nutrient balancer")]
struct Cli {
    /// Database URL (overrides BAPSANG_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a bapsang config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/bapsang")]
        db_url: String,
        /// Google AI Studio API key for the Gemini classifier
        #[arg(long)]
        gemini_api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the bapsang database (creates it and runs migrations)
    DbInit,
    /// Dish catalog management
    Menu {
        #[command(subcommand)]
        command: MenuCommands,
    },
    /// Plan generation, analysis, and rebalancing
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum MenuCommands {
    /// Classify a dish name and add it to the catalog
    Add {
        /// Dish name (e.g. "된장국")
        name: String,
    },
    /// List catalog dishes
    List {
        /// Restrict to one category: soup, main, side, or rice
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a dish from the catalog
    Remove {
        /// Dish name to remove
        name: String,
    },
    /// Overwrite a dish's nutrient values
    SetNutrition {
        /// Dish name to update
        name: String,
        #[arg(long)]
        calories: f64,
        #[arg(long)]
        protein: f64,
        #[arg(long)]
        fat: f64,
        #[arg(long)]
        carbs: f64,
        #[arg(long)]
        sodium: f64,
    },
    /// Move a dish to another category
    SetCategory {
        /// Dish name to update
        name: String,
        /// New category: soup, main, side, or rice
        category: String,
    },
    /// Invent new dishes with the classifier and add them
    Seed {
        /// How many dishes to request
        #[arg(long, default_value_t = 15)]
        count: usize,
    },
    /// Bulk-add dishes from a file of names, one per line
    Import {
        /// Path to the name list
        file: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Generate a weekly plan from the catalog
    Generate {
        /// Days to plan: 5 or 7
        #[arg(long, default_value_t = 5)]
        days: u8,
        /// Meals to plan: lunch or lunch-dinner
        #[arg(long, default_value = "lunch")]
        meals: String,
        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Where to write the plan JSON
        #[arg(short, long, default_value = "plan.json")]
        output: String,
    },
    /// Print a plan file as a table
    Show {
        /// Path to the plan JSON
        file: String,
    },
    /// Analyze a plan's nutrients and daily totals
    Analyze {
        /// Path to the plan JSON
        file: String,
    },
    /// Replace dishes repeated across the plan (rewrites the file)
    Diversify {
        /// Path to the plan JSON
        file: String,
        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Nudge imbalanced days toward nutrient targets (rewrites the file)
    Balance {
        /// Path to the plan JSON
        file: String,
        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,
        /// Balance passes to run
        #[arg(long, default_value_t = 3)]
        rounds: usize,
    },
    /// Export a plan and its nutrient analysis as CSV sheets
    Export {
        /// Path to the plan JSON
        file: String,
        /// Directory to create the export under
        #[arg(short, long, default_value = "exports")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            gemini_api_key,
            force,
        } => {
            cmd_init(&db_url, gemini_api_key, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Menu { command } => {
            let resolved = BapsangConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let catalog = PgCatalog::new(db_pool.clone());
            let classifier = resolved.classifier.build();
            let result = menu_cmds::run_menu_command(command, &catalog, classifier.as_ref()).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = BapsangConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let catalog = PgCatalog::new(db_pool.clone());
            let classifier = resolved.classifier.build();
            let result = plan_cmds::run_plan_command(command, &catalog, classifier.as_ref()).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

/// `bapsang init`: write the config file.
fn cmd_init(db_url: &str, gemini_api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let file = ConfigFile {
        database: DatabaseSection {
            url: db_url.to_string(),
        },
        classifier: ClassifierSection {
            gemini_api_key,
            model: None,
        },
    };
    config::save_config(&file)?;

    println!("Config written to {}", path.display());
    if file.classifier.gemini_api_key.is_none() {
        println!("No Gemini API key configured; classification will use fallback defaults.");
    }
    Ok(())
}

/// `bapsang db-init`: ensure the database exists and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = BapsangConfig::resolve(cli_db_url)?;

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let count = dishes::count_dishes(&db_pool)
        .await
        .context("failed to count dishes")?;
    db_pool.close().await;

    println!("Database ready at {}", resolved.db_config.database_url);
    println!("Catalog holds {count} dishes.");
    Ok(())
}
