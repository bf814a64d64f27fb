//! vinmap-migrate: maintenance commands for the wine document store.
//!
//! `categories` backfills `wineCategory` on every wine missing one;
//! `set-category` corrects the category of a single wine by name.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vinmap_db::{backfill_categories, set_category_by_name, Database, WineCategory};

#[derive(Parser)]
#[command(name = "vinmap-migrate")]
#[command(author, version, about = "Data migrations for the vinmap wine store")]
#[command(propagate_version = true)]
struct Cli {
    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer and store a category for every wine that has none
    Categories {
        /// Report the changes without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Overwrite the category of the wine with this exact name
    SetCategory {
        /// Exact wine name
        #[arg(short, long)]
        name: String,

        /// Red, White, Rosé, Sparkling or Natural
        #[arg(short, long)]
        category: WineCategory,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vinmap_db=info".into()))
        .with(fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let url = cli
        .database_url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set (pass --database-url)"))?;

    let db = Database::connect(&url).await?;
    db.migrate().await?;

    match cli.command {
        Commands::Categories { dry_run } => {
            let report = backfill_categories(&db.wines, dry_run).await?;
            for change in &report.changes {
                println!("{} -> {}", change.name, change.category);
            }
            let verb = if dry_run { "Would update" } else { "Updated" };
            println!(
                "{}: {}, skipped: {}, total: {}",
                verb, report.updated, report.skipped, report.total
            );
        }
        Commands::SetCategory { name, category } => {
            let wine = set_category_by_name(&db.wines, &name, category).await?;
            println!("{} ({}) -> {}", wine.name, wine.id, category);
        }
    }

    Ok(())
}
