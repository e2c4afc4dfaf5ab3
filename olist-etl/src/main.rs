//! olist-etl - Olist analytics pipeline
//!
//! Loads the raw CSV dataset into SQLite and rebuilds the published
//! `dim_locations` and `master_table` tables in one transaction.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use olist_common::config::{load_config, resolve_database_path};
use olist_common::db::init_database;
use olist_etl::RunSummary;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for olist-etl
#[derive(Parser, Debug)]
#[command(name = "olist-etl")]
#[command(about = "Olist e-commerce analytics pipeline")]
#[command(version)]
struct Cli {
    /// Config file (overrides OLIST_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database (overrides OLIST_DATABASE)
    #[arg(long, global = true, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the raw CSV files into raw tables
    Load {
        /// Directory holding the CSV files (defaults to raw_data_dir)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },
    /// Rebuild dim_locations and master_table from the raw tables
    Transform,
    /// Load, then transform
    Run {
        /// Directory holding the CSV files (defaults to raw_data_dir)
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("olist-etl {}", olist_etl::build_info());

    let db_path = resolve_database_path(cli.database.as_deref(), &config);
    info!("Database: {}", db_path.display());

    let pool = init_database(&db_path, config.busy_timeout_ms)
        .await
        .context("Failed to open database")?;

    let summary = match cli.command {
        Command::Load { data_dir } => {
            let dir = data_dir.unwrap_or_else(|| config.raw_data_dir.clone());
            olist_etl::run_load(&pool, &dir, &config).await?
        }
        Command::Transform => olist_etl::run_transform(&pool, &config).await?,
        Command::Run { data_dir } => {
            let dir = data_dir.unwrap_or_else(|| config.raw_data_dir.clone());
            olist_etl::run_all(&pool, &dir, &config).await?
        }
    };

    pool.close().await;
    report(&summary, cli.json)
}

fn report(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    for (table, rows) in &summary.loaded_rows {
        println!("loaded   {:<36} {:>9}", table, rows);
    }
    if summary.facts.rows > 0 || !summary.source_rows.is_empty() {
        println!("locations  {}", summary.locations.display_string());
        println!("facts      {}", summary.facts.display_string());
    }
    println!("elapsed    {} ms", summary.elapsed_ms);
    Ok(())
}
