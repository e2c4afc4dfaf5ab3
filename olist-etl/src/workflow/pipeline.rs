//! Transactional transformation pipeline
//!
//! Stages, all inside one SQLite transaction:
//! 1. Read and shape-check the raw source tables
//! 2. Build the location dimension (Normalizer + Location Deduplicator)
//! 3. Assemble the fact rows (Fact Assembler)
//! 4. Replace `dim_locations` and `master_table`
//! 5. Apply the natural key and lookup indexes (Schema Finalizer)
//! 6. Commit
//!
//! Any error drops the transaction, which rolls back every pending write, so
//! readers keep seeing the previously published tables.

use crate::db::{read_sources, write_facts, write_locations};
use crate::models::RunSummary;
use crate::services::csv_loader;
use crate::services::fact_assembler::{assemble_facts, AssemblerOptions};
use crate::services::location_deduplicator::build_location_dimension;
use crate::services::schema_finalizer::{check_fact_keys, finalize_table};
use olist_common::db::{DimLocationsSchema, MasterTableSchema};
use olist_common::{EtlConfig, PipelineStage, Result, StageContext};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Rebuild `dim_locations` and `master_table` from the raw source tables
pub async fn run_transform(pool: &SqlitePool, config: &EtlConfig) -> Result<RunSummary> {
    let started = Instant::now();
    info!("Starting transformation");

    let mut tx = pool.begin().await.stage(PipelineStage::ReadSources)?;

    let sources = read_sources(&mut *tx)
        .await
        .stage(PipelineStage::ReadSources)?;

    let (locations, location_stats) = build_location_dimension(&sources);

    let options = AssemblerOptions {
        strict_timestamps: config.strict_timestamps,
    };
    let (facts, fact_stats) =
        assemble_facts(&sources, &locations, options).stage(PipelineStage::AssembleFacts)?;

    // Reject duplicate keys before anything is written
    check_fact_keys(&facts).stage(PipelineStage::Finalize)?;

    write_locations(&mut *tx, &locations, config.insert_batch_size)
        .await
        .stage(PipelineStage::WriteLocations)?;
    write_facts(&mut *tx, &facts, config.insert_batch_size)
        .await
        .stage(PipelineStage::WriteFacts)?;

    finalize_table::<DimLocationsSchema>(&mut *tx)
        .await
        .stage(PipelineStage::Finalize)?;
    finalize_table::<MasterTableSchema>(&mut *tx)
        .await
        .stage(PipelineStage::Finalize)?;

    tx.commit().await.stage(PipelineStage::Commit)?;

    let summary = RunSummary {
        loaded_rows: BTreeMap::new(),
        source_rows: sources
            .row_counts()
            .into_iter()
            .map(|(table, count)| (table.to_string(), count))
            .collect(),
        locations: location_stats,
        facts: fact_stats,
        elapsed_ms: started.elapsed().as_millis(),
    };

    info!(
        "✓ Transformation committed: {} locations, {} fact rows in {} ms",
        summary.locations.rows_kept, summary.facts.rows, summary.elapsed_ms
    );
    Ok(summary)
}

/// Load the raw CSV files from `data_dir` into the raw tables
pub async fn run_load(
    pool: &SqlitePool,
    data_dir: &Path,
    config: &EtlConfig,
) -> Result<RunSummary> {
    let started = Instant::now();

    let loaded_rows = csv_loader::load_raw_tables(pool, data_dir, config.insert_batch_size)
        .await
        .stage(PipelineStage::LoadRaw)?;

    Ok(RunSummary {
        loaded_rows,
        elapsed_ms: started.elapsed().as_millis(),
        ..RunSummary::default()
    })
}

/// Load, then transform
pub async fn run_all(pool: &SqlitePool, data_dir: &Path, config: &EtlConfig) -> Result<RunSummary> {
    let started = Instant::now();

    let load = run_load(pool, data_dir, config).await?;
    let mut summary = run_transform(pool, config).await?;

    summary.loaded_rows = load.loaded_rows;
    summary.elapsed_ms = started.elapsed().as_millis();
    Ok(summary)
}
