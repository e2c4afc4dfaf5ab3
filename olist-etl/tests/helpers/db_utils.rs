//! Database Test Utilities

use anyhow::Result;
use olist_common::db::{init_database, quote_ident, SOURCE_TABLES};
use olist_common::EtlConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create temporary file-backed test database
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_olist.db");
    let pool = init_database(&db_path, 1000).await?;
    Ok((temp_dir, pool))
}

/// Config with a small batch size so multi-statement inserts are exercised
pub fn test_config() -> EtlConfig {
    EtlConfig {
        insert_batch_size: 2,
        ..EtlConfig::default()
    }
}

/// Create every raw source table (TEXT columns) without rows
pub async fn create_raw_tables(pool: &SqlitePool) -> Result<()> {
    for table in SOURCE_TABLES {
        let columns = table
            .columns
            .iter()
            .map(|c| format!("{} TEXT", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table.name)))
            .execute(pool)
            .await?;
        sqlx::query(&format!("CREATE TABLE {} ({})", quote_ident(table.name), columns))
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Insert rows into a raw table, one value per column in order
pub async fn insert_rows(
    pool: &SqlitePool,
    table: &str,
    columns: &[&str],
    rows: &[Vec<Option<&str>>],
) -> Result<()> {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list,
        placeholders
    );

    for row in rows {
        let mut query = sqlx::query(&sql);
        for value in row {
            query = query.bind(*value);
        }
        query.execute(pool).await?;
    }
    Ok(())
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", quote_ident(table)))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Number of key values that occur more than once
pub async fn duplicate_keys(pool: &SqlitePool, table: &str, key: &[&str]) -> Result<i64> {
    let columns = key.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", ");
    let sql = format!(
        "SELECT COUNT(*) FROM (SELECT {cols} FROM {table} GROUP BY {cols} HAVING COUNT(*) > 1)",
        cols = columns,
        table = quote_ident(table)
    );
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}
