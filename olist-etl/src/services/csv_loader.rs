//! Raw CSV loader
//!
//! Replaces the nine raw tables from the CSV files of the public Olist
//! dataset. Every column is stored as TEXT; empty fields become NULL. All
//! tables are replaced in one transaction, so a missing or malformed file
//! leaves the previously loaded raw tables untouched.

use crate::db::writer::rows_per_statement;
use olist_common::db::quote_ident;
use olist_common::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// CSV file name -> raw table name
pub const FILES_TO_LOAD: [(&str, &str); 9] = [
    ("olist_customers_dataset.csv", "customers"),
    ("olist_geolocation_dataset.csv", "geolocation"),
    ("olist_order_items_dataset.csv", "order_items"),
    ("olist_order_payments_dataset.csv", "order_payments"),
    ("olist_order_reviews_dataset.csv", "order_reviews"),
    ("olist_orders_dataset.csv", "orders"),
    ("olist_products_dataset.csv", "products"),
    ("olist_sellers_dataset.csv", "sellers"),
    (
        "product_category_name_translation.csv",
        "product_category_name_translation",
    ),
];

/// Header and records of one CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct RawCsv {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Parse CSV text; rows are padded or cut to the header width
pub fn parse_csv(text: &str) -> Result<RawCsv> {
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| match name.trim() {
            "" => format!("column_{}", i + 1),
            trimmed => trimmed.to_string(),
        })
        .collect();

    if columns.is_empty() {
        return Err(Error::Transform("CSV file has no header".to_string()));
    }

    let mut rows = Vec::new();
    let mut ragged = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.len() != columns.len() {
            ragged += 1;
        }
        let row = (0..columns.len())
            .map(|i| record.get(i).filter(|v| !v.is_empty()).map(str::to_string))
            .collect();
        rows.push(row);
    }

    if ragged > 0 {
        warn!("{} records do not match the header width of {}", ragged, columns.len());
    }

    Ok(RawCsv { columns, rows })
}

/// Read and parse one CSV file
pub fn read_csv_file(path: &Path) -> Result<RawCsv> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    parse_csv(&text)
}

/// Drop, recreate and fill one raw table
pub async fn replace_raw_table(
    conn: &mut SqliteConnection,
    table: &str,
    csv: &RawCsv,
    batch_size: usize,
) -> Result<usize> {
    let quoted: Vec<String> = csv.columns.iter().map(|c| quote_ident(c)).collect();

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(table)))
        .execute(&mut *conn)
        .await?;

    let definitions = quoted
        .iter()
        .map(|c| format!("{} TEXT", c))
        .collect::<Vec<_>>()
        .join(", ");
    sqlx::query(&format!("CREATE TABLE {} ({})", quote_ident(table), definitions))
        .execute(&mut *conn)
        .await?;

    let prefix = format!(
        "INSERT INTO {} ({}) ",
        quote_ident(table),
        quoted.join(", ")
    );
    let chunk = rows_per_statement(batch_size, csv.columns.len());

    for rows in csv.rows.chunks(chunk) {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(&prefix);
        qb.push_values(rows, |mut b, row| {
            for value in row {
                b.push_bind(value.clone());
            }
        });
        qb.build().execute(&mut *conn).await?;
    }

    Ok(csv.rows.len())
}

/// Load every raw table from `data_dir`; returns row counts per table
pub async fn load_raw_tables(
    pool: &SqlitePool,
    data_dir: &Path,
    batch_size: usize,
) -> Result<BTreeMap<String, usize>> {
    info!("Loading raw CSV files from {}", data_dir.display());

    // Parse everything up front so a bad file fails before any write
    let mut parsed = Vec::with_capacity(FILES_TO_LOAD.len());
    for (file, table) in FILES_TO_LOAD {
        let csv = read_csv_file(&data_dir.join(file))?;
        parsed.push((table, csv));
    }

    let mut tx = pool.begin().await?;
    let mut counts = BTreeMap::new();

    for (table, csv) in &parsed {
        let rows = replace_raw_table(&mut *tx, table, csv, batch_size).await?;
        info!("Loaded {} rows into {}", rows, table);
        counts.insert(table.to_string(), rows);
    }

    tx.commit().await?;

    info!("✓ Loaded {} raw tables", counts.len());
    Ok(counts)
}
