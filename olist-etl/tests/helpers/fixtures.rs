//! Scenario dataset
//!
//! Three orders plus one orphan item:
//! - o1: delivered early, two items, credit_card 100.00 + voucher 150.00, two reviews
//! - o2: delivered 2.5 days late, paid by boleto, one review
//! - o3: shipped, not yet delivered, no payment, no review
//! - ghost: order item without an order row (must be excluded)
//!
//! Locations: "01310 / Sao Paulo / sp" appears in customers, sellers (as
//! numeric "1310") and geolocation with different casing; "99999 / XX" has an
//! unknown state code.

use super::db_utils::{create_raw_tables, insert_rows};
use anyhow::Result;
use olist_common::db::{
    SourceTable, CATEGORY_TRANSLATION, CUSTOMERS, GEOLOCATION, ORDERS, ORDER_ITEMS,
    ORDER_PAYMENTS, ORDER_REVIEWS, PRODUCTS, SELLERS,
};
use olist_etl::services::csv_loader::FILES_TO_LOAD;
use sqlx::SqlitePool;
use std::path::Path;

type Rows = Vec<Vec<Option<&'static str>>>;

fn orders() -> Rows {
    vec![
        vec![
            Some("o1"),
            Some("c1"),
            Some("delivered"),
            Some("2024-01-01 00:00:00"),
            Some("2024-01-01 01:00:00"),
            Some("2024-01-02 00:00:00"),
            Some("2024-01-05 00:00:00"),
            Some("2024-01-10 00:00:00"),
        ],
        vec![
            Some("o2"),
            Some("c2"),
            Some(" Delivered "),
            Some("2024-02-01 00:00:00"),
            None,
            None,
            Some("2024-02-12 12:00:00"),
            Some("2024-02-10 00:00:00"),
        ],
        vec![
            Some("o3"),
            Some("c1"),
            Some("SHIPPED"),
            Some("2024-03-01 00:00:00"),
            None,
            None,
            None,
            Some("2024-03-15 00:00:00"),
        ],
    ]
}

fn customers() -> Rows {
    vec![
        vec![Some("c1"), Some("01310"), Some("Sao Paulo"), Some("sp")],
        vec![Some("c2"), Some("20040"), Some("rio de janeiro"), Some("RJ")],
    ]
}

fn sellers() -> Rows {
    vec![
        vec![Some("s1"), Some("1310"), Some("SAO PAULO "), Some("SP")],
        vec![Some("s2"), Some("30110"), Some("belo horizonte"), Some("mg")],
    ]
}

fn geolocation() -> Rows {
    vec![
        vec![Some("01310"), Some("SAO PAULO"), Some("SP")],
        vec![Some("01310"), Some("sao paulo"), Some("sp")],
        vec![Some("99999"), Some("Somewhere"), Some("XX")],
        vec![Some("88888"), None, Some("SC")],
    ]
}

fn order_items() -> Rows {
    vec![
        vec![Some("o1"), Some("1"), Some("p1"), Some("s1"), Some("100.00"), Some("10.00")],
        vec![Some("o1"), Some("2"), Some("p2"), Some("s2"), Some("49.90"), Some("5.10")],
        vec![Some("o2"), Some("1"), Some("p1"), Some("s2"), Some("30"), Some("2.5")],
        vec![Some("o3"), Some("1"), Some("p3"), Some("s1"), Some("10.00"), None],
        vec![Some("ghost"), Some("1"), Some("p1"), Some("s1"), Some("1.00"), Some("1.00")],
    ]
}

fn payments() -> Rows {
    vec![
        vec![Some("o1"), Some("credit_card"), Some("100.00"), Some("3")],
        vec![Some("o1"), Some("voucher"), Some("150.00"), Some("0")],
        vec![Some("o2"), Some("boleto"), Some("32.50"), Some("1")],
    ]
}

fn reviews() -> Rows {
    vec![
        vec![
            Some("o1"),
            Some("4"),
            Some("2024-01-06 00:00:00"),
            Some("2024-01-07 10:00:00"),
        ],
        vec![
            Some("o1"),
            Some("5"),
            Some("2024-01-05 00:00:00"),
            Some("2024-01-08 00:00:00"),
        ],
        vec![
            Some("o2"),
            Some("1"),
            Some("2024-02-13 00:00:00"),
            Some("2024-02-13 08:00:00"),
        ],
    ]
}

fn products() -> Rows {
    vec![
        vec![Some("p1"), Some("beleza_saude")],
        vec![Some("p2"), Some(" Pet_Shop ")],
        vec![Some("p3"), None],
    ]
}

fn translations() -> Rows {
    vec![vec![Some("beleza_saude"), Some("health_beauty")]]
}

fn scenario() -> Vec<(SourceTable, Rows)> {
    vec![
        (ORDERS, orders()),
        (CUSTOMERS, customers()),
        (SELLERS, sellers()),
        (GEOLOCATION, geolocation()),
        (ORDER_ITEMS, order_items()),
        (ORDER_PAYMENTS, payments()),
        (ORDER_REVIEWS, reviews()),
        (PRODUCTS, products()),
        (CATEGORY_TRANSLATION, translations()),
    ]
}

/// Create the raw tables and fill them with the scenario dataset
pub async fn seed_scenario(pool: &SqlitePool) -> Result<()> {
    create_raw_tables(pool).await?;
    for (table, rows) in scenario() {
        insert_rows(pool, table.name, table.columns, &rows).await?;
    }
    Ok(())
}

/// Write the scenario dataset as the nine Olist CSV files
///
/// Each file carries one extra trailing column, as the real dataset does.
pub fn write_scenario_csvs(dir: &Path) -> Result<()> {
    for (table, rows) in scenario() {
        let file = FILES_TO_LOAD
            .iter()
            .find(|(_, name)| *name == table.name)
            .map(|(file, _)| *file)
            .ok_or_else(|| anyhow::anyhow!("no CSV file for {}", table.name))?;

        let mut text = format!("\u{FEFF}{},extra_column\n", table.columns.join(","));
        for row in rows {
            let fields: Vec<&str> = row.iter().map(|v| v.unwrap_or("")).collect();
            text.push_str(&fields.join(","));
            text.push_str(",x\n");
        }
        std::fs::write(dir.join(file), text)?;
    }
    Ok(())
}
