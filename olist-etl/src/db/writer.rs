//! Destination table writers
//!
//! Both published tables are dropped, recreated from their `TableSchema` and
//! filled with multi-row INSERT statements. Callers run these inside the
//! pipeline transaction; nothing here commits.

use crate::models::{LocationDimension, OrderItemFact};
use crate::utils::casts::format_timestamp;
use chrono::NaiveDateTime;
use olist_common::db::{quote_ident, DimLocationsSchema, MasterTableSchema, TableSchema};
use olist_common::Result;
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::info;

/// Upper bound on bound parameters per statement (SQLite >= 3.32)
pub const MAX_BIND_PARAMETERS: usize = 32_766;

/// Rows per INSERT, capped so that `columns * rows` stays under the bind limit
pub fn rows_per_statement(batch_size: usize, columns: usize) -> usize {
    let cap = MAX_BIND_PARAMETERS / columns.max(1);
    batch_size.clamp(1, cap.max(1))
}

/// Drop and recreate the table described by `T`
pub async fn recreate_table<T: TableSchema>(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(&T::drop_table_sql()).execute(&mut *conn).await?;
    sqlx::query(&T::create_table_sql()).execute(&mut *conn).await?;
    Ok(())
}

fn insert_prefix<T: TableSchema>() -> String {
    let columns = T::column_names()
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) ", quote_ident(T::table_name()), columns)
}

fn ts(value: Option<NaiveDateTime>) -> Option<String> {
    value.as_ref().map(format_timestamp)
}

fn money(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// Replace `dim_locations` with the given dimension
pub async fn write_locations(
    conn: &mut SqliteConnection,
    dimension: &LocationDimension,
    batch_size: usize,
) -> Result<usize> {
    recreate_table::<DimLocationsSchema>(conn).await?;

    let prefix = insert_prefix::<DimLocationsSchema>();
    let chunk = rows_per_statement(batch_size, DimLocationsSchema::expected_columns().len());

    for rows in dimension.rows().chunks(chunk) {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(&prefix);
        qb.push_values(rows, |mut b, row| {
            b.push_bind(row.location_id.0)
                .push_bind(row.key.postal_prefix.clone())
                .push_bind(row.key.city_norm.clone())
                .push_bind(row.key.state_norm.clone())
                .push_bind(row.state_name);
        });
        qb.build().execute(&mut *conn).await?;
    }

    info!("✓ Wrote {} rows to dim_locations", dimension.len());
    Ok(dimension.len())
}

/// Replace `master_table` with the given fact rows
pub async fn write_facts(
    conn: &mut SqliteConnection,
    facts: &[OrderItemFact],
    batch_size: usize,
) -> Result<usize> {
    recreate_table::<MasterTableSchema>(conn).await?;

    let prefix = insert_prefix::<MasterTableSchema>();
    let chunk = rows_per_statement(batch_size, MasterTableSchema::expected_columns().len());

    for rows in facts.chunks(chunk) {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(&prefix);
        qb.push_values(rows, |mut b, fact| {
            b.push_bind(fact.order_id.clone())
                .push_bind(fact.order_item_id)
                .push_bind(fact.order_status.clone())
                .push_bind(ts(fact.order_purchase_ts))
                .push_bind(ts(fact.order_approved_ts))
                .push_bind(ts(fact.order_delivered_carrier_ts))
                .push_bind(ts(fact.order_delivered_customer_ts))
                .push_bind(ts(fact.order_estimated_delivery_ts))
                .push_bind(fact.customer_id.clone())
                .push_bind(fact.customer_location_id.map(|id| id.0))
                .push_bind(fact.customer_location.postal_prefix.clone())
                .push_bind(fact.customer_location.city_norm.clone())
                .push_bind(fact.customer_location.state_norm.clone())
                .push_bind(fact.seller_id.clone())
                .push_bind(fact.seller_location_id.map(|id| id.0))
                .push_bind(fact.seller_location.postal_prefix.clone())
                .push_bind(fact.seller_location.city_norm.clone())
                .push_bind(fact.seller_location.state_norm.clone())
                .push_bind(fact.product_id.clone())
                .push_bind(fact.product_category_pt.clone())
                .push_bind(fact.product_category_en.clone())
                .push_bind(money(fact.item_price))
                .push_bind(money(fact.item_freight))
                .push_bind(money(fact.item_gross_revenue))
                .push_bind(money(fact.total_payment_value))
                .push_bind(fact.total_installments)
                .push_bind(fact.primary_payment_type.clone())
                .push_bind(fact.review_score_avg)
                .push_bind(ts(fact.first_review_creation_ts))
                .push_bind(ts(fact.last_review_answer_ts))
                .push_bind(fact.kpis.delivery_days_actual)
                .push_bind(fact.kpis.delivery_days_estimated)
                .push_bind(fact.kpis.delivery_delay_days)
                .push_bind(fact.kpis.delivered_late_flag.map(i64::from));
        });
        qb.build().execute(&mut *conn).await?;
    }

    info!("✓ Wrote {} rows to master_table", facts.len());
    Ok(facts.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationDimensionRow, LocationId, LocationKey};
    use olist_common::db::init_memory_database;

    #[test]
    fn test_rows_per_statement_respects_bind_limit() {
        assert_eq!(rows_per_statement(500, 34), 500);
        assert_eq!(rows_per_statement(5000, 34), MAX_BIND_PARAMETERS / 34);
        assert_eq!(rows_per_statement(0, 5), 1);
    }

    #[tokio::test]
    async fn test_write_locations_replaces_table() {
        let pool = init_memory_database().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let mut dimension = LocationDimension::new();
        for (i, city) in ["CAMPINAS", "VALINHOS", "SOROCABA"].iter().enumerate() {
            dimension.insert(LocationDimensionRow {
                location_id: LocationId(i as i64 + 1),
                key: LocationKey {
                    postal_prefix: "13000".to_string(),
                    city_norm: city.to_string(),
                    state_norm: "SP".to_string(),
                },
                state_name: Some("São Paulo"),
            });
        }

        // Small batch forces several statements; a second write must not append
        write_locations(&mut conn, &dimension, 2).await.unwrap();
        write_locations(&mut conn, &dimension, 2).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dim_locations")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 3);

        let name: String =
            sqlx::query_scalar("SELECT state_name FROM dim_locations WHERE location_id = 2")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(name, "São Paulo");
    }
}
