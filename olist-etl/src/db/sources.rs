//! Raw source table readers
//!
//! Every required column is read as nullable TEXT (see `SourceTable::select_sql`)
//! and mapped positionally into the raw record types.

use crate::models::{
    RawCategoryTranslation, RawCustomer, RawGeolocation, RawOrder, RawOrderItem, RawPayment,
    RawProduct, RawReview, RawSeller, SourceTables,
};
use olist_common::db::{
    SchemaIntrospector, SourceTable, CATEGORY_TRANSLATION, CUSTOMERS, GEOLOCATION, ORDERS,
    ORDER_ITEMS, ORDER_PAYMENTS, ORDER_REVIEWS, PRODUCTS, SELLERS, SOURCE_TABLES,
};
use olist_common::Result;
use sqlx::{Row, SqliteConnection};
use std::vec::IntoIter;
use tracing::{debug, info};

/// Raw record built from the columns of one source row, in declaration order
pub trait FromTextColumns: Sized {
    fn from_columns(columns: &mut IntoIter<Option<String>>) -> Self;
}

fn next(columns: &mut IntoIter<Option<String>>) -> Option<String> {
    columns.next().flatten()
}

impl FromTextColumns for RawOrder {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            order_id: next(c),
            customer_id: next(c),
            order_status: next(c),
            order_purchase_timestamp: next(c),
            order_approved_at: next(c),
            order_delivered_carrier_date: next(c),
            order_delivered_customer_date: next(c),
            order_estimated_delivery_date: next(c),
        }
    }
}

impl FromTextColumns for RawCustomer {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            customer_id: next(c),
            customer_zip_code_prefix: next(c),
            customer_city: next(c),
            customer_state: next(c),
        }
    }
}

impl FromTextColumns for RawSeller {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            seller_id: next(c),
            seller_zip_code_prefix: next(c),
            seller_city: next(c),
            seller_state: next(c),
        }
    }
}

impl FromTextColumns for RawGeolocation {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            geolocation_zip_code_prefix: next(c),
            geolocation_city: next(c),
            geolocation_state: next(c),
        }
    }
}

impl FromTextColumns for RawOrderItem {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            order_id: next(c),
            order_item_id: next(c),
            product_id: next(c),
            seller_id: next(c),
            price: next(c),
            freight_value: next(c),
        }
    }
}

impl FromTextColumns for RawPayment {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            order_id: next(c),
            payment_type: next(c),
            payment_value: next(c),
            payment_installments: next(c),
        }
    }
}

impl FromTextColumns for RawReview {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            order_id: next(c),
            review_score: next(c),
            review_creation_date: next(c),
            review_answer_timestamp: next(c),
        }
    }
}

impl FromTextColumns for RawProduct {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            product_id: next(c),
            product_category_name: next(c),
        }
    }
}

impl FromTextColumns for RawCategoryTranslation {
    fn from_columns(c: &mut IntoIter<Option<String>>) -> Self {
        Self {
            product_category_name: next(c),
            product_category_name_english: next(c),
        }
    }
}

/// Fail with `Error::InputShape` unless every source table has its required columns
pub async fn validate_sources(conn: &mut SqliteConnection) -> Result<()> {
    for table in SOURCE_TABLES {
        SchemaIntrospector::require_columns(conn, table.name, table.columns).await?;
    }
    debug!("All {} source tables have their required columns", SOURCE_TABLES.len());
    Ok(())
}

/// Read every row of one source table
pub async fn read_table<T: FromTextColumns>(
    conn: &mut SqliteConnection,
    table: &SourceTable,
) -> Result<Vec<T>> {
    let rows = sqlx::query(&table.select_sql())
        .fetch_all(&mut *conn)
        .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut columns = Vec::with_capacity(table.columns.len());
        for i in 0..table.columns.len() {
            columns.push(row.try_get::<Option<String>, _>(i)?);
        }
        records.push(T::from_columns(&mut columns.into_iter()));
    }

    Ok(records)
}

/// Validate, then read the full snapshot of all source tables
pub async fn read_sources(conn: &mut SqliteConnection) -> Result<SourceTables> {
    validate_sources(conn).await?;

    let sources = SourceTables {
        orders: read_table(conn, &ORDERS).await?,
        customers: read_table(conn, &CUSTOMERS).await?,
        sellers: read_table(conn, &SELLERS).await?,
        geolocation: read_table(conn, &GEOLOCATION).await?,
        order_items: read_table(conn, &ORDER_ITEMS).await?,
        payments: read_table(conn, &ORDER_PAYMENTS).await?,
        reviews: read_table(conn, &ORDER_REVIEWS).await?,
        products: read_table(conn, &PRODUCTS).await?,
        translations: read_table(conn, &CATEGORY_TRANSLATION).await?,
    };

    for (table, count) in sources.row_counts() {
        info!("Read {} rows from {}", count, table);
    }

    Ok(sources)
}
