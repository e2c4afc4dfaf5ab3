//! Schema Finalizer
//!
//! Declares the natural key of `master_table` and adds its lookup indexes.
//! The key is checked in memory before any write so that a duplicate is
//! reported with the offending `(order_id, order_item_id)`; the unique
//! index then enforces the same key inside the database.
//!
//! SQLite has no `ALTER TABLE ... ADD CONSTRAINT`, so the key is a UNIQUE
//! INDEX named `pk_master_table`.

use crate::models::OrderItemFact;
use olist_common::db::{quote_ident, TableSchema};
use olist_common::{Error, Result};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::{debug, info};

/// Fail with `ConstraintViolation` on the first repeated fact key
pub fn check_fact_keys(facts: &[OrderItemFact]) -> Result<()> {
    let mut seen = HashSet::with_capacity(facts.len());
    for fact in facts {
        if !seen.insert(fact.key()) {
            let (order_id, order_item_id) = fact.key();
            return Err(Error::ConstraintViolation(format!(
                "duplicate master_table key (order_id={}, order_item_id={})",
                order_id, order_item_id
            )));
        }
    }
    Ok(())
}

/// Create every index declared by `T` on its freshly written table
pub async fn finalize_table<T: TableSchema>(conn: &mut SqliteConnection) -> Result<()> {
    let table = T::table_name();
    let indexes = T::indexes();

    for index in &indexes {
        let sql = index.create_sql(table);
        debug!("{}", sql);

        sqlx::query(&sql)
            .execute(&mut *conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    Error::ConstraintViolation(format!(
                        "{} rejects duplicate ({}) in {}",
                        index.name,
                        index.columns.join(", "),
                        quote_ident(table)
                    ))
                }
                other => Error::Database(other),
            })?;
    }

    info!("✓ Finalized {} ({} indexes)", table, indexes.len());
    Ok(())
}
