//! Table Schema Definitions
//!
//! Single source of truth for the published tables (`dim_locations`,
//! `master_table`) and for the columns the transform requires from each raw
//! source table.

use crate::db::schema::{ColumnDefinition, IndexDefinition, TableSchema};

/// Canonical location dimension
pub struct DimLocationsSchema;

impl TableSchema for DimLocationsSchema {
    fn table_name() -> &'static str {
        "dim_locations"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("location_id", "INTEGER").primary_key(),
            ColumnDefinition::new("zip_code_prefix", "TEXT").not_null(),
            ColumnDefinition::new("city", "TEXT").not_null(),
            ColumnDefinition::new("state_code", "TEXT").not_null(),
            // NULL for codes outside the federative-unit table
            ColumnDefinition::new("state_name", "TEXT"),
        ]
    }

    fn indexes() -> Vec<IndexDefinition> {
        vec![IndexDefinition::unique(
            "uq_dim_locations_key",
            &["zip_code_prefix", "city", "state_code"],
        )]
    }
}

/// Order-item-grain fact table
pub struct MasterTableSchema;

impl TableSchema for MasterTableSchema {
    fn table_name() -> &'static str {
        "master_table"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("order_id", "TEXT").not_null(),
            ColumnDefinition::new("order_item_id", "INTEGER").not_null(),

            // Order attributes
            ColumnDefinition::new("order_status", "TEXT"),
            ColumnDefinition::new("order_purchase_ts", "TIMESTAMP"),
            ColumnDefinition::new("order_approved_ts", "TIMESTAMP"),
            ColumnDefinition::new("order_delivered_carrier_ts", "TIMESTAMP"),
            ColumnDefinition::new("order_delivered_customer_ts", "TIMESTAMP"),
            ColumnDefinition::new("order_estimated_delivery_ts", "TIMESTAMP"),

            // Party attributes
            ColumnDefinition::new("customer_id", "TEXT"),
            ColumnDefinition::new("customer_location_id", "INTEGER"),
            ColumnDefinition::new("customer_zip_prefix", "TEXT"),
            ColumnDefinition::new("customer_city_norm", "TEXT"),
            ColumnDefinition::new("customer_state_norm", "TEXT"),
            ColumnDefinition::new("seller_id", "TEXT"),
            ColumnDefinition::new("seller_location_id", "INTEGER"),
            ColumnDefinition::new("seller_zip_prefix", "TEXT"),
            ColumnDefinition::new("seller_city_norm", "TEXT"),
            ColumnDefinition::new("seller_state_norm", "TEXT"),

            // Product attributes
            ColumnDefinition::new("product_id", "TEXT"),
            ColumnDefinition::new("product_category_pt", "TEXT"),
            ColumnDefinition::new("product_category_en", "TEXT"),

            // Commercial attributes
            ColumnDefinition::new("item_price", "NUMERIC(12,2)"),
            ColumnDefinition::new("item_freight", "NUMERIC(12,2)"),
            ColumnDefinition::new("item_gross_revenue", "NUMERIC(12,2)"),
            ColumnDefinition::new("total_payment_value", "NUMERIC(12,2)"),
            ColumnDefinition::new("total_installments", "INTEGER"),
            ColumnDefinition::new("primary_payment_type", "TEXT"),

            // Review attributes
            ColumnDefinition::new("review_score_avg", "REAL"),
            ColumnDefinition::new("first_review_creation_ts", "TIMESTAMP"),
            ColumnDefinition::new("last_review_answer_ts", "TIMESTAMP"),

            // Delivery KPIs
            ColumnDefinition::new("delivery_days_actual", "REAL"),
            ColumnDefinition::new("delivery_days_estimated", "REAL"),
            ColumnDefinition::new("delivery_delay_days", "REAL"),
            ColumnDefinition::new("delivered_late_flag", "INTEGER"),
        ]
    }

    fn indexes() -> Vec<IndexDefinition> {
        vec![
            IndexDefinition::unique("pk_master_table", &["order_id", "order_item_id"]),
            IndexDefinition::lookup("idx_master_order_status", &["order_status"]),
            IndexDefinition::lookup("idx_master_purchase_ts", &["order_purchase_ts"]),
            IndexDefinition::lookup("idx_master_product_category", &["product_category_en"]),
            IndexDefinition::lookup("idx_master_customer_loc", &["customer_location_id"]),
            IndexDefinition::lookup("idx_master_seller_loc", &["seller_location_id"]),
            IndexDefinition::lookup("idx_master_seller_id", &["seller_id"]),
            IndexDefinition::lookup("idx_master_product_id", &["product_id"]),
        ]
    }
}

/// A raw source table and the columns the transform reads from it
#[derive(Debug, Clone, Copy)]
pub struct SourceTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const ORDERS: SourceTable = SourceTable {
    name: "orders",
    columns: &[
        "order_id",
        "customer_id",
        "order_status",
        "order_purchase_timestamp",
        "order_approved_at",
        "order_delivered_carrier_date",
        "order_delivered_customer_date",
        "order_estimated_delivery_date",
    ],
};

pub const CUSTOMERS: SourceTable = SourceTable {
    name: "customers",
    columns: &[
        "customer_id",
        "customer_zip_code_prefix",
        "customer_city",
        "customer_state",
    ],
};

pub const SELLERS: SourceTable = SourceTable {
    name: "sellers",
    columns: &[
        "seller_id",
        "seller_zip_code_prefix",
        "seller_city",
        "seller_state",
    ],
};

pub const GEOLOCATION: SourceTable = SourceTable {
    name: "geolocation",
    columns: &[
        "geolocation_zip_code_prefix",
        "geolocation_city",
        "geolocation_state",
    ],
};

pub const ORDER_ITEMS: SourceTable = SourceTable {
    name: "order_items",
    columns: &[
        "order_id",
        "order_item_id",
        "product_id",
        "seller_id",
        "price",
        "freight_value",
    ],
};

pub const ORDER_PAYMENTS: SourceTable = SourceTable {
    name: "order_payments",
    columns: &[
        "order_id",
        "payment_type",
        "payment_value",
        "payment_installments",
    ],
};

pub const ORDER_REVIEWS: SourceTable = SourceTable {
    name: "order_reviews",
    columns: &[
        "order_id",
        "review_score",
        "review_creation_date",
        "review_answer_timestamp",
    ],
};

pub const PRODUCTS: SourceTable = SourceTable {
    name: "products",
    columns: &["product_id", "product_category_name"],
};

pub const CATEGORY_TRANSLATION: SourceTable = SourceTable {
    name: "product_category_name_translation",
    columns: &["product_category_name", "product_category_name_english"],
};

/// Every source table the transform reads, in read order
pub const SOURCE_TABLES: [SourceTable; 9] = [
    ORDERS,
    CUSTOMERS,
    SELLERS,
    GEOLOCATION,
    ORDER_ITEMS,
    ORDER_PAYMENTS,
    ORDER_REVIEWS,
    PRODUCTS,
    CATEGORY_TRANSLATION,
];

impl SourceTable {
    /// SELECT with every required column cast to TEXT, in declaration order
    pub fn select_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("CAST({} AS TEXT)", crate::db::schema::quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "SELECT {} FROM {}",
            columns,
            crate::db::schema::quote_ident(self.name)
        )
    }
}
