//! Raw source rows
//!
//! Every field is read as nullable text; casting happens in the views of the
//! fact assembler so that malformed data surfaces as a transformation fault
//! with row context instead of a driver decode error.

/// One row of `orders`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrder {
    pub order_id: Option<String>,
    pub customer_id: Option<String>,
    pub order_status: Option<String>,
    pub order_purchase_timestamp: Option<String>,
    pub order_approved_at: Option<String>,
    pub order_delivered_carrier_date: Option<String>,
    pub order_delivered_customer_date: Option<String>,
    pub order_estimated_delivery_date: Option<String>,
}

/// One row of `customers`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCustomer {
    pub customer_id: Option<String>,
    pub customer_zip_code_prefix: Option<String>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,
}

/// One row of `sellers`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSeller {
    pub seller_id: Option<String>,
    pub seller_zip_code_prefix: Option<String>,
    pub seller_city: Option<String>,
    pub seller_state: Option<String>,
}

/// One row of `geolocation` (many rows per prefix, possibly conflicting)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeolocation {
    pub geolocation_zip_code_prefix: Option<String>,
    pub geolocation_city: Option<String>,
    pub geolocation_state: Option<String>,
}

/// One row of `order_items`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawOrderItem {
    pub order_id: Option<String>,
    pub order_item_id: Option<String>,
    pub product_id: Option<String>,
    pub seller_id: Option<String>,
    pub price: Option<String>,
    pub freight_value: Option<String>,
}

/// One row of `order_payments`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayment {
    pub order_id: Option<String>,
    pub payment_type: Option<String>,
    pub payment_value: Option<String>,
    pub payment_installments: Option<String>,
}

/// One row of `order_reviews`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReview {
    pub order_id: Option<String>,
    pub review_score: Option<String>,
    pub review_creation_date: Option<String>,
    pub review_answer_timestamp: Option<String>,
}

/// One row of `products`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub product_id: Option<String>,
    pub product_category_name: Option<String>,
}

/// One row of `product_category_name_translation`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCategoryTranslation {
    pub product_category_name: Option<String>,
    pub product_category_name_english: Option<String>,
}

/// A raw row carrying a postal prefix, a city and a state
pub trait LocationSource {
    fn zip_code_prefix(&self) -> Option<&str>;
    fn city(&self) -> Option<&str>;
    fn state(&self) -> Option<&str>;
}

impl LocationSource for RawCustomer {
    fn zip_code_prefix(&self) -> Option<&str> {
        self.customer_zip_code_prefix.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.customer_city.as_deref()
    }
    fn state(&self) -> Option<&str> {
        self.customer_state.as_deref()
    }
}

impl LocationSource for RawSeller {
    fn zip_code_prefix(&self) -> Option<&str> {
        self.seller_zip_code_prefix.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.seller_city.as_deref()
    }
    fn state(&self) -> Option<&str> {
        self.seller_state.as_deref()
    }
}

impl LocationSource for RawGeolocation {
    fn zip_code_prefix(&self) -> Option<&str> {
        self.geolocation_zip_code_prefix.as_deref()
    }
    fn city(&self) -> Option<&str> {
        self.geolocation_city.as_deref()
    }
    fn state(&self) -> Option<&str> {
        self.geolocation_state.as_deref()
    }
}

/// Full snapshot of the raw source tables for one run
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub orders: Vec<RawOrder>,
    pub customers: Vec<RawCustomer>,
    pub sellers: Vec<RawSeller>,
    pub geolocation: Vec<RawGeolocation>,
    pub order_items: Vec<RawOrderItem>,
    pub payments: Vec<RawPayment>,
    pub reviews: Vec<RawReview>,
    pub products: Vec<RawProduct>,
    pub translations: Vec<RawCategoryTranslation>,
}

impl SourceTables {
    /// Row count per source table, keyed by table name
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("orders", self.orders.len()),
            ("customers", self.customers.len()),
            ("sellers", self.sellers.len()),
            ("geolocation", self.geolocation.len()),
            ("order_items", self.order_items.len()),
            ("order_payments", self.payments.len()),
            ("order_reviews", self.reviews.len()),
            ("products", self.products.len()),
            ("product_category_name_translation", self.translations.len()),
        ]
    }
}
