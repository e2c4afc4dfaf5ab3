//! Order-item-grain fact rows

use super::location::{LocationId, LocationRecord};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Delivery-performance KPIs derived from the order timestamps
///
/// Every field is `None` when one of its input timestamps is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeliveryKpis {
    /// delivered-to-customer minus purchase, in fractional days
    pub delivery_days_actual: Option<f64>,
    /// estimated-delivery minus purchase, in fractional days
    pub delivery_days_estimated: Option<f64>,
    /// delivered-to-customer minus estimated-delivery; positive means late
    pub delivery_delay_days: Option<f64>,
    /// delivered strictly after the estimate
    pub delivered_late_flag: Option<bool>,
}

/// One row of `master_table`, identified by `(order_id, order_item_id)`
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemFact {
    pub order_id: String,
    pub order_item_id: i64,

    // Order attributes
    pub order_status: Option<String>,
    pub order_purchase_ts: Option<NaiveDateTime>,
    pub order_approved_ts: Option<NaiveDateTime>,
    pub order_delivered_carrier_ts: Option<NaiveDateTime>,
    pub order_delivered_customer_ts: Option<NaiveDateTime>,
    pub order_estimated_delivery_ts: Option<NaiveDateTime>,

    // Party attributes
    pub customer_id: Option<String>,
    pub customer_location_id: Option<LocationId>,
    pub customer_location: LocationRecord,
    pub seller_id: Option<String>,
    pub seller_location_id: Option<LocationId>,
    pub seller_location: LocationRecord,

    // Product attributes
    pub product_id: Option<String>,
    pub product_category_pt: Option<String>,
    pub product_category_en: Option<String>,

    // Commercial attributes
    pub item_price: Option<Decimal>,
    pub item_freight: Option<Decimal>,
    pub item_gross_revenue: Option<Decimal>,
    pub total_payment_value: Option<Decimal>,
    pub total_installments: Option<i64>,
    pub primary_payment_type: Option<String>,

    // Review attributes
    pub review_score_avg: Option<f64>,
    pub first_review_creation_ts: Option<NaiveDateTime>,
    pub last_review_answer_ts: Option<NaiveDateTime>,

    pub kpis: DeliveryKpis,
}

impl OrderItemFact {
    /// Natural key of the fact row
    pub fn key(&self) -> (&str, i64) {
        (&self.order_id, self.order_item_id)
    }
}
