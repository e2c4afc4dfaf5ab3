//! Delivery KPIs
//!
//! Null-safe: a missing input timestamp nulls the derived value.

use crate::models::DeliveryKpis;
use crate::utils::casts::days_between;
use chrono::NaiveDateTime;

/// Derive the delivery KPIs of one order
pub fn compute_kpis(
    purchase: Option<NaiveDateTime>,
    delivered_customer: Option<NaiveDateTime>,
    estimated_delivery: Option<NaiveDateTime>,
) -> DeliveryKpis {
    DeliveryKpis {
        delivery_days_actual: days_between(delivered_customer, purchase),
        delivery_days_estimated: days_between(estimated_delivery, purchase),
        delivery_delay_days: days_between(delivered_customer, estimated_delivery),
        delivered_late_flag: delivered_customer
            .zip(estimated_delivery)
            .map(|(delivered, estimated)| delivered > estimated),
    }
}
