//! Typed intermediate views of the fact assembler
//!
//! Each view is one explicit record type plus a builder producing a hash map
//! keyed by its join key. Rows without a join key cannot participate in any
//! join and are skipped. A key may only repeat with an identical row; such
//! repeats are counted and dropped, any other repeat is a constraint violation.

use crate::models::{
    LocationRecord, RawCategoryTranslation, RawCustomer, RawOrder, RawOrderItem, RawPayment,
    RawProduct, RawReview, RawSeller,
};
use crate::services::normalizer::normalize;
use crate::utils::casts::{
    lower_trim, non_blank, parse_integer, parse_money, parse_real, parse_timestamp,
};
use chrono::NaiveDateTime;
use olist_common::{Error, Result};
use rust_decimal::Decimal;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Timestamp cast with the configured policy for malformed values
#[derive(Debug, Default)]
pub struct TimestampCaster {
    strict: bool,
    nulled: usize,
}

impl TimestampCaster {
    pub fn new(strict: bool) -> Self {
        Self { strict, nulled: 0 }
    }

    /// Cast one value; `column` and `row` only feed error/warning context
    pub fn cast(
        &mut self,
        raw: Option<&str>,
        column: &str,
        row: usize,
    ) -> Result<Option<NaiveDateTime>> {
        match parse_timestamp(raw) {
            Ok(ts) => Ok(ts),
            Err(reason) if self.strict => Err(cast_error(column, row, reason)),
            Err(reason) => {
                self.nulled += 1;
                warn!("{} row {}: {} - treated as NULL", column, row, reason);
                Ok(None)
            }
        }
    }

    /// Malformed values coerced to NULL so far
    pub fn nulled(&self) -> usize {
        self.nulled
    }
}

fn cast_error(column: &str, row: usize, reason: String) -> Error {
    Error::Transform(format!("{} row {}: {}", column, row, reason))
}

fn conflicting_key(table: &str, key: &str) -> Error {
    Error::ConstraintViolation(format!("{} has conflicting rows for key '{}'", table, key))
}

/// Lookup map plus the number of identical repeated rows that were dropped
#[derive(Debug)]
pub struct Keyed<V> {
    pub rows: HashMap<String, V>,
    pub duplicates: usize,
}

impl<V: PartialEq> Keyed<V> {
    fn new() -> Self {
        Self {
            rows: HashMap::new(),
            duplicates: 0,
        }
    }

    /// Insert one row; a repeated key must carry the same row
    fn insert(&mut self, table: &str, key: String, value: V) -> Result<()> {
        match self.rows.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(slot) => {
                if *slot.get() != value {
                    return Err(conflicting_key(table, slot.key()));
                }
                self.duplicates += 1;
                if self.duplicates == 1 {
                    warn!("{}: identical repeated row dropped", table);
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.rows.get(key)
    }
}

// ---------------------------------------------------------------------------
// Order view

/// One order with cleaned status and typed timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct OrderView {
    pub customer_id: Option<String>,
    pub status: Option<String>,
    pub purchase_ts: Option<NaiveDateTime>,
    pub approved_ts: Option<NaiveDateTime>,
    pub delivered_carrier_ts: Option<NaiveDateTime>,
    pub delivered_customer_ts: Option<NaiveDateTime>,
    pub estimated_delivery_ts: Option<NaiveDateTime>,
}

pub fn build_order_view(
    orders: &[RawOrder],
    caster: &mut TimestampCaster,
) -> Result<Keyed<OrderView>> {
    let mut view = Keyed::new();

    for (i, order) in orders.iter().enumerate() {
        let row = i + 1;
        let Some(order_id) = non_blank(order.order_id.as_deref()) else {
            continue;
        };

        let purchase_ts = caster.cast(
            order.order_purchase_timestamp.as_deref(),
            "orders.order_purchase_timestamp",
            row,
        )?;
        let approved_ts =
            caster.cast(order.order_approved_at.as_deref(), "orders.order_approved_at", row)?;
        let delivered_carrier_ts = caster.cast(
            order.order_delivered_carrier_date.as_deref(),
            "orders.order_delivered_carrier_date",
            row,
        )?;
        let delivered_customer_ts = caster.cast(
            order.order_delivered_customer_date.as_deref(),
            "orders.order_delivered_customer_date",
            row,
        )?;
        let estimated_delivery_ts = caster.cast(
            order.order_estimated_delivery_date.as_deref(),
            "orders.order_estimated_delivery_date",
            row,
        )?;

        view.insert(
            "orders",
            order_id.to_string(),
            OrderView {
                customer_id: non_blank(order.customer_id.as_deref()).map(str::to_string),
                status: lower_trim(order.order_status.as_deref()),
                purchase_ts,
                approved_ts,
                delivered_carrier_ts,
                delivered_customer_ts,
                estimated_delivery_ts,
            },
        )?;
    }

    Ok(view)
}

// ---------------------------------------------------------------------------
// Item view

/// One order item with money cast to two fractional digits
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub order_id: Option<String>,
    pub order_item_id: i64,
    pub product_id: Option<String>,
    pub seller_id: Option<String>,
    pub price: Option<Decimal>,
    pub freight: Option<Decimal>,
}

/// Items in source order (no keying: the item view drives the final join)
pub fn build_item_view(items: &[RawOrderItem]) -> Result<Vec<ItemView>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let row = i + 1;
            let order_item_id = parse_integer(item.order_item_id.as_deref())
                .map_err(|reason| cast_error("order_items.order_item_id", row, reason))?
                .ok_or_else(|| {
                    Error::Transform(format!("order_items row {}: order_item_id is NULL", row))
                })?;

            Ok(ItemView {
                order_id: non_blank(item.order_id.as_deref()).map(str::to_string),
                order_item_id,
                product_id: non_blank(item.product_id.as_deref()).map(str::to_string),
                seller_id: non_blank(item.seller_id.as_deref()).map(str::to_string),
                price: parse_money(item.price.as_deref())
                    .map_err(|reason| cast_error("order_items.price", row, reason))?,
                freight: parse_money(item.freight_value.as_deref())
                    .map_err(|reason| cast_error("order_items.freight_value", row, reason))?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Payment aggregate view

/// Per-order payment facts
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAggregate {
    /// Sum of payment values; NULL if every value was NULL
    pub total_payment_value: Option<Decimal>,
    /// Sum of installment counts, zeros excluded
    pub total_installments: i64,
    /// Payment type contributing the largest total value
    pub primary_payment_type: Option<String>,
}

#[derive(Debug, Default)]
struct PaymentAccumulator {
    total: Option<Decimal>,
    installments: i64,
    // Iterated in lexical order of payment type
    by_type: BTreeMap<String, Decimal>,
}

impl PaymentAccumulator {
    fn finish(self) -> PaymentAggregate {
        let mut primary: Option<(String, Decimal)> = None;
        for (payment_type, value) in self.by_type {
            // Strictly greater: on a tie the lexically smaller type stays
            if primary.as_ref().map_or(true, |(_, best)| value > *best) {
                primary = Some((payment_type, value));
            }
        }

        PaymentAggregate {
            total_payment_value: self.total,
            total_installments: self.installments,
            primary_payment_type: primary.map(|(payment_type, _)| payment_type),
        }
    }
}

pub fn build_payment_view(payments: &[RawPayment]) -> Result<HashMap<String, PaymentAggregate>> {
    let mut accumulators: HashMap<String, PaymentAccumulator> = HashMap::new();

    for (i, payment) in payments.iter().enumerate() {
        let row = i + 1;
        let Some(order_id) = non_blank(payment.order_id.as_deref()) else {
            continue;
        };

        let value = parse_money(payment.payment_value.as_deref())
            .map_err(|reason| cast_error("order_payments.payment_value", row, reason))?;
        let installments = parse_integer(payment.payment_installments.as_deref())
            .map_err(|reason| cast_error("order_payments.payment_installments", row, reason))?;

        let acc = accumulators.entry(order_id.to_string()).or_default();

        let overflow = || cast_error("order_payments", row, "order total overflows".to_string());

        if let Some(value) = value {
            let total = acc.total.unwrap_or(Decimal::ZERO);
            acc.total = Some(total.checked_add(value).ok_or_else(overflow)?);
            if let Some(payment_type) = lower_trim(payment.payment_type.as_deref()) {
                let by_type = acc.by_type.entry(payment_type).or_insert(Decimal::ZERO);
                *by_type = by_type.checked_add(value).ok_or_else(overflow)?;
            }
        }

        // Zero marks a payment type without installments, not a count
        if let Some(n) = installments.filter(|n| *n != 0) {
            acc.installments = acc.installments.checked_add(n).ok_or_else(overflow)?;
        }
    }

    Ok(accumulators
        .into_iter()
        .map(|(order_id, acc)| (order_id, acc.finish()))
        .collect())
}

// ---------------------------------------------------------------------------
// Review aggregate view

/// Per-order review facts
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAggregate {
    pub score_avg: Option<f64>,
    pub first_creation_ts: Option<NaiveDateTime>,
    pub last_answer_ts: Option<NaiveDateTime>,
}

#[derive(Debug, Default)]
struct ReviewAccumulator {
    score_sum: f64,
    score_count: usize,
    first_creation_ts: Option<NaiveDateTime>,
    last_answer_ts: Option<NaiveDateTime>,
}

pub fn build_review_view(
    reviews: &[RawReview],
    caster: &mut TimestampCaster,
) -> Result<HashMap<String, ReviewAggregate>> {
    let mut accumulators: HashMap<String, ReviewAccumulator> = HashMap::new();

    for (i, review) in reviews.iter().enumerate() {
        let row = i + 1;
        let Some(order_id) = non_blank(review.order_id.as_deref()) else {
            continue;
        };

        let score = parse_real(review.review_score.as_deref())
            .map_err(|reason| cast_error("order_reviews.review_score", row, reason))?;
        let created = caster.cast(
            review.review_creation_date.as_deref(),
            "order_reviews.review_creation_date",
            row,
        )?;
        let answered = caster.cast(
            review.review_answer_timestamp.as_deref(),
            "order_reviews.review_answer_timestamp",
            row,
        )?;

        let acc = accumulators.entry(order_id.to_string()).or_default();
        if let Some(score) = score {
            acc.score_sum += score;
            acc.score_count += 1;
        }
        acc.first_creation_ts = min_option(acc.first_creation_ts, created);
        acc.last_answer_ts = max_option(acc.last_answer_ts, answered);
    }

    Ok(accumulators
        .into_iter()
        .map(|(order_id, acc)| {
            let score_avg =
                (acc.score_count > 0).then(|| acc.score_sum / acc.score_count as f64);
            (
                order_id,
                ReviewAggregate {
                    score_avg,
                    first_creation_ts: acc.first_creation_ts,
                    last_answer_ts: acc.last_answer_ts,
                },
            )
        })
        .collect())
}

/// MIN ignoring NULLs
fn min_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// MAX ignoring NULLs
fn max_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

// ---------------------------------------------------------------------------
// Product view

/// Category of one product in the original and the translated language
#[derive(Debug, Clone, PartialEq)]
pub struct ProductView {
    pub category_pt: Option<String>,
    pub category_en: Option<String>,
}

/// Exact-match translation table (original name -> translated name)
#[derive(Debug, Default)]
pub struct CategoryTranslations {
    names: HashMap<String, Option<String>>,
}

impl CategoryTranslations {
    /// Build the table; one original name may not map to two translations
    pub fn from_rows(rows: &[RawCategoryTranslation]) -> Result<Self> {
        let mut names = HashMap::new();
        for row in rows {
            let Some(original) = row.product_category_name.clone() else {
                continue;
            };
            let english = row.product_category_name_english.clone();
            match names.entry(original) {
                Entry::Vacant(slot) => {
                    slot.insert(english);
                }
                Entry::Occupied(slot) if *slot.get() != english => {
                    return Err(conflicting_key("product_category_name_translation", slot.key()));
                }
                Entry::Occupied(_) => {}
            }
        }
        Ok(Self { names })
    }

    /// Translated category, falling back to the original; both lower-cased and trimmed
    pub fn translate(&self, category: Option<&str>) -> Option<String> {
        let translated = category
            .and_then(|name| self.names.get(name))
            .and_then(|english| english.as_deref());
        lower_trim(translated.or(category))
    }
}

pub fn build_product_view(
    products: &[RawProduct],
    translations: &CategoryTranslations,
) -> Result<Keyed<ProductView>> {
    let mut view = Keyed::new();

    for product in products {
        let Some(product_id) = non_blank(product.product_id.as_deref()) else {
            continue;
        };
        let category = product.product_category_name.as_deref();
        view.insert(
            "products",
            product_id.to_string(),
            ProductView {
                category_pt: lower_trim(category),
                category_en: translations.translate(category),
            },
        )?;
    }

    Ok(view)
}

// ---------------------------------------------------------------------------
// Party locations

/// Normalized location of every customer, keyed by customer_id
pub fn build_customer_locations(customers: &[RawCustomer]) -> Result<Keyed<LocationRecord>> {
    let mut view = Keyed::new();
    for customer in customers {
        if let Some(id) = non_blank(customer.customer_id.as_deref()) {
            view.insert("customers", id.to_string(), normalize(customer))?;
        }
    }
    Ok(view)
}

/// Normalized location of every seller, keyed by seller_id
pub fn build_seller_locations(sellers: &[RawSeller]) -> Result<Keyed<LocationRecord>> {
    let mut view = Keyed::new();
    for seller in sellers {
        if let Some(id) = non_blank(seller.seller_id.as_deref()) {
            view.insert("sellers", id.to_string(), normalize(seller))?;
        }
    }
    Ok(view)
}
