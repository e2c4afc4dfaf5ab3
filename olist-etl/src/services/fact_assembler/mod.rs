//! Fact Assembler
//!
//! Produces one `OrderItemFact` per order item.
//!
//! **Joins** (item view drives):
//! - orders: inner join on order_id (items without an order are excluded)
//! - payment aggregate, review aggregate, product view: left joins
//! - customer (through the order) and seller: left joins, then best-effort
//!   resolution against the location dimension
//!
//! All views are built before the projection. Any cast failure, overflowing
//! sum or conflicting repeated lookup row aborts the whole assembly; nothing
//! partial is returned.

pub mod kpi;
pub mod views;

use crate::models::summary::FactStats;
use crate::models::{LocationDimension, OrderItemFact, SourceTables};
use kpi::compute_kpis;
use olist_common::{Error, Result};
use tracing::info;
use views::{
    build_customer_locations, build_item_view, build_order_view, build_payment_view,
    build_product_view, build_review_view, build_seller_locations, CategoryTranslations,
    TimestampCaster,
};

/// Knobs of the assembly step
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblerOptions {
    /// Malformed timestamps abort instead of becoming NULL
    pub strict_timestamps: bool,
}

/// Join, aggregate and derive the fact rows
pub fn assemble_facts(
    sources: &SourceTables,
    locations: &LocationDimension,
    options: AssemblerOptions,
) -> Result<(Vec<OrderItemFact>, FactStats)> {
    let mut caster = TimestampCaster::new(options.strict_timestamps);

    let orders = build_order_view(&sources.orders, &mut caster)?;
    let items = build_item_view(&sources.order_items)?;
    let payments = build_payment_view(&sources.payments)?;
    let reviews = build_review_view(&sources.reviews, &mut caster)?;
    let translations = CategoryTranslations::from_rows(&sources.translations)?;
    let products = build_product_view(&sources.products, &translations)?;
    let customers = build_customer_locations(&sources.customers)?;
    let sellers = build_seller_locations(&sources.sellers)?;

    info!(
        "Views built: {} orders, {} items, {} paid orders, {} reviewed orders, {} products",
        orders.rows.len(),
        items.len(),
        payments.len(),
        reviews.len(),
        products.rows.len()
    );

    let mut stats = FactStats {
        duplicate_lookup_keys: orders.duplicates
            + products.duplicates
            + customers.duplicates
            + sellers.duplicates,
        ..FactStats::default()
    };
    let mut facts = Vec::with_capacity(items.len());

    for item in items {
        let Some(order_id) = item.order_id else {
            stats.items_without_order += 1;
            continue;
        };
        let Some(order) = orders.get(&order_id) else {
            stats.items_without_order += 1;
            continue;
        };

        let customer_location = order
            .customer_id
            .as_deref()
            .and_then(|id| customers.get(id))
            .cloned()
            .unwrap_or_default();
        let seller_location = item
            .seller_id
            .as_deref()
            .and_then(|id| sellers.get(id))
            .cloned()
            .unwrap_or_default();
        let customer_location_id = locations.resolve(&customer_location);
        let seller_location_id = locations.resolve(&seller_location);

        if customer_location_id.is_none() {
            stats.unresolved_customer_locations += 1;
        }
        if seller_location_id.is_none() {
            stats.unresolved_seller_locations += 1;
        }

        let payment = payments.get(&order_id);
        let review = reviews.get(&order_id);
        let product = item.product_id.as_deref().and_then(|id| products.get(id));

        let item_gross_revenue = item
            .price
            .zip(item.freight)
            .map(|(price, freight)| {
                price.checked_add(freight).ok_or_else(|| {
                    Error::Transform(format!(
                        "order_items {}/{}: price + freight overflows",
                        order_id, item.order_item_id
                    ))
                })
            })
            .transpose()?;

        facts.push(OrderItemFact {
            order_item_id: item.order_item_id,

            order_status: order.status.clone(),
            order_purchase_ts: order.purchase_ts,
            order_approved_ts: order.approved_ts,
            order_delivered_carrier_ts: order.delivered_carrier_ts,
            order_delivered_customer_ts: order.delivered_customer_ts,
            order_estimated_delivery_ts: order.estimated_delivery_ts,

            customer_id: order.customer_id.clone(),
            customer_location_id,
            customer_location,
            seller_id: item.seller_id,
            seller_location_id,
            seller_location,

            product_id: item.product_id,
            product_category_pt: product.and_then(|p| p.category_pt.clone()),
            product_category_en: product.and_then(|p| p.category_en.clone()),

            item_price: item.price,
            item_freight: item.freight,
            item_gross_revenue,
            total_payment_value: payment.and_then(|p| p.total_payment_value),
            total_installments: payment.map(|p| p.total_installments),
            primary_payment_type: payment.and_then(|p| p.primary_payment_type.clone()),

            review_score_avg: review.and_then(|r| r.score_avg),
            first_review_creation_ts: review.and_then(|r| r.first_creation_ts),
            last_review_answer_ts: review.and_then(|r| r.last_answer_ts),

            kpis: compute_kpis(
                order.purchase_ts,
                order.delivered_customer_ts,
                order.estimated_delivery_ts,
            ),

            order_id,
        });
    }

    stats.rows = facts.len();
    stats.timestamps_nulled = caster.nulled();

    info!("Fact assembly: {}", stats.display_string());
    Ok((facts, stats))
}
