//! Order and order item records.

mod origin;
mod plan;
mod status;

pub use origin::{CHECKOUT_PREFIX, OriginClass};
pub use plan::{StockAction, TransitionPlan, TransitionRequest, plan_transition};
pub use status::OrderStatus;

use chrono::{DateTime, Utc};
use common::{OrderId, PartyId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::money::{OrderTotals, round_money};

/// An order record.
///
/// Created once (by intake) and mutated only through the transition engine
/// afterwards. Never physically deleted by this subsystem.
///
/// Two flags carry the fulfillment bookkeeping:
/// - `delivery_recorded` — whether the first delivery has been processed;
///   guards the delivery side effects against repeated `delivered` calls.
///   Never reset, not even by cancellation.
/// - `stock_committed` — whether stock is currently decremented on behalf
///   of this order; guards restore-on-cancel so restoration happens exactly
///   once and only when a decrement actually took place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Immutable; its prefix encodes the origin class at creation time.
    pub order_number: String,
    pub origin: OriginClass,
    pub status: OrderStatus,
    /// Party the order is billed against; delivered checkout orders are
    /// reassigned to the sentinel party.
    pub party_id: Option<PartyId>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_recorded: bool,
    pub stock_committed: bool,
    pub shipping_address: String,
    pub billing_address: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order in `Pending` with its origin class derived from
    /// the order number prefix.
    pub fn new(
        order_number: impl Into<String>,
        totals: OrderTotals,
        shipping_address: impl Into<String>,
        billing_address: impl Into<String>,
    ) -> Self {
        let order_number = order_number.into();
        let origin = OriginClass::from_order_number(&order_number);
        Self {
            id: OrderId::new(),
            order_number,
            origin,
            status: OrderStatus::Pending,
            party_id: None,
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            discount: totals.discount,
            total: totals.total(),
            tracking_number: None,
            shipped_at: None,
            delivered_at: None,
            delivery_recorded: false,
            stock_committed: false,
            shipping_address: shipping_address.into(),
            billing_address: billing_address.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns true if the order originated from customer self-checkout.
    pub fn is_checkout(&self) -> bool {
        self.origin == OriginClass::Checkout
    }
}

/// A line item of an order.
///
/// Price, sku and total are snapshots taken when the order was created and
/// are never recomputed from the live product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub sku: String,
    /// Positive decimal; fractional quantities are valid (weight-based
    /// goods).
    pub quantity: Decimal,
    /// Unit price at order time.
    pub price: Decimal,
    /// `price * quantity`, rounded to two decimal places.
    pub total: Decimal,
}

impl OrderItem {
    /// Snapshots a line item, computing its total from the unit price.
    ///
    /// Fails if the quantity is zero or negative.
    pub fn snapshot(
        order_id: OrderId,
        product_id: ProductId,
        sku: impl Into<String>,
        price: Decimal,
        quantity: Decimal,
    ) -> Result<Self, OrderError> {
        if quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        Ok(Self {
            order_id,
            product_id,
            sku: sku.into(),
            quantity,
            price,
            total: round_money(price * quantity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_order_derives_origin_from_number() {
        let order = Order::new("ORD-1", OrderTotals::default(), "a", "b");
        assert_eq!(order.origin, OriginClass::Checkout);
        assert!(order.is_checkout());

        let staff = Order::new("ADMIN-SALE-1", OrderTotals::default(), "a", "b");
        assert_eq!(staff.origin, OriginClass::StaffSale);
    }

    #[test]
    fn new_order_starts_pending_with_clean_flags() {
        let order = Order::new("ORD-1", OrderTotals::default(), "a", "b");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.party_id.is_none());
        assert!(order.shipped_at.is_none());
        assert!(order.delivered_at.is_none());
        assert!(!order.delivery_recorded);
        assert!(!order.stock_committed);
    }

    #[test]
    fn new_order_totals_are_computed() {
        let totals = OrderTotals {
            subtotal: dec!(50.00),
            tax: dec!(7.49),
            shipping: dec!(9.95),
            discount: dec!(2.44),
        };
        let order = Order::new("ORD-2", totals, "a", "b");
        assert_eq!(order.total, dec!(65.00));
    }

    #[test]
    fn item_snapshot_computes_total() {
        let item = OrderItem::snapshot(
            OrderId::new(),
            ProductId::new(),
            "SKU-001",
            dec!(3.333),
            dec!(2.5),
        )
        .unwrap();
        assert_eq!(item.total, dec!(8.33));
    }

    #[test]
    fn item_snapshot_rejects_non_positive_quantity() {
        let result = OrderItem::snapshot(
            OrderId::new(),
            ProductId::new(),
            "SKU-001",
            dec!(1.00),
            dec!(0),
        );
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }
}
