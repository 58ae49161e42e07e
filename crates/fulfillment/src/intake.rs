//! Order intake.
//!
//! Both entry points end in the same persistence call: an order plus its
//! item snapshots written as one unit, always starting at `pending`. The
//! difference between a customer checkout and a staff sale is the order
//! number prefix, which fixes the origin class and with it the inventory
//! timing for the rest of the order's life.

use std::sync::atomic::{AtomicU64, Ordering};

use common::ProductId;
use domain::{Order, OrderItem, OrderTotals, round_money};
use rust_decimal::Decimal;
use store::{InventoryLedger, OrderStore};

use crate::error::{FulfillmentError, Result};

/// Allocates order numbers.
///
/// Checkout numbers carry the `ORD-` prefix that marks an order as a
/// customer checkout; staff numbers must not.
pub trait OrderNumberGenerator: Send + Sync {
    fn next_checkout(&self) -> String;
    fn next_staff_sale(&self) -> String;
}

/// Process-local sequential numbers, for development and tests.
#[derive(Debug, Default)]
pub struct SequentialNumbers {
    counter: AtomicU64,
}

impl SequentialNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl OrderNumberGenerator for SequentialNumbers {
    fn next_checkout(&self) -> String {
        format!("ORD-{:06}", self.next())
    }

    fn next_staff_sale(&self) -> String {
        format!("POS-{:06}", self.next())
    }
}

/// Supplies the tax rate applied to the subtotal.
pub trait TaxRateProvider: Send + Sync {
    fn tax_rate(&self) -> Decimal;
}

/// Federal and provincial percentages summed into one rate.
#[derive(Debug, Clone, Copy)]
pub struct CombinedTaxRate {
    pub federal: Decimal,
    pub provincial: Decimal,
}

impl TaxRateProvider for CombinedTaxRate {
    fn tax_rate(&self) -> Decimal {
        self.federal + self.provincial
    }
}

/// Computes the shipping fee for an order.
pub trait ShippingPolicy: Send + Sync {
    fn shipping_fee(&self, subtotal: Decimal) -> Decimal;
}

/// Flat fee, waived above an optional free-shipping threshold.
#[derive(Debug, Clone, Copy)]
pub struct FlatRateShipping {
    pub fee: Decimal,
    pub free_over: Option<Decimal>,
}

impl ShippingPolicy for FlatRateShipping {
    fn shipping_fee(&self, subtotal: Decimal) -> Decimal {
        match self.free_over {
            Some(threshold) if subtotal >= threshold => Decimal::ZERO,
            _ => self.fee,
        }
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
}

/// Everything needed to place an order, minus the order number.
#[derive(Debug, Clone)]
pub struct IntakeRequest {
    pub lines: Vec<CartLine>,
    pub shipping_address: String,
    pub billing_address: String,
    pub discount: Decimal,
}

/// Creates orders from cart contents.
pub struct OrderIntake<S, G, T, P>
where
    S: OrderStore + InventoryLedger,
    G: OrderNumberGenerator,
    T: TaxRateProvider,
    P: ShippingPolicy,
{
    store: S,
    numbers: G,
    tax: T,
    shipping: P,
}

impl<S, G, T, P> OrderIntake<S, G, T, P>
where
    S: OrderStore + InventoryLedger,
    G: OrderNumberGenerator,
    T: TaxRateProvider,
    P: ShippingPolicy,
{
    /// Creates a new intake service.
    pub fn new(store: S, numbers: G, tax: T, shipping: P) -> Self {
        Self {
            store,
            numbers,
            tax,
            shipping,
        }
    }

    /// Places a customer checkout order.
    ///
    /// Availability is checked for every line but no stock moves; checkout
    /// orders commit stock on first delivery.
    #[tracing::instrument(skip(self, request))]
    pub async fn checkout(&self, request: IntakeRequest) -> Result<Order> {
        self.place(self.numbers.next_checkout(), request).await
    }

    /// Places a staff sale.
    ///
    /// The order starts at `pending` like a checkout; confirming it is what
    /// commits stock.
    #[tracing::instrument(skip(self, request))]
    pub async fn staff_sale(&self, request: IntakeRequest) -> Result<Order> {
        self.place(self.numbers.next_staff_sale(), request).await
    }

    async fn place(&self, order_number: String, request: IntakeRequest) -> Result<Order> {
        if request.lines.is_empty() {
            return Err(FulfillmentError::EmptyCart);
        }

        // Snapshot price and sku per line; the order keeps these values even
        // if the product changes later.
        let mut snapshots = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            let product = self
                .store
                .get_product(line.product_id)
                .await?
                .ok_or(FulfillmentError::ProductNotFound(line.product_id))?;
            if !product.is_active {
                return Err(FulfillmentError::ProductInactive { sku: product.sku });
            }
            if !product.has_available(line.quantity) {
                return Err(FulfillmentError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                    requested: line.quantity,
                });
            }
            snapshots.push((product, line.quantity));
        }

        let subtotal: Decimal = snapshots
            .iter()
            .map(|(product, quantity)| round_money(product.price * quantity))
            .sum();
        let totals = OrderTotals {
            subtotal,
            tax: round_money(subtotal * self.tax.tax_rate()),
            shipping: self.shipping.shipping_fee(subtotal),
            discount: request.discount,
        };

        let order = Order::new(
            order_number,
            totals,
            request.shipping_address,
            request.billing_address,
        );

        let mut items = Vec::with_capacity(snapshots.len());
        for (product, quantity) in snapshots {
            items.push(OrderItem::snapshot(
                order.id,
                product.id,
                product.sku,
                product.price,
                quantity,
            )?);
        }

        self.store.create_with_items(order.clone(), items).await?;
        metrics::counter!("orders_placed_total", "origin" => order.origin.as_str()).increment(1);
        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            origin = order.origin.as_str(),
            total = %order.total,
            "order placed"
        );

        Ok(order)
    }
}
