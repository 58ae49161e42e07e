//! Fulfillment error types.

use common::{OrderId, ProductId};
use domain::{OrderError, OrderStatus};
use rust_decimal::Decimal;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during fulfillment operations.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The requested status change is not allowed from the current status.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A stock decrement would go negative.
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock {
        product_id: ProductId,
        available: Decimal,
        requested: Decimal,
    },

    /// Another writer committed the order first; the caller should reload
    /// and retry.
    #[error("Persistence conflict on order {order_id}")]
    PersistenceConflict { order_id: OrderId },

    /// Sentinel resolution kept losing the creation race.
    #[error("Sentinel party resolution failed after {attempts} attempts")]
    SentinelResolutionFailed { attempts: u32 },

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Product exists but cannot be sold.
    #[error("Product {sku} is inactive")]
    ProductInactive { sku: String },

    /// Intake received no lines.
    #[error("Order has no items")]
    EmptyCart,

    /// An item quantity was zero or negative.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: Decimal },

    /// Domain error with no fulfillment-level mapping.
    #[error("Domain error: {0}")]
    Domain(OrderError),

    /// Store error with no fulfillment-level meaning.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for FulfillmentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OrderNotFound(order_id) => Self::OrderNotFound(order_id),
            StoreError::ProductNotFound(product_id) => Self::ProductNotFound(product_id),
            StoreError::VersionConflict { order_id, .. } => Self::PersistenceConflict { order_id },
            StoreError::InsufficientStock {
                product_id,
                available,
                requested,
            } => Self::InsufficientStock {
                product_id,
                available,
                requested,
            },
            other => Self::Store(other),
        }
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            OrderError::InvalidQuantity { quantity } => Self::InvalidQuantity { quantity },
            other => Self::Domain(other),
        }
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
