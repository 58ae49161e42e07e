//! Domain error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised by the pure order rules.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The requested status edge is not permitted.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A status string could not be parsed.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// An item quantity was zero or negative.
    #[error("quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: Decimal },
}
