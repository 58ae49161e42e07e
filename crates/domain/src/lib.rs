//! Domain layer for the storefront fulfillment core.
//!
//! This crate provides the pure order model and business rules:
//! - Order, OrderItem, Product and Party records
//! - OrderStatus state machine and OriginClass dispatch
//! - the transition planner that decides stock side effects
//!
//! Nothing here touches persistence; the planner returns a description of
//! the side effects a transition requires, and the engine applies it.

pub mod error;
pub mod money;
pub mod order;
pub mod party;
pub mod product;

pub use error::OrderError;
pub use money::{OrderTotals, round_money};
pub use order::{
    Order, OrderItem, OrderStatus, OriginClass, StockAction, TransitionPlan, TransitionRequest,
    plan_transition,
};
pub use party::Party;
pub use product::Product;
