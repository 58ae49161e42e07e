//! Order fulfillment services.
//!
//! This crate ties the pure transition rules from `domain` to the
//! persistence contracts in `store`:
//!
//! - [`OrderIntake`] turns cart contents into pending orders;
//! - [`TransitionEngine`] applies status transitions with their inventory
//!   and party side effects;
//! - [`SentinelResolver`] provides the shared "Order" party that delivered
//!   checkout orders are assigned to;
//! - [`NotificationSink`] receives events after each committed transition.

pub mod engine;
pub mod error;
pub mod events;
pub mod intake;
pub mod sentinel;

pub use engine::TransitionEngine;
pub use error::{FulfillmentError, Result};
pub use events::{FulfillmentEvent, NotificationSink, RecordingSink, TracingSink};
pub use intake::{
    CartLine, CombinedTaxRate, FlatRateShipping, IntakeRequest, OrderIntake, OrderNumberGenerator,
    SequentialNumbers, ShippingPolicy, TaxRateProvider,
};
pub use sentinel::{SENTINEL_EMAIL, SENTINEL_NAME, SentinelResolver};
