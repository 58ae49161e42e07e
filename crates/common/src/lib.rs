//! Shared types for the storefront fulfillment core.

mod types;

pub use types::{OrderId, PartyId, ProductId};
