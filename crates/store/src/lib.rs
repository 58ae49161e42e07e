//! Persistence layer for the storefront fulfillment core.
//!
//! Three narrow contracts cover the subsystem's state:
//! - [`OrderStore`] — orders with their line items, plus the atomic
//!   transition commit
//! - [`InventoryLedger`] — per-product stock with the all-or-nothing
//!   conditional decrement
//! - [`PartyStore`] — parties and their backing accounts, with the unique
//!   name constraint the sentinel resolver relies on
//!
//! Two backends implement all three: [`InMemoryStore`] for tests and
//! development, [`PostgresStore`] for production. A backend implements the
//! traits together so a transition commit can mutate the order row and the
//! affected stock rows in one atomic unit.

pub mod error;
pub mod inventory;
pub mod memory;
pub mod orders;
pub mod parties;
pub mod postgres;

pub use error::{Result, StoreError};
pub use inventory::{InventoryLedger, StockLine};
pub use memory::InMemoryStore;
pub use orders::{OrderPatch, OrderStore, StockBatch, StockDirection, StoredOrder, TransitionCommit};
pub use parties::PartyStore;
pub use postgres::PostgresStore;
