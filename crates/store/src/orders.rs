//! Order store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, PartyId};
use domain::{Order, OrderItem, OrderStatus};

use crate::Result;
use crate::inventory::StockLine;

/// An order loaded with its items and current version.
///
/// The version implements optimistic concurrency: a transition commit
/// carries the version it was planned against, and the store rejects the
/// commit if another writer got there first.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub version: i64,
}

/// Field updates a transition applies to an order row.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub party_id: Option<PartyId>,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_recorded: Option<bool>,
    pub stock_committed: Option<bool>,
}

impl OrderPatch {
    /// Applies the patch to an order value.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(party_id) = self.party_id {
            order.party_id = Some(party_id);
        }
        if let Some(ref tracking) = self.tracking_number {
            order.tracking_number = Some(tracking.clone());
        }
        if let Some(shipped_at) = self.shipped_at {
            order.shipped_at = Some(shipped_at);
        }
        if let Some(delivered_at) = self.delivered_at {
            order.delivered_at = Some(delivered_at);
        }
        if let Some(delivery_recorded) = self.delivery_recorded {
            order.delivery_recorded = delivery_recorded;
        }
        if let Some(stock_committed) = self.stock_committed {
            order.stock_committed = stock_committed;
        }
    }
}

/// Direction of a stock movement inside a transition commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    Decrement,
    Increment,
}

/// A stock movement applied atomically with an order patch.
#[derive(Debug, Clone)]
pub struct StockBatch {
    pub direction: StockDirection,
    pub lines: Vec<StockLine>,
}

impl StockBatch {
    pub fn decrement(lines: Vec<StockLine>) -> Self {
        Self {
            direction: StockDirection::Decrement,
            lines,
        }
    }

    pub fn increment(lines: Vec<StockLine>) -> Self {
        Self {
            direction: StockDirection::Increment,
            lines,
        }
    }
}

/// One atomic transition: order patch plus optional stock movement.
#[derive(Debug, Clone)]
pub struct TransitionCommit {
    pub order_id: OrderId,
    /// Version the transition was planned against.
    pub expected_version: i64,
    pub patch: OrderPatch,
    pub stock: Option<StockBatch>,
}

/// Persistence for orders and their line items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order with its items as one unit.
    ///
    /// This is the single creation contract for both checkout orders and
    /// staff sales.
    async fn create_with_items(&self, order: Order, items: Vec<OrderItem>) -> Result<()>;

    /// Loads an order with its items, or `None` if it does not exist.
    async fn load(&self, order_id: OrderId) -> Result<Option<StoredOrder>>;

    /// Commits a transition atomically.
    ///
    /// The order patch and the stock batch either both apply or neither
    /// does. Fails with `VersionConflict` when the stored version no
    /// longer matches, and with `InsufficientStock` when a decrement would
    /// go negative; in both cases nothing is written.
    async fn commit_transition(&self, commit: TransitionCommit) -> Result<Order>;
}
