//! Transition engine.
//!
//! The engine drives one order transition end to end: load the order, plan
//! the edge, resolve the sentinel party when the plan calls for it, then
//! commit the order patch and stock movement as a single store operation.
//! Notification events go out only after the commit succeeds.

use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderStatus, StockAction, TransitionRequest, plan_transition};
use store::{
    InventoryLedger, OrderPatch, OrderStore, PartyStore, StockBatch, StockLine, StoredOrder,
    TransitionCommit,
};

use crate::error::{FulfillmentError, Result};
use crate::events::{FulfillmentEvent, NotificationSink, TracingSink};
use crate::sentinel::SentinelResolver;

/// Applies status transitions to orders.
pub struct TransitionEngine<S, N = TracingSink>
where
    S: OrderStore + InventoryLedger + PartyStore,
    N: NotificationSink,
{
    store: S,
    sink: N,
}

impl<S> TransitionEngine<S>
where
    S: OrderStore + InventoryLedger + PartyStore,
{
    /// Creates an engine that logs events through `tracing`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            sink: TracingSink,
        }
    }
}

impl<S, N> TransitionEngine<S, N>
where
    S: OrderStore + InventoryLedger + PartyStore,
    N: NotificationSink,
{
    /// Creates an engine with an explicit notification sink.
    pub fn with_sink(store: S, sink: N) -> Self {
        Self { store, sink }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an order with its items.
    pub async fn get_order(&self, order_id: OrderId) -> Result<StoredOrder> {
        self.store
            .load(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))
    }

    /// Moves an order to `target`, applying every side effect the edge
    /// requires.
    ///
    /// The order patch and the stock movement commit atomically against the
    /// version the order was loaded at; a concurrent writer surfaces as
    /// [`FulfillmentError::PersistenceConflict`] and nothing is written.
    #[tracing::instrument(skip(self, request), fields(%order_id, %target))]
    pub async fn apply_transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        request: TransitionRequest,
    ) -> Result<Order> {
        metrics::counter!("order_transitions_total", "target" => target.as_str()).increment(1);
        let started = std::time::Instant::now();

        let stored = self.get_order(order_id).await?;
        let plan = plan_transition(&stored.order, target, &request)?;

        let now = Utc::now();
        let mut patch = OrderPatch {
            status: Some(plan.status),
            ..Default::default()
        };
        if plan.set_shipped_at {
            patch.shipped_at = Some(now);
        }
        if let Some(tracking) = plan.tracking_number {
            patch.tracking_number = Some(tracking);
        }
        if plan.record_delivery {
            patch.delivered_at = Some(now);
            patch.delivery_recorded = Some(true);
        }
        patch.stock_committed = plan.stock_committed;

        let mut sentinel_assigned = None;
        if plan.assign_sentinel {
            let sentinel = SentinelResolver::resolve(&self.store).await?;
            if stored.order.party_id != Some(sentinel.id) {
                patch.party_id = Some(sentinel.id);
                sentinel_assigned = Some(sentinel.id);
            }
        }

        let stock = plan.stock.and_then(|action| {
            let lines: Vec<StockLine> = stored
                .items
                .iter()
                .map(|item| StockLine::new(item.product_id, item.quantity))
                .collect();
            if lines.is_empty() {
                return None;
            }
            Some(match action {
                StockAction::Commit => StockBatch::decrement(lines),
                StockAction::Restore => StockBatch::increment(lines),
            })
        });

        let updated = self
            .store
            .commit_transition(TransitionCommit {
                order_id,
                expected_version: stored.version,
                patch,
                stock: stock.clone(),
            })
            .await?;

        if stored.order.status != updated.status {
            self.sink.publish(FulfillmentEvent::StatusChanged {
                order_id,
                order_number: updated.order_number.clone(),
                from: stored.order.status,
                to: updated.status,
            });
        }
        if let (Some(action), Some(batch)) = (plan.stock, stock) {
            metrics::counter!("stock_adjustments_total", "action" => match action {
                StockAction::Commit => "commit",
                StockAction::Restore => "restore",
            })
            .increment(1);
            self.sink.publish(FulfillmentEvent::StockAdjusted {
                order_id,
                action,
                lines: batch.lines,
            });
        }
        if let Some(party_id) = sentinel_assigned {
            self.sink
                .publish(FulfillmentEvent::SentinelAssigned { order_id, party_id });
        }

        metrics::counter!("order_transitions_committed", "target" => target.as_str()).increment(1);
        metrics::histogram!("transition_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            order_number = %updated.order_number,
            from = %stored.order.status,
            to = %updated.status,
            "transition committed"
        );

        Ok(updated)
    }
}
