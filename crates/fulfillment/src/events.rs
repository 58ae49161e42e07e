//! Notification events emitted after committed transitions.
//!
//! Events are best-effort signals for downstream consumers (mail, webhooks,
//! dashboards). They are published after the commit succeeds and are never
//! allowed to fail a transition.

use std::sync::Mutex;

use common::{OrderId, PartyId};
use domain::{OrderStatus, StockAction};
use store::StockLine;

/// A fulfillment notification.
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentEvent {
    /// An order moved to a new status.
    StatusChanged {
        order_id: OrderId,
        order_number: String,
        from: OrderStatus,
        to: OrderStatus,
    },
    /// Stock was committed or restored as part of a transition.
    StockAdjusted {
        order_id: OrderId,
        action: StockAction,
        lines: Vec<StockLine>,
    },
    /// A delivered checkout order was assigned to the sentinel party.
    SentinelAssigned { order_id: OrderId, party_id: PartyId },
}

/// Consumer of fulfillment events.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: FulfillmentEvent);
}

impl<N: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<N> {
    fn publish(&self, event: FulfillmentEvent) {
        (**self).publish(event);
    }
}

/// Sink that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, event: FulfillmentEvent) {
        match event {
            FulfillmentEvent::StatusChanged {
                order_id,
                ref order_number,
                from,
                to,
            } => {
                tracing::info!(%order_id, order_number, %from, %to, "order status changed");
            }
            FulfillmentEvent::StockAdjusted {
                order_id,
                action,
                ref lines,
            } => {
                tracing::info!(%order_id, ?action, lines = lines.len(), "stock adjusted");
            }
            FulfillmentEvent::SentinelAssigned { order_id, party_id } => {
                tracing::info!(%order_id, %party_id, "order assigned to sentinel party");
            }
        }
    }
}

/// Sink that records events in memory, for tests and local inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FulfillmentEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything published so far.
    pub fn events(&self) -> Vec<FulfillmentEvent> {
        self.events.lock().expect("sink lock poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: FulfillmentEvent) {
        self.events.lock().expect("sink lock poisoned").push(event);
    }
}
