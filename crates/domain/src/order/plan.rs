//! Transition planning.
//!
//! `plan_transition` is the whole fulfillment rule book in one pure
//! function: given the current order and a requested target status it
//! either rejects the edge or returns a [`TransitionPlan`] describing every
//! side effect the engine must apply. Keeping it pure means the timing
//! rules are testable without a store.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

use super::{Order, OrderStatus, OriginClass};

/// Caller-supplied metadata for a transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionRequest {
    /// Only meaningful when the target status is `shipped`.
    pub tracking_number: Option<String>,
}

impl TransitionRequest {
    /// A request with no metadata.
    pub fn none() -> Self {
        Self::default()
    }

    /// A request carrying a tracking number.
    pub fn with_tracking(tracking_number: impl Into<String>) -> Self {
        Self {
            tracking_number: Some(tracking_number.into()),
        }
    }
}

/// The inventory side effect a transition requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    /// Decrement stock for every tracked item; all-or-nothing.
    Commit,
    /// Increment stock back by the original item quantities.
    Restore,
}

/// The effects of one validated transition.
///
/// Timestamps are represented as flags so the plan stays clock-free; the
/// engine stamps `now` when it builds the persistence patch.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    /// Status the order moves to.
    pub status: OrderStatus,
    /// Overwrite `shipped_at` with the current time.
    pub set_shipped_at: bool,
    /// Tracking number to store, if any.
    pub tracking_number: Option<String>,
    /// Set `delivered_at` and latch `delivery_recorded`. Only ever true on
    /// the first delivery.
    pub record_delivery: bool,
    /// Resolve the sentinel party and assign the order to it (checkout
    /// deliveries only; the engine skips the write when already assigned).
    pub assign_sentinel: bool,
    /// Stock movement required by this transition, if any.
    pub stock: Option<StockAction>,
    /// New value for `stock_committed` when the transition changes it.
    pub stock_committed: Option<bool>,
}

impl TransitionPlan {
    /// A plan that only overwrites the status.
    fn status_only(status: OrderStatus) -> Self {
        Self {
            status,
            set_shipped_at: false,
            tracking_number: None,
            record_delivery: false,
            assign_sentinel: false,
            stock: None,
            stock_committed: None,
        }
    }
}

/// Validates a requested transition and computes its side effects.
///
/// The rules, by target status:
///
/// - any target while the order is `cancelled` is rejected — cancellation
///   is terminal;
/// - `confirmed` / `processing`: staff sales leaving `pending` commit
///   stock; checkout orders defer stock to delivery;
/// - `shipped`: stamps `shipped_at` and stores the tracking number, no
///   stock effect;
/// - `delivered`: stamps `delivered_at` once; checkout orders are assigned
///   to the sentinel party and commit stock on the first delivery only —
///   repeated calls are no-ops on stock and party;
/// - `cancelled`: restores stock when (and only when) a previous transition
///   committed it;
/// - every other edge overwrites the status with no side effect.
pub fn plan_transition(
    order: &Order,
    target: OrderStatus,
    request: &TransitionRequest,
) -> Result<TransitionPlan, OrderError> {
    if order.status.is_terminal() {
        return Err(OrderError::InvalidTransition {
            from: order.status,
            to: target,
        });
    }

    let mut plan = TransitionPlan::status_only(target);

    match target {
        OrderStatus::Confirmed | OrderStatus::Processing => {
            // Staff sales commit stock when leaving pending; checkout
            // orders wait for delivery.
            if order.origin == OriginClass::StaffSale && order.status == OrderStatus::Pending {
                plan.stock = Some(StockAction::Commit);
                plan.stock_committed = Some(true);
            }
        }
        OrderStatus::Shipped => {
            plan.set_shipped_at = true;
            plan.tracking_number = request.tracking_number.clone();
        }
        OrderStatus::Delivered => {
            let first_delivery = !order.delivery_recorded;
            plan.record_delivery = first_delivery;
            if order.origin == OriginClass::Checkout {
                plan.assign_sentinel = true;
                if first_delivery {
                    plan.stock = Some(StockAction::Commit);
                    plan.stock_committed = Some(true);
                }
            }
        }
        OrderStatus::Cancelled => {
            if order.stock_committed {
                plan.stock = Some(StockAction::Restore);
                plan.stock_committed = Some(false);
            }
        }
        OrderStatus::Pending => {
            // Plain overwrite; no inventory consequence.
        }
    }

    Ok(plan)
}
