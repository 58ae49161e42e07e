//! Order intake and transition endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::{OrderId, ProductId};
use domain::{OrderItem, OrderStatus, TransitionRequest};
use fulfillment::{
    CartLine, CombinedTaxRate, FlatRateShipping, IntakeRequest, OrderIntake, SequentialNumbers,
    TransitionEngine,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use store::StoredOrder;

use crate::Backend;
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Backend> {
    pub intake: OrderIntake<S, SequentialNumbers, CombinedTaxRate, FlatRateShipping>,
    pub engine: TransitionEngine<S>,
    pub store: S,
}

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub shipping_address: String,
    pub billing_address: String,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Deserialize)]
pub struct OrderLineRequest {
    pub product_id: uuid::Uuid,
    pub quantity: Decimal,
}

#[derive(Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
    pub tracking_number: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub origin: &'static str,
    pub status: &'static str,
    pub party_id: Option<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub tracking_number: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub sku: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
}

impl OrderResponse {
    fn from_order(order: domain::Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number,
            origin: order.origin.as_str(),
            status: order.status.as_str(),
            party_id: order.party_id.map(|p| p.to_string()),
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            discount: order.discount,
            total: order.total,
            tracking_number: order.tracking_number,
            shipped_at: order.shipped_at,
            delivered_at: order.delivered_at,
            items: items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    sku: item.sku,
                    quantity: item.quantity,
                    price: item.price,
                    total: item.total,
                })
                .collect(),
        }
    }

    fn from_stored(stored: StoredOrder) -> Self {
        Self::from_order(stored.order, stored.items)
    }
}

fn to_intake_request(req: PlaceOrderRequest) -> IntakeRequest {
    IntakeRequest {
        lines: req
            .items
            .into_iter()
            .map(|line| CartLine {
                product_id: ProductId::from_uuid(line.product_id),
                quantity: line.quantity,
            })
            .collect(),
        shipping_address: req.shipping_address,
        billing_address: req.billing_address,
        discount: req.discount,
    }
}

// -- Handlers --

/// POST /orders/checkout — place a customer checkout order.
#[tracing::instrument(skip(state, req))]
pub async fn checkout<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.intake.checkout(to_intake_request(req)).await?;
    let stored = state.engine.get_order(order.id).await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from_stored(stored)),
    ))
}

/// POST /orders/staff-sales — place a staff sale.
#[tracing::instrument(skip(state, req))]
pub async fn staff_sale<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.intake.staff_sale(to_intake_request(req)).await?;
    let stored = state.engine.get_order(order.id).await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from_stored(stored)),
    ))
}

/// GET /orders/:id — load an order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let stored = state.engine.get_order(order_id).await?;
    Ok(Json(OrderResponse::from_stored(stored)))
}

/// POST /orders/:id/status — apply a status transition.
#[tracing::instrument(skip(state, req))]
pub async fn change_status<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let target: OrderStatus = req
        .status
        .parse()
        .map_err(|e: domain::OrderError| ApiError::BadRequest(e.to_string()))?;
    let request = match req.tracking_number {
        Some(tracking) => TransitionRequest::with_tracking(tracking),
        None => TransitionRequest::none(),
    };

    let order = state
        .engine
        .apply_transition(order_id, target, request)
        .await?;
    let stored = state.engine.get_order(order.id).await?;
    Ok(Json(OrderResponse::from_stored(stored)))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
