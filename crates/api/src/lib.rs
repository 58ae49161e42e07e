//! HTTP API server with observability for the order fulfillment system.
//!
//! Provides REST endpoints for placing orders and driving status
//! transitions, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use fulfillment::{
    CombinedTaxRate, FlatRateShipping, OrderIntake, SequentialNumbers, TransitionEngine,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use store::{InventoryLedger, OrderStore, PartyStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Everything a backend must provide to serve the API.
pub trait Backend: OrderStore + InventoryLedger + PartyStore + Clone + 'static {}

impl<T> Backend for T where T: OrderStore + InventoryLedger + PartyStore + Clone + 'static {}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Backend>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders/checkout", post(routes::orders::checkout::<S>))
        .route("/orders/staff-sales", post(routes::orders::staff_sale::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/status", post(routes::orders::change_status::<S>))
        .route("/products", post(routes::products::create::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given backend.
pub fn create_default_state<S: Backend>(store: S) -> Arc<AppState<S>> {
    let intake = OrderIntake::new(
        store.clone(),
        SequentialNumbers::new(),
        CombinedTaxRate {
            federal: env_decimal("TAX_RATE_FEDERAL", Decimal::new(5, 2)),
            provincial: env_decimal("TAX_RATE_PROVINCIAL", Decimal::new(5, 2)),
        },
        FlatRateShipping {
            fee: env_decimal("SHIPPING_FEE", Decimal::new(500, 2)),
            free_over: None,
        },
    );
    let engine = TransitionEngine::new(store.clone());

    Arc::new(AppState {
        intake,
        engine,
        store,
    })
}

fn env_decimal(name: &str, default: Decimal) -> Decimal {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
