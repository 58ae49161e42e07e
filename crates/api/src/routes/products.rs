//! Product catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use domain::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Backend;
use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: Decimal,
    #[serde(default = "default_true")]
    pub track_stock: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub price: Decimal,
    pub stock: Decimal,
    pub track_stock: bool,
    pub is_active: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            sku: product.sku,
            name: product.name,
            price: product.price,
            stock: product.stock,
            track_stock: product.track_stock,
            is_active: product.is_active,
        }
    }
}

/// POST /products — register a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(axum::http::StatusCode, Json<ProductResponse>), ApiError> {
    if req.price < Decimal::ZERO || req.stock < Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "price and stock must be non-negative".to_string(),
        ));
    }

    let product = Product {
        id: ProductId::new(),
        sku: req.sku,
        name: req.name,
        price: req.price,
        stock: req.stock,
        track_stock: req.track_stock,
        is_active: req.is_active,
    };
    state
        .store
        .insert_product(product.clone())
        .await
        .map_err(fulfillment::FulfillmentError::from)?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(ProductResponse::from(product)),
    ))
}

/// GET /products/:id — load a product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Backend>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    let product = state
        .store
        .get_product(ProductId::from_uuid(uuid))
        .await
        .map_err(fulfillment::FulfillmentError::from)?
        .ok_or_else(|| ApiError::NotFound(format!("Product {id} not found")))?;

    Ok(Json(ProductResponse::from(product)))
}
