//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let store = InMemoryStore::new();
    let state = api::create_default_state(store);
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_product(app: &axum::Router, stock: &str) -> String {
    let (status, product) = send(
        app,
        "POST",
        "/products",
        Some(serde_json::json!({
            "sku": "SKU-001",
            "name": "Widget",
            "price": "25.00",
            "stock": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    product["id"].as_str().unwrap().to_string()
}

fn order_body(product_id: &str, quantity: &str) -> serde_json::Value {
    serde_json::json!({
        "items": [{ "product_id": product_id, "quantity": quantity }],
        "shipping_address": "1 Main St",
        "billing_address": "1 Main St",
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_checkout_and_get_order() {
    let app = setup();
    let product_id = create_product(&app, "10").await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "2")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["origin"], "checkout");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let order_id = order["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], order_id);
    assert!(fetched["order_number"].as_str().unwrap().starts_with("ORD-"));
}

#[tokio::test]
async fn test_staff_sale_has_staff_origin() {
    let app = setup();
    let product_id = create_product(&app, "10").await;

    let (status, order) = send(
        &app,
        "POST",
        "/orders/staff-sales",
        Some(order_body(&product_id, "1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["origin"], "staff_sale");
}

#[tokio::test]
async fn test_delivery_decrements_stock_and_assigns_party() {
    let app = setup();
    let product_id = create_product(&app, "10").await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "3")),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, delivered) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["status"], "delivered");
    assert!(delivered["party_id"].as_str().is_some());
    assert!(delivered["delivered_at"].as_str().is_some());

    let (_, product) = send(&app, "GET", &format!("/products/{product_id}"), None).await;
    assert_eq!(product["stock"], "7");
}

#[tokio::test]
async fn test_shipping_stores_tracking_number() {
    let app = setup();
    let product_id = create_product(&app, "5").await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "1")),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, shipped) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "shipped", "tracking_number": "1Z-999" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shipped["tracking_number"], "1Z-999");
    assert!(shipped["shipped_at"].as_str().is_some());
}

#[tokio::test]
async fn test_transition_from_cancelled_conflicts() {
    let app = setup();
    let product_id = create_product(&app, "5").await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "1")),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, error) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error["error"].as_str().is_some());
}

#[tokio::test]
async fn test_insufficient_stock_conflicts() {
    let app = setup();
    let product_id = create_product(&app, "1").await;

    let (status, error) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "5")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(error["error"].as_str().unwrap().contains("Insufficient"));
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let app = setup();
    let product_id = create_product(&app, "5").await;
    let (_, order) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(order_body(&product_id, "1")),
    )
    .await;
    let order_id = order["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/status"),
        Some(serde_json::json!({ "status": "teleported" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let app = setup();
    let fake_id = uuid::Uuid::new_v4();
    let (status, _) = send(&app, "GET", &format!("/orders/{fake_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id_format() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/orders/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_cart_is_bad_request() {
    let app = setup();
    let (status, _) = send(
        &app,
        "POST",
        "/orders/checkout",
        Some(serde_json::json!({
            "items": [],
            "shipping_address": "1 Main St",
            "billing_address": "1 Main St",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
