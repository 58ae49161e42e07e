//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fulfillment::FulfillmentError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Fulfillment error.
    Fulfillment(FulfillmentError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Fulfillment(err) => fulfillment_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn fulfillment_error_to_response(err: FulfillmentError) -> (StatusCode, String) {
    match &err {
        FulfillmentError::OrderNotFound(_) | FulfillmentError::ProductNotFound(_) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        FulfillmentError::InvalidTransition { .. }
        | FulfillmentError::InsufficientStock { .. }
        | FulfillmentError::PersistenceConflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        FulfillmentError::EmptyCart
        | FulfillmentError::InvalidQuantity { .. }
        | FulfillmentError::ProductInactive { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        FulfillmentError::SentinelResolutionFailed { .. }
        | FulfillmentError::Domain(_)
        | FulfillmentError::Store(_) => {
            tracing::error!(error = %err, "fulfillment failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        ApiError::Fulfillment(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;
    use domain::OrderStatus;

    #[test]
    fn statuses_map_to_error_classes() {
        let cases = [
            (
                FulfillmentError::OrderNotFound(OrderId::new()),
                StatusCode::NOT_FOUND,
            ),
            (
                FulfillmentError::InvalidTransition {
                    from: OrderStatus::Cancelled,
                    to: OrderStatus::Delivered,
                },
                StatusCode::CONFLICT,
            ),
            (
                FulfillmentError::PersistenceConflict {
                    order_id: OrderId::new(),
                },
                StatusCode::CONFLICT,
            ),
            (FulfillmentError::EmptyCart, StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            let (status, _) = fulfillment_error_to_response(err);
            assert_eq!(status, expected);
        }
    }
}
