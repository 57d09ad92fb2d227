//! HTTP server for the orderflow API.
//!
//! This module provides a minimal HTTP server exposing the order pipeline:
//! submission, full-order reads, cache-first status reads, and aggregate
//! metrics.

use axum::{
	extract::{Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use orderflow_config::ServerConfig;
use orderflow_core::{MetricsService, OrderService, OrderServiceError};
use orderflow_types::{
	ApiError, CreateOrderRequest, CreateOrderResponse, GetOrderResponse, MetricsSummary,
	OrderStatusResponse,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Order pipeline orchestrator.
	pub orders: Arc<OrderService>,
	/// Aggregate metrics reader.
	pub metrics: Arc<MetricsService>,
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(handle_health))
		.route("/orders", post(handle_create_order))
		.route("/orders/{id}", get(handle_get_order))
		.route("/orders/status/{id}", get(handle_get_order_status))
		.route("/metrics", get(handle_metrics))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the order endpoints.
pub async fn start_server(
	server_config: ServerConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(state);

	let bind_address = format!("{}:{}", server_config.host, server_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Orderflow API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Maps pipeline errors onto HTTP error responses.
fn map_error(err: OrderServiceError) -> ApiError {
	match err {
		OrderServiceError::NotFound(id) => ApiError::order_not_found(&id),
		other => {
			tracing::warn!("Request failed: {}", other);
			ApiError::internal(other)
		}
	}
}

/// Handles GET /health requests.
async fn handle_health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

/// Handles POST /orders requests.
///
/// Accepts the submission, hands it to the write-behind pipeline, and
/// returns the assigned identifier without waiting for persistence.
async fn handle_create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
	if !request.total_amount.is_finite() || request.total_amount < 0.0 {
		return Err(ApiError::BadRequest {
			error_type: "INVALID_AMOUNT".to_string(),
			message: "total_amount must be a non-negative number".to_string(),
		});
	}

	let order_id = state
		.orders
		.create_order(request)
		.await
		.map_err(map_error)?;

	Ok(Json(CreateOrderResponse {
		message: "Order created".to_string(),
		order_id,
	}))
}

/// Handles GET /orders/{id} requests.
///
/// Always reads durable storage; full records are not cached.
async fn handle_get_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<GetOrderResponse>, ApiError> {
	let order = state.orders.get_order(&id).await.map_err(map_error)?;
	Ok(Json(order))
}

/// Handles GET /orders/status/{id} requests.
///
/// Cache-first; falls back to durable storage on a miss.
async fn handle_get_order_status(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<OrderStatusResponse>, ApiError> {
	let status = state
		.orders
		.get_order_status(&id)
		.await
		.map_err(map_error)?;
	Ok(Json(OrderStatusResponse {
		order_id: id,
		status,
	}))
}

/// Handles GET /metrics requests.
async fn handle_metrics(State(state): State<AppState>) -> Json<MetricsSummary> {
	Json(state.metrics.get_metrics().await)
}
