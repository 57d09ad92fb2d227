//! API types for the orderflow HTTP API.
//!
//! This module defines the request and response types for the order
//! endpoints, plus the structured error type the handlers map failures onto.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::OrderStatus;

/// Request body for POST /orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	/// Identifier of the user placing the order.
	pub user_id: String,
	/// Identifiers of the ordered items.
	pub item_ids: Vec<String>,
	/// Total amount for the order.
	pub total_amount: f64,
}

/// Response body for POST /orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
	/// Human-readable confirmation message.
	pub message: String,
	/// Identifier assigned to the accepted order.
	pub order_id: String,
}

/// Full order view returned by GET /orders/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOrderResponse {
	/// Identifier of the order.
	pub order_id: String,
	/// Identifier of the user that placed the order.
	pub user_id: String,
	/// Identifiers of the ordered items.
	pub item_ids: Vec<String>,
	/// Total amount for the order.
	pub total_amount: f64,
	/// Current order status.
	pub status: OrderStatus,
}

/// Response body for GET /orders/status/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResponse {
	/// Identifier of the order.
	pub order_id: String,
	/// Current order status.
	pub status: OrderStatus,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Bad request with validation errors (400).
	BadRequest { error_type: String, message: String },
	/// Requested resource does not exist (404).
	NotFound { error_type: String, message: String },
	/// Internal server error (500).
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	/// Creates a not-found error for an order identifier.
	pub fn order_not_found(order_id: &str) -> Self {
		ApiError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: format!("Order not found: {}", order_id),
		}
	}

	/// Creates an internal error from any displayable failure.
	pub fn internal(message: impl fmt::Display) -> Self {
		ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message: message.to_string(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type,
				message,
			}
			| ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			404 => StatusCode::NOT_FOUND,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
