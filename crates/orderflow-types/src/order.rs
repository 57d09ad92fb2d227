//! Order domain types for the pipeline.
//!
//! This module defines the durable order record, its line items, and the
//! status lifecycle an order moves through while the pipeline works on it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A durable order record.
///
/// Created by the creation-stage worker once a submission has been accepted.
/// The identifier is assigned exactly once and never reused; `status` is the
/// only field that changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub order_id: String,
	/// Identifier of the user that placed the order.
	pub user_id: String,
	/// Total amount for the order, non-negative.
	pub total_amount: f64,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A line item belonging to an order.
///
/// Items are written alongside their order and removed with it; they are
/// never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
	/// Identifier of the item.
	pub item_id: String,
	/// Identifier of the owning order.
	pub order_id: String,
	/// Monetary amount for this item.
	pub amount: f64,
}

/// Status of an order in the pipeline.
///
/// Transitions are monotonic: Pending -> Processing -> Completed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
	/// Order has been accepted and is awaiting durable persistence.
	Pending,
	/// Order is being fulfilled by a processing worker.
	Processing,
	/// Order fulfillment is finished. Terminal state.
	Completed,
}

impl OrderStatus {
	/// Returns the string representation used in storage and API responses.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending",
			OrderStatus::Processing => "Processing",
			OrderStatus::Completed => "Completed",
		}
	}

	/// Returns an iterator over all status variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Pending, Self::Processing, Self::Completed].into_iter()
	}

	/// Checks whether moving to `next` goes forward in the lifecycle.
	///
	/// The pipeline does not hard-reject other transitions; callers use this
	/// to flag suspicious updates in logs.
	pub fn is_forward_transition(&self, next: &OrderStatus) -> bool {
		let rank = |s: &OrderStatus| match s {
			OrderStatus::Pending => 0,
			OrderStatus::Processing => 1,
			OrderStatus::Completed => 2,
		};
		rank(next) > rank(self)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"Pending" => Ok(Self::Pending),
			"Processing" => Ok(Self::Processing),
			"Completed" => Ok(Self::Completed),
			_ => Err(()),
		}
	}
}

/// Payload carried on the processing queue.
///
/// The creation stage forwards only the order identifier; the processing
/// worker re-reads anything else it needs from durable storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRef {
	/// Identifier of the order to process.
	pub order_id: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_round_trip() {
		for status in OrderStatus::all() {
			let parsed: OrderStatus = status.as_str().parse().unwrap();
			assert_eq!(parsed, status);
		}
		assert!("Cancelled".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn test_forward_transitions() {
		assert!(OrderStatus::Pending.is_forward_transition(&OrderStatus::Processing));
		assert!(OrderStatus::Pending.is_forward_transition(&OrderStatus::Completed));
		assert!(OrderStatus::Processing.is_forward_transition(&OrderStatus::Completed));
		assert!(!OrderStatus::Completed.is_forward_transition(&OrderStatus::Processing));
		assert!(!OrderStatus::Processing.is_forward_transition(&OrderStatus::Processing));
	}
}
