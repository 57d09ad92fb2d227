//! Metric types for per-stage timing records.
//!
//! Each queue invocation produces one append-only metric row tagged with the
//! stage it was recorded for, so creation and processing timings stay
//! distinguishable in aggregates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Append-only timing record for one queue invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
	/// Identifier of the order the invocation worked on.
	pub order_id: String,
	/// Which pipeline stage this metric was recorded for.
	pub name: MetricKind,
	/// Elapsed wall-clock duration of the processing function, in seconds.
	pub duration_seconds: f64,
	/// Timestamp when this metric was recorded.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Metric kinds, fixed per queue instance at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
	/// Time spent persisting a new order (creation queue).
	CreationTime,
	/// Time spent fulfilling an order (processing queue).
	ProcessingTime,
}

impl MetricKind {
	/// Returns the string representation used in storage.
	pub fn as_str(&self) -> &'static str {
		match self {
			MetricKind::CreationTime => "creation_time",
			MetricKind::ProcessingTime => "processing_time",
		}
	}
}

impl fmt::Display for MetricKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Aggregate view over metrics and order statuses, served by GET /metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
	/// Total metric rows recorded across both stages.
	pub total_orders_received: u64,
	/// Average duration of processing-stage invocations, in seconds.
	pub average_processing_time: f64,
	/// Number of orders currently Pending.
	pub orders_pending: u64,
	/// Number of orders currently Processing.
	pub orders_processing: u64,
	/// Number of orders Completed.
	pub orders_completed: u64,
}
