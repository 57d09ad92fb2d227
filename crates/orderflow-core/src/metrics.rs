//! Aggregate metrics service backing GET /metrics.

use orderflow_storage::{MetricRepository, OrderRepository};
use orderflow_types::{MetricKind, MetricsSummary, OrderStatus};
use std::sync::Arc;

/// Read-side service composing metric rows and order status counts into one
/// summary.
///
/// Individual read failures are logged and reported as zero; an aggregate
/// view is never worth failing a request over.
pub struct MetricsService {
	metrics: Arc<dyn MetricRepository>,
	orders: Arc<dyn OrderRepository>,
}

impl MetricsService {
	pub fn new(metrics: Arc<dyn MetricRepository>, orders: Arc<dyn OrderRepository>) -> Self {
		Self { metrics, orders }
	}

	/// Builds the aggregate summary.
	pub async fn get_metrics(&self) -> MetricsSummary {
		let total_orders_received = self.metrics.metric_count().await.unwrap_or_else(|e| {
			tracing::warn!("Failed to count metrics: {}", e);
			0
		});
		let average_processing_time = self
			.metrics
			.average_duration(MetricKind::ProcessingTime)
			.await
			.unwrap_or_else(|e| {
				tracing::warn!("Failed to average processing time: {}", e);
				0.0
			});

		let mut counts = [0u64; 3];
		for (slot, status) in counts.iter_mut().zip(OrderStatus::all()) {
			*slot = self.orders.count_by_status(status).await.unwrap_or_else(|e| {
				tracing::warn!(status = %status, "Failed to count orders: {}", e);
				0
			});
		}
		let [orders_pending, orders_processing, orders_completed] = counts;

		MetricsSummary {
			total_orders_received,
			average_processing_time,
			orders_pending,
			orders_processing,
			orders_completed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_storage::implementations::memory::MemoryStorage;
	use orderflow_storage::{KvMetricRepository, KvOrderRepository, StorageService};
	use orderflow_types::{Metric, Order};

	fn sample_order(id: &str, status: OrderStatus) -> Order {
		let now = chrono::Utc::now();
		Order {
			order_id: id.to_string(),
			user_id: "u1".to_string(),
			total_amount: 1.0,
			status,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn test_summary_aggregates_rows_and_statuses() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let metrics = Arc::new(KvMetricRepository::new(storage.clone()));
		let orders = Arc::new(KvOrderRepository::new(storage));

		orders
			.create_order(&sample_order("a", OrderStatus::Pending))
			.await
			.unwrap();
		orders
			.create_order(&sample_order("b", OrderStatus::Completed))
			.await
			.unwrap();
		orders
			.create_order(&sample_order("c", OrderStatus::Completed))
			.await
			.unwrap();

		let now = chrono::Utc::now();
		for duration in [1.0, 2.0] {
			metrics
				.record_metric(&Metric {
					order_id: "b".to_string(),
					name: MetricKind::ProcessingTime,
					duration_seconds: duration,
					created_at: now,
				})
				.await
				.unwrap();
		}
		metrics
			.record_metric(&Metric {
				order_id: "b".to_string(),
				name: MetricKind::CreationTime,
				duration_seconds: 0.5,
				created_at: now,
			})
			.await
			.unwrap();

		let service = MetricsService::new(metrics, orders);
		let summary = service.get_metrics().await;

		assert_eq!(summary.total_orders_received, 3);
		assert!((summary.average_processing_time - 1.5).abs() < f64::EPSILON);
		assert_eq!(summary.orders_pending, 1);
		assert_eq!(summary.orders_processing, 0);
		assert_eq!(summary.orders_completed, 2);
	}

	#[tokio::test]
	async fn test_empty_summary_is_all_zero() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let service = MetricsService::new(
			Arc::new(KvMetricRepository::new(storage.clone())),
			Arc::new(KvOrderRepository::new(storage)),
		);

		let summary = service.get_metrics().await;
		assert_eq!(summary.total_orders_received, 0);
		assert_eq!(summary.average_processing_time, 0.0);
		assert_eq!(summary.orders_completed, 0);
	}
}
