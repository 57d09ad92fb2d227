//! Repository layer over the typed storage service.
//!
//! The pipeline depends on these capability traits rather than on a concrete
//! backend; swapping the memory store for the file store (or a future SQL
//! store) only changes the composition root.

use crate::{StorageError, StorageService};
use async_trait::async_trait;
use orderflow_types::{Item, Metric, MetricKind, Order, OrderStatus, StorageNamespace};
use std::sync::Arc;

/// Durable CRUD for order records.
#[async_trait]
pub trait OrderRepository: Send + Sync {
	/// Persists a new order record.
	async fn create_order(&self, order: &Order) -> Result<(), StorageError>;

	/// Updates the status of an existing order.
	async fn update_order_status(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<(), StorageError>;

	/// Retrieves an order by identifier.
	async fn get_order(&self, order_id: &str) -> Result<Order, StorageError>;

	/// Counts orders currently in the given status.
	async fn count_by_status(&self, status: OrderStatus) -> Result<u64, StorageError>;
}

/// Durable storage for order line items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
	/// Persists the items belonging to an order.
	async fn create_items(&self, order_id: &str, items: &[Item]) -> Result<(), StorageError>;

	/// Retrieves the items belonging to an order.
	async fn items_for_order(&self, order_id: &str) -> Result<Vec<Item>, StorageError>;

	/// Removes the items belonging to an order (cascade with the order).
	async fn remove_for_order(&self, order_id: &str) -> Result<(), StorageError>;
}

/// Append-only sink and aggregate reads for timing metrics.
#[async_trait]
pub trait MetricRepository: Send + Sync {
	/// Appends one metric row.
	async fn record_metric(&self, metric: &Metric) -> Result<(), StorageError>;

	/// Counts all recorded metric rows.
	async fn metric_count(&self) -> Result<u64, StorageError>;

	/// Averages the duration of rows recorded for the given kind.
	///
	/// Returns 0.0 when no rows of that kind exist.
	async fn average_duration(&self, kind: MetricKind) -> Result<f64, StorageError>;
}

/// Order repository backed by the key-value storage service.
pub struct KvOrderRepository {
	storage: Arc<StorageService>,
}

impl KvOrderRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl OrderRepository for KvOrderRepository {
	async fn create_order(&self, order: &Order) -> Result<(), StorageError> {
		self.storage
			.store(StorageNamespace::Orders.as_str(), &order.order_id, order)
			.await
	}

	async fn update_order_status(
		&self,
		order_id: &str,
		status: OrderStatus,
	) -> Result<(), StorageError> {
		let mut order: Order = self
			.storage
			.retrieve(StorageNamespace::Orders.as_str(), order_id)
			.await?;

		if !order.status.is_forward_transition(&status) && order.status != status {
			tracing::warn!(
				order_id,
				from = %order.status,
				to = %status,
				"Backward order status transition"
			);
		}

		order.status = status;
		order.updated_at = chrono::Utc::now();
		self.storage
			.update(StorageNamespace::Orders.as_str(), order_id, &order)
			.await
	}

	async fn get_order(&self, order_id: &str) -> Result<Order, StorageError> {
		self.storage
			.retrieve(StorageNamespace::Orders.as_str(), order_id)
			.await
	}

	async fn count_by_status(&self, status: OrderStatus) -> Result<u64, StorageError> {
		let orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageNamespace::Orders.as_str())
			.await?;
		Ok(orders.iter().filter(|o| o.status == status).count() as u64)
	}
}

/// Item repository backed by the key-value storage service.
///
/// All items of an order live under one key, so cascade removal is a single
/// delete.
pub struct KvItemRepository {
	storage: Arc<StorageService>,
}

impl KvItemRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl ItemRepository for KvItemRepository {
	async fn create_items(&self, order_id: &str, items: &[Item]) -> Result<(), StorageError> {
		self.storage
			.store(StorageNamespace::Items.as_str(), order_id, &items)
			.await
	}

	async fn items_for_order(&self, order_id: &str) -> Result<Vec<Item>, StorageError> {
		self.storage
			.retrieve(StorageNamespace::Items.as_str(), order_id)
			.await
	}

	async fn remove_for_order(&self, order_id: &str) -> Result<(), StorageError> {
		self.storage
			.remove(StorageNamespace::Items.as_str(), order_id)
			.await
	}
}

/// Metric repository backed by the key-value storage service.
///
/// Rows are keyed by a fresh UUID; nothing ever updates or deletes them.
pub struct KvMetricRepository {
	storage: Arc<StorageService>,
}

impl KvMetricRepository {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}
}

#[async_trait]
impl MetricRepository for KvMetricRepository {
	async fn record_metric(&self, metric: &Metric) -> Result<(), StorageError> {
		let row_id = uuid::Uuid::new_v4().to_string();
		self.storage
			.store(StorageNamespace::Metrics.as_str(), &row_id, metric)
			.await
	}

	async fn metric_count(&self) -> Result<u64, StorageError> {
		self.storage.count(StorageNamespace::Metrics.as_str()).await
	}

	async fn average_duration(&self, kind: MetricKind) -> Result<f64, StorageError> {
		let metrics: Vec<Metric> = self
			.storage
			.retrieve_all(StorageNamespace::Metrics.as_str())
			.await?;

		let durations: Vec<f64> = metrics
			.iter()
			.filter(|m| m.name == kind)
			.map(|m| m.duration_seconds)
			.collect();

		if durations.is_empty() {
			return Ok(0.0);
		}
		Ok(durations.iter().sum::<f64>() / durations.len() as f64)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::implementations::memory::MemoryStorage;

	fn storage() -> Arc<StorageService> {
		Arc::new(StorageService::new(Box::new(MemoryStorage::new())))
	}

	fn sample_order(id: &str, status: OrderStatus) -> Order {
		let now = chrono::Utc::now();
		Order {
			order_id: id.to_string(),
			user_id: "u1".to_string(),
			total_amount: 50.0,
			status,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn test_order_create_and_get() {
		let repo = KvOrderRepository::new(storage());
		let order = sample_order("o1", OrderStatus::Pending);

		repo.create_order(&order).await.unwrap();
		let fetched = repo.get_order("o1").await.unwrap();
		assert_eq!(fetched.order_id, "o1");
		assert_eq!(fetched.status, OrderStatus::Pending);
	}

	#[tokio::test]
	async fn test_order_status_update_bumps_timestamp() {
		let repo = KvOrderRepository::new(storage());
		let order = sample_order("o1", OrderStatus::Pending);
		repo.create_order(&order).await.unwrap();

		repo.update_order_status("o1", OrderStatus::Completed)
			.await
			.unwrap();
		let fetched = repo.get_order("o1").await.unwrap();
		assert_eq!(fetched.status, OrderStatus::Completed);
		assert!(fetched.updated_at >= fetched.created_at);
	}

	#[tokio::test]
	async fn test_update_status_of_missing_order() {
		let repo = KvOrderRepository::new(storage());
		let result = repo
			.update_order_status("ghost", OrderStatus::Completed)
			.await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_count_by_status() {
		let repo = KvOrderRepository::new(storage());
		repo.create_order(&sample_order("a", OrderStatus::Pending))
			.await
			.unwrap();
		repo.create_order(&sample_order("b", OrderStatus::Pending))
			.await
			.unwrap();
		repo.create_order(&sample_order("c", OrderStatus::Completed))
			.await
			.unwrap();

		assert_eq!(repo.count_by_status(OrderStatus::Pending).await.unwrap(), 2);
		assert_eq!(
			repo.count_by_status(OrderStatus::Completed).await.unwrap(),
			1
		);
		assert_eq!(
			repo.count_by_status(OrderStatus::Processing).await.unwrap(),
			0
		);
	}

	#[tokio::test]
	async fn test_items_cascade_removal() {
		let repo = KvItemRepository::new(storage());
		let items = vec![
			Item {
				item_id: "a".to_string(),
				order_id: "o1".to_string(),
				amount: 20.0,
			},
			Item {
				item_id: "b".to_string(),
				order_id: "o1".to_string(),
				amount: 30.0,
			},
		];

		repo.create_items("o1", &items).await.unwrap();
		let fetched = repo.items_for_order("o1").await.unwrap();
		assert_eq!(fetched.len(), 2);

		repo.remove_for_order("o1").await.unwrap();
		assert!(matches!(
			repo.items_for_order("o1").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_metric_aggregates_filter_by_kind() {
		let repo = KvMetricRepository::new(storage());
		let now = chrono::Utc::now();

		for (kind, duration) in [
			(MetricKind::ProcessingTime, 1.0),
			(MetricKind::ProcessingTime, 3.0),
			(MetricKind::CreationTime, 100.0),
		] {
			repo.record_metric(&Metric {
				order_id: "o1".to_string(),
				name: kind,
				duration_seconds: duration,
				created_at: now,
			})
			.await
			.unwrap();
		}

		assert_eq!(repo.metric_count().await.unwrap(), 3);
		let avg = repo
			.average_duration(MetricKind::ProcessingTime)
			.await
			.unwrap();
		assert!((avg - 2.0).abs() < f64::EPSILON);
	}

	#[tokio::test]
	async fn test_average_duration_empty() {
		let repo = KvMetricRepository::new(storage());
		let avg = repo
			.average_duration(MetricKind::ProcessingTime)
			.await
			.unwrap();
		assert_eq!(avg, 0.0);
	}
}
