//! Order orchestration service.
//!
//! Wires the two pipeline queues and exposes the create/get/status
//! operations. Creation is write-behind: the caller gets an identifier back
//! immediately while the creation queue persists the order and the
//! processing queue fulfills it.

use crate::workers::{CreationWorker, FulfillmentWorker};
use orderflow_cache::{CacheError, StatusCache};
use orderflow_config::QueueConfig;
use orderflow_queue::{EnqueuePolicy, Processor, QueueItem, TaskQueue};
use orderflow_storage::{
	ItemRepository, MetricRepository, OrderRepository, StorageError,
};
use orderflow_types::{
	CreateOrderRequest, GetOrderResponse, MetricKind, OrderRef, OrderStatus,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the order service.
#[derive(Debug, Error)]
pub enum OrderServiceError {
	/// The identifier is absent from cache and durable storage.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// Durable storage failed.
	#[error("Storage error: {0}")]
	Storage(String),
	/// The order could not be accepted into the pipeline.
	#[error("Queue error: {0}")]
	Queue(String),
}

/// Orchestrator for the asynchronous order pipeline.
///
/// Owns the creation queue and the processing queue, plus the cache and
/// repositories both stages share. Constructed once in the composition root
/// and passed around as an `Arc`.
pub struct OrderService {
	creation_queue: Arc<TaskQueue<CreateOrderRequest>>,
	processing_queue: Arc<TaskQueue<OrderRef>>,
	orders: Arc<dyn OrderRepository>,
	items: Arc<dyn ItemRepository>,
	cache: Arc<dyn StatusCache>,
}

impl OrderService {
	/// Creates the service and its two queue instances.
	///
	/// The creation queue sits at the outer boundary and blocks on a full
	/// buffer; the processing queue is internal and drops on full.
	pub fn new(
		queue_config: &QueueConfig,
		orders: Arc<dyn OrderRepository>,
		items: Arc<dyn ItemRepository>,
		metrics: Arc<dyn MetricRepository>,
		cache: Arc<dyn StatusCache>,
	) -> Self {
		let fulfillment = Arc::new(FulfillmentWorker {
			orders: orders.clone(),
			cache: cache.clone(),
			delay: Duration::from_millis(queue_config.fulfillment_delay_ms),
		});
		let processing_queue = Arc::new(TaskQueue::new(
			queue_config.worker_pool,
			queue_config.queue_capacity,
			EnqueuePolicy::DropOnFull,
			MetricKind::ProcessingTime,
			fulfillment as Arc<dyn Processor<OrderRef>>,
			metrics.clone(),
		));

		let creation = Arc::new(CreationWorker {
			orders: orders.clone(),
			items: items.clone(),
			processing_queue: processing_queue.clone(),
		});
		let creation_queue = Arc::new(TaskQueue::new(
			queue_config.worker_pool,
			queue_config.queue_capacity,
			EnqueuePolicy::Block,
			MetricKind::CreationTime,
			creation as Arc<dyn Processor<CreateOrderRequest>>,
			metrics,
		));

		Self {
			creation_queue,
			processing_queue,
			orders,
			items,
			cache,
		}
	}

	/// Starts the worker cohorts of both queues.
	pub async fn start(&self) {
		self.creation_queue.start().await;
		self.processing_queue.start().await;
	}

	/// Stops both queues, draining in-flight work.
	///
	/// The creation queue stops first so it no longer forwards into the
	/// processing queue while that one winds down.
	pub async fn shutdown(&self) {
		self.creation_queue.stop().await;
		self.processing_queue.stop().await;
	}

	/// Accepts an order submission and returns its identifier immediately.
	///
	/// The order is persisted and fulfilled asynchronously; a status read
	/// right after this call returns Pending from cache.
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<String, OrderServiceError> {
		let order_id = uuid::Uuid::new_v4().to_string();

		if let Err(e) = self.cache.set_status(&order_id, OrderStatus::Pending).await {
			tracing::warn!(%order_id, "Failed to set Pending status in cache: {}", e);
		}

		self.creation_queue
			.enqueue(QueueItem {
				id: order_id.clone(),
				payload: request,
			})
			.await
			.map_err(|e| OrderServiceError::Queue(e.to_string()))?;

		Ok(order_id)
	}

	/// Returns the current status of an order, cache first.
	///
	/// On a cache miss the durable record is consulted and the cache
	/// repopulated best-effort.
	pub async fn get_order_status(&self, order_id: &str) -> Result<OrderStatus, OrderServiceError> {
		match self.cache.get_status(order_id).await {
			Ok(status) => return Ok(status),
			Err(CacheError::NotFound) => {}
			Err(e) => {
				tracing::warn!(%order_id, "Cache read failed: {}", e);
			}
		}

		// Fallback to durable storage.
		let order = match self.orders.get_order(order_id).await {
			Ok(order) => order,
			Err(StorageError::NotFound) => {
				return Err(OrderServiceError::NotFound(order_id.to_string()))
			}
			Err(e) => return Err(OrderServiceError::Storage(e.to_string())),
		};

		if let Err(e) = self.cache.set_status(order_id, order.status).await {
			tracing::warn!(%order_id, "Failed to repopulate cache: {}", e);
		}
		Ok(order.status)
	}

	/// Returns the full order record, always from durable storage.
	///
	/// Full records are never cached, only statuses.
	pub async fn get_order(&self, order_id: &str) -> Result<GetOrderResponse, OrderServiceError> {
		let order = match self.orders.get_order(order_id).await {
			Ok(order) => order,
			Err(StorageError::NotFound) => {
				return Err(OrderServiceError::NotFound(order_id.to_string()))
			}
			Err(e) => return Err(OrderServiceError::Storage(e.to_string())),
		};

		let item_ids = match self.items.items_for_order(order_id).await {
			Ok(items) => items.into_iter().map(|i| i.item_id).collect(),
			Err(StorageError::NotFound) => Vec::new(),
			Err(e) => return Err(OrderServiceError::Storage(e.to_string())),
		};

		Ok(GetOrderResponse {
			order_id: order.order_id,
			user_id: order.user_id,
			item_ids,
			total_amount: order.total_amount,
			status: order.status,
		})
	}
}
