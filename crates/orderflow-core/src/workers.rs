//! Stage workers bound to the pipeline queues.
//!
//! Each worker is the processing function of one queue instance. Failures
//! here are logged and never retried: cache and metric loss is acceptable,
//! and a durable-persist failure in the creation stage still forwards the
//! item so the pipeline keeps moving (best-effort by design, see DESIGN.md).

use async_trait::async_trait;
use orderflow_cache::StatusCache;
use orderflow_queue::{Processor, QueueItem, TaskQueue};
use orderflow_storage::{ItemRepository, OrderRepository};
use orderflow_types::{CreateOrderRequest, Item, Order, OrderRef, OrderStatus};
use std::sync::Arc;
use std::time::Duration;

/// Creation-stage worker: persists a submitted order and hands it off to the
/// processing queue.
pub(crate) struct CreationWorker {
	pub orders: Arc<dyn OrderRepository>,
	pub items: Arc<dyn ItemRepository>,
	pub processing_queue: Arc<TaskQueue<OrderRef>>,
}

impl CreationWorker {
	async fn persist(&self, order_id: &str, request: &CreateOrderRequest) -> Result<(), String> {
		let now = chrono::Utc::now();
		let order = Order {
			order_id: order_id.to_string(),
			user_id: request.user_id.clone(),
			total_amount: request.total_amount,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		};
		self.orders
			.create_order(&order)
			.await
			.map_err(|e| e.to_string())?;

		let items: Vec<Item> = request
			.item_ids
			.iter()
			.map(|item_id| Item {
				item_id: item_id.clone(),
				order_id: order_id.to_string(),
				// Item-level pricing is not part of the submission; the total
				// is carried on the order.
				amount: 0.0,
			})
			.collect();
		if let Err(e) = self.items.create_items(order_id, &items).await {
			tracing::warn!(%order_id, "Failed to persist order items: {}", e);
		}
		Ok(())
	}
}

#[async_trait]
impl Processor<CreateOrderRequest> for CreationWorker {
	async fn process(&self, item: QueueItem<CreateOrderRequest>) {
		if let Err(e) = self.persist(&item.id, &item.payload).await {
			tracing::error!(order_id = %item.id, "Failed to persist order: {}", e);
		}

		// Forwarded even when the persist failed; the order will still read
		// Completed from cache eventually.
		let forwarded = self
			.processing_queue
			.enqueue(QueueItem {
				id: item.id.clone(),
				payload: OrderRef {
					order_id: item.id.clone(),
				},
			})
			.await;
		if let Err(e) = forwarded {
			tracing::warn!(order_id = %item.id, "Failed to forward order to processing: {}", e);
		}
	}
}

/// Processing-stage worker: performs the fulfillment work and drives the
/// order to its terminal status.
pub(crate) struct FulfillmentWorker {
	pub orders: Arc<dyn OrderRepository>,
	pub cache: Arc<dyn StatusCache>,
	pub delay: Duration,
}

#[async_trait]
impl Processor<OrderRef> for FulfillmentWorker {
	async fn process(&self, item: QueueItem<OrderRef>) {
		let order_id = item.payload.order_id;

		if let Err(e) = self
			.cache
			.set_status(&order_id, OrderStatus::Processing)
			.await
		{
			tracing::warn!(%order_id, "Failed to update cache to Processing: {}", e);
		}

		// Simulated fulfillment work.
		tokio::time::sleep(self.delay).await;

		// Persist the terminal status concurrently with the cache update,
		// but wait for it so the recorded metric covers the full invocation.
		let persist = {
			let orders = self.orders.clone();
			let order_id = order_id.clone();
			tokio::spawn(async move {
				if let Err(e) = orders
					.update_order_status(&order_id, OrderStatus::Completed)
					.await
				{
					tracing::error!(%order_id, "Failed to update order to Completed: {}", e);
				}
			})
		};

		if let Err(e) = self
			.cache
			.set_status(&order_id, OrderStatus::Completed)
			.await
		{
			tracing::warn!(%order_id, "Failed to update cache to Completed: {}", e);
		}

		if let Err(e) = persist.await {
			tracing::error!(%order_id, "Status persist task panicked: {}", e);
		}
	}
}
