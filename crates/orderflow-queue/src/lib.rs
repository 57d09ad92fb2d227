//! Bounded worker-pool queue for the orderflow pipeline.
//!
//! This module decouples task submission from execution with a fixed degree
//! of parallelism and bounded memory. Each queue instance owns a cohort of
//! workers that pull items off a bounded channel, invoke the processing
//! function bound at construction, and record one timing metric per
//! invocation tagged with the instance's metric kind.
//!
//! The payload type is a generic parameter, so the shape flowing through a
//! queue is checked at compile time rather than asserted at dispatch.

use async_trait::async_trait;
use orderflow_storage::MetricRepository;
use orderflow_types::{Metric, MetricKind};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
	/// The buffer is at capacity and the instance drops rather than blocks.
	#[error("Queue is full")]
	Full,
	/// The queue has been stopped and accepts no further items.
	#[error("Queue is closed")]
	Closed,
}

/// Enqueue discipline applied when the buffer is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueuePolicy {
	/// The caller suspends until buffer space frees.
	Block,
	/// The item is discarded and a warning logged; the caller never blocks.
	DropOnFull,
}

/// A unit of work submitted to a queue.
///
/// The identifier mirrors the order identifier and is used for metric
/// attribution; the payload shape is fixed per queue instance by `T`.
#[derive(Debug, Clone)]
pub struct QueueItem<T> {
	/// Identifier used for metric attribution.
	pub id: String,
	/// Stage-specific payload.
	pub payload: T,
}

/// Processing function bound to a queue instance.
///
/// Invoked once per dequeued item. The engine observes no return value;
/// failures are the processor's responsibility to log.
#[async_trait]
pub trait Processor<T>: Send + Sync {
	async fn process(&self, item: QueueItem<T>);
}

/// Bounded FIFO queue with a fixed-size worker pool.
///
/// `start` spawns the worker cohort, `stop` drains in-flight work and joins
/// every worker. Stopping twice is a no-op; enqueueing after stop reports
/// `QueueError::Closed` without panicking.
pub struct TaskQueue<T> {
	/// Sender side of the channel; taken on stop so no further items enter.
	tx: Mutex<Option<mpsc::Sender<QueueItem<T>>>>,
	/// Receiver shared by the worker cohort.
	rx: Arc<Mutex<mpsc::Receiver<QueueItem<T>>>>,
	/// Number of workers spawned per `start` call.
	worker_count: usize,
	/// Discipline applied when the buffer is full.
	policy: EnqueuePolicy,
	/// Metric kind stamped on every invocation record.
	metric_kind: MetricKind,
	/// Processing function invoked per item.
	processor: Arc<dyn Processor<T>>,
	/// Sink for per-invocation timing metrics.
	metrics: Arc<dyn MetricRepository>,
	/// Handles of spawned workers, joined on stop.
	workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> TaskQueue<T> {
	/// Creates a new queue.
	///
	/// `capacity` bounds the number of buffered items; a zero capacity is
	/// treated as one, the smallest buffer the underlying channel supports.
	pub fn new(
		worker_count: usize,
		capacity: usize,
		policy: EnqueuePolicy,
		metric_kind: MetricKind,
		processor: Arc<dyn Processor<T>>,
		metrics: Arc<dyn MetricRepository>,
	) -> Self {
		let (tx, rx) = mpsc::channel(capacity.max(1));
		Self {
			tx: Mutex::new(Some(tx)),
			rx: Arc::new(Mutex::new(rx)),
			worker_count,
			policy,
			metric_kind,
			processor,
			metrics,
			workers: Mutex::new(Vec::new()),
		}
	}

	/// Spawns the worker cohort.
	///
	/// Calling this twice spawns a second cohort; single-start is a caller
	/// contract, not engine-enforced.
	pub async fn start(&self) {
		let mut workers = self.workers.lock().await;
		for _ in 0..self.worker_count {
			let rx = self.rx.clone();
			let processor = self.processor.clone();
			let metrics = self.metrics.clone();
			let metric_kind = self.metric_kind;

			workers.push(tokio::spawn(async move {
				loop {
					// Hold the receiver lock only while waiting for the next
					// item, not while processing it.
					let item = { rx.lock().await.recv().await };
					let Some(item) = item else {
						// Channel closed, exit worker.
						return;
					};

					let order_id = item.id.clone();
					let started = Instant::now();
					processor.process(item).await;
					let duration = started.elapsed();

					let metric = Metric {
						order_id,
						name: metric_kind,
						duration_seconds: duration.as_secs_f64(),
						created_at: chrono::Utc::now(),
					};
					if let Err(e) = metrics.record_metric(&metric).await {
						tracing::warn!(kind = %metric_kind, "Failed to record metric: {}", e);
					}
				}
			}));
		}
	}

	/// Submits an item to the queue.
	///
	/// With `EnqueuePolicy::Block` the caller suspends until buffer space
	/// frees; with `EnqueuePolicy::DropOnFull` a saturated buffer drops the
	/// item and returns `QueueError::Full`.
	pub async fn enqueue(&self, item: QueueItem<T>) -> Result<(), QueueError> {
		// Clone the sender out so a blocking send never holds the lock.
		let tx = {
			let guard = self.tx.lock().await;
			match guard.as_ref() {
				Some(tx) => tx.clone(),
				None => {
					tracing::warn!(id = %item.id, "Enqueue on stopped queue, dropping item");
					return Err(QueueError::Closed);
				}
			}
		};

		match self.policy {
			EnqueuePolicy::Block => tx.send(item).await.map_err(|_| QueueError::Closed),
			EnqueuePolicy::DropOnFull => match tx.try_send(item) {
				Ok(()) => Ok(()),
				Err(mpsc::error::TrySendError::Full(item)) => {
					tracing::warn!(id = %item.id, "Queue is full, dropping item");
					Err(QueueError::Full)
				}
				Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
			},
		}
	}

	/// Stops the queue.
	///
	/// Closes the input so no further items are accepted, lets every worker
	/// finish the item it already dequeued, and joins the cohort. Safe to
	/// call more than once; later calls are no-ops.
	pub async fn stop(&self) {
		// Dropping the sender closes the channel once in-flight sends finish.
		let tx = self.tx.lock().await.take();
		if tx.is_none() {
			return;
		}
		drop(tx);

		let handles = std::mem::take(&mut *self.workers.lock().await);
		for handle in handles {
			if let Err(e) = handle.await {
				tracing::error!("Queue worker panicked: {}", e);
			}
		}
		tracing::info!(kind = %self.metric_kind, "Queue workers stopped");
	}
}
