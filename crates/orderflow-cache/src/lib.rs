//! Status cache module for the orderflow system.
//!
//! This module provides the best-effort status lookup used on the read path.
//! The cache is advisory: entries may be stale or absent without being wrong,
//! and durable storage remains the fallback of record on every miss.

use async_trait::async_trait;
use orderflow_types::OrderStatus;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
	/// The key is absent. Expected on the read path; callers fall back to
	/// durable storage.
	#[error("Not found")]
	NotFound,
	/// Error that occurs in the cache backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for status caches.
///
/// Implementations must be safe for concurrent use by many workers and by
/// request-handling code simultaneously.
#[async_trait]
pub trait StatusCache: Send + Sync {
	/// Upserts the status for an order identifier.
	async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), CacheError>;

	/// Returns the cached status, or `CacheError::NotFound` if absent.
	async fn get_status(&self, order_id: &str) -> Result<OrderStatus, CacheError>;
}

/// In-memory status cache.
///
/// A read-write lock around a HashMap; reads do not block other reads.
pub struct InMemoryCache {
	store: Arc<RwLock<HashMap<String, OrderStatus>>>,
}

impl InMemoryCache {
	/// Creates a new, empty cache.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for InMemoryCache {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StatusCache for InMemoryCache {
	async fn set_status(&self, order_id: &str, status: OrderStatus) -> Result<(), CacheError> {
		let mut store = self.store.write().await;
		store.insert(order_id.to_string(), status);
		Ok(())
	}

	async fn get_status(&self, order_id: &str) -> Result<OrderStatus, CacheError> {
		let store = self.store.read().await;
		store.get(order_id).copied().ok_or(CacheError::NotFound)
	}
}
