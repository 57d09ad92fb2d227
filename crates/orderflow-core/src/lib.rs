//! Core orderflow engine that orchestrates the two-stage order pipeline.
//!
//! This module wires the creation queue (durably persist a newly submitted
//! order) and the processing queue (fulfill it and mark it complete) together
//! with the status cache and the repository layer, and exposes the
//! create/get/status operations the HTTP surface calls.

pub mod metrics;
pub mod service;
mod workers;

pub use metrics::MetricsService;
pub use service::{OrderService, OrderServiceError};
