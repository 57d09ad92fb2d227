//! Common types module for the orderflow system.
//!
//! This module defines the core data types and structures used throughout
//! the order pipeline. It provides a centralized location for shared types
//! to ensure consistency across all pipeline components.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Metric types for per-stage timing records and aggregates.
pub mod metric;
/// Order domain types including items and status transitions.
pub mod order;
/// Storage namespace types for keying persistent data.
pub mod storage;

// Re-export all types for convenient access
pub use api::*;
pub use metric::*;
pub use order::*;
pub use storage::*;
