//! Storage-related types for the pipeline.

/// Storage namespaces for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageNamespace {
	/// Namespace for order records.
	Orders,
	/// Namespace for item collections, keyed by owning order.
	Items,
	/// Namespace for metric rows.
	Metrics,
}

impl StorageNamespace {
	/// Returns the string representation of the namespace.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageNamespace::Orders => "orders",
			StorageNamespace::Items => "items",
			StorageNamespace::Metrics => "metrics",
		}
	}
}
