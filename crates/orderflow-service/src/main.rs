//! Main entry point for the orderflow service.
//!
//! This binary wires the configured storage backend, the status cache, and
//! the two-stage order pipeline together, then serves the HTTP API until
//! interrupted. All components are constructed here and handed to the
//! orchestrator by reference; there is no global state.

use clap::Parser;
use orderflow_cache::InMemoryCache;
use orderflow_config::{Config, StorageConfig};
use orderflow_core::{MetricsService, OrderService};
use orderflow_storage::{
	KvItemRepository, KvMetricRepository, KvOrderRepository, StorageBackend, StorageError,
	StorageFactory, StorageService,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

// Import implementations from the storage crate
use orderflow_storage::implementations::file::create_storage as create_file_storage;
use orderflow_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the orderflow service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the orderflow service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the pipeline with the configured storage backend
/// 5. Serves the HTTP API until interrupted, then drains the pipeline
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started orderflow");

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid config path: {}", args.config.display()))?;
	let config = Config::from_file(config_path)?;
	tracing::info!(
		"Loaded configuration [storage={}, workers={}]",
		config.storage.primary,
		config.queue.worker_pool
	);

	let state = build_services(&config)?;
	state.orders.start().await;

	let server_task = server::start_server(config.server.clone(), state.clone());

	tokio::select! {
		result = server_task => {
			tracing::info!("API server finished");
			result?;
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Interrupt received, draining pipeline");
		}
	}

	state.orders.shutdown().await;
	tracing::info!("Stopped orderflow");
	Ok(())
}

/// Creates the configured storage backend.
///
/// The backend name is looked up in the factory map; its implementation
/// section from the config file is passed through to the factory.
fn create_backend(config: &StorageConfig) -> Result<Box<dyn StorageBackend>, StorageError> {
	let factories: HashMap<&str, StorageFactory> = HashMap::from([
		("memory", create_memory_storage as StorageFactory),
		("file", create_file_storage as StorageFactory),
	]);

	let factory = factories.get(config.primary.as_str()).ok_or_else(|| {
		StorageError::Configuration(format!("Unknown storage backend '{}'", config.primary))
	})?;

	let backend_config = config
		.implementations
		.get(&config.primary)
		.cloned()
		.unwrap_or_else(|| toml::Value::Table(toml::map::Map::new()));

	factory(&backend_config)
}

/// Builds the repositories, cache, and services from configuration.
fn build_services(config: &Config) -> Result<server::AppState, StorageError> {
	let backend = create_backend(&config.storage)?;
	let storage = Arc::new(StorageService::new(backend));

	let order_repo = Arc::new(KvOrderRepository::new(storage.clone()));
	let item_repo = Arc::new(KvItemRepository::new(storage.clone()));
	let metric_repo = Arc::new(KvMetricRepository::new(storage));
	let cache = Arc::new(InMemoryCache::new());

	let orders = Arc::new(OrderService::new(
		&config.queue,
		order_repo.clone(),
		item_repo,
		metric_repo.clone(),
		cache,
	));
	let metrics = Arc::new(MetricsService::new(metric_repo, order_repo));

	Ok(server::AppState { orders, metrics })
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Creates a minimal test configuration for unit testing
	fn create_test_config(primary: &str) -> Config {
		let config_str = format!(
			r#"
[queue]
worker_pool = 2
queue_capacity = 16
fulfillment_delay_ms = 10

[storage]
primary = "{}"
[storage.implementations.memory]
[storage.implementations.file]
storage_path = "./target/test-storage"
"#,
			primary
		);
		config_str.parse().unwrap()
	}

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_create_backend_known_names() {
		assert!(create_backend(&create_test_config("memory").storage).is_ok());
		assert!(create_backend(&create_test_config("file").storage).is_ok());
	}

	#[test]
	fn test_create_backend_unknown_name() {
		let mut config = create_test_config("memory");
		config.storage.primary = "redis".to_string();
		config
			.storage
			.implementations
			.insert("redis".to_string(), toml::Value::Table(toml::map::Map::new()));

		let result = create_backend(&config.storage);
		assert!(matches!(result, Err(StorageError::Configuration(_))));
	}

	#[tokio::test]
	async fn test_build_services_with_memory_backend() {
		let config = create_test_config("memory");
		let state = build_services(&config).unwrap();

		// A fresh pipeline serves an empty metrics summary.
		let summary = state.metrics.get_metrics().await;
		assert_eq!(summary.total_orders_received, 0);
	}
}
