//! Configuration module for the orderflow service.
//!
//! This module provides structures and utilities for managing pipeline
//! configuration. It supports loading configuration from TOML files with
//! environment variable substitution and validates that all required values
//! are properly set before the service starts.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the orderflow service.
///
/// Contains the HTTP server binding, the worker-pool parameters shared by the
/// two pipeline queues, and the storage backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the HTTP server.
	#[serde(default)]
	pub server: ServerConfig,
	/// Configuration for the pipeline queues.
	pub queue: QueueConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

/// Configuration for the pipeline queues.
///
/// Both the creation queue and the processing queue are sized from the same
/// parameters, matching one worker cohort per stage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
	/// Number of concurrent workers per queue. Must be at least 1.
	pub worker_pool: usize,
	/// Maximum items buffered per queue before backpressure applies.
	pub queue_capacity: usize,
	/// Simulated fulfillment delay in milliseconds.
	#[serde(default = "default_fulfillment_delay_ms")]
	pub fulfillment_delay_ms: u64,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

/// Returns the default server host.
fn default_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default server port.
fn default_port() -> u16 {
	8080
}

/// Returns the default fulfillment delay in milliseconds.
///
/// One second, matching the simulated fulfillment work the processing stage
/// performs per order.
fn default_fulfillment_delay_ms() -> u64 {
	1000
}

/// Substitutes `${VAR}` and `${VAR:-default}` placeholders with values from
/// the process environment.
///
/// A placeholder without a default whose variable is unset is an error.
/// Variable names and defaults are length-capped by the pattern, and the
/// whole input is capped at 1MB, so untrusted config text cannot blow up the
/// scan.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration input is {} bytes, limit is {}",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let pattern = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	// Single forward pass: copy the text between placeholders verbatim and
	// splice each resolved value in as we go.
	let mut output = String::with_capacity(input.len());
	let mut cursor = 0;
	for cap in pattern.captures_iter(input) {
		let placeholder = cap.get(0).unwrap();
		let name = &cap[1];

		let value = match std::env::var(name) {
			Ok(value) => value,
			Err(_) => match cap.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						name
					)))
				}
			},
		};

		output.push_str(&input[cursor..placeholder.start()]);
		output.push_str(&value);
		cursor = placeholder.end();
	}
	output.push_str(&input[cursor..]);

	Ok(output)
}

impl Config {
	/// Loads configuration from a TOML file.
	///
	/// Environment variables in the file are resolved before parsing, and the
	/// resulting configuration is validated.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - The worker pool must have at least one worker.
	/// - A primary storage implementation must be named and configured.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.queue.worker_pool == 0 {
			return Err(ConfigError::Validation(
				"queue.worker_pool must be at least 1".into(),
			));
		}

		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 9090

[queue]
worker_pool = 4
queue_capacity = 64

[storage]
primary = "memory"
[storage.implementations.memory]
"#;

	#[test]
	fn test_parse_full_config() {
		let config: Config = BASE_CONFIG.parse().unwrap();
		assert_eq!(config.server.host, "0.0.0.0");
		assert_eq!(config.server.port, 9090);
		assert_eq!(config.queue.worker_pool, 4);
		assert_eq!(config.queue.queue_capacity, 64);
		assert_eq!(config.queue.fulfillment_delay_ms, 1000);
		assert_eq!(config.storage.primary, "memory");
	}

	#[test]
	fn test_server_defaults() {
		let config: Config = r#"
[queue]
worker_pool = 1
queue_capacity = 0

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();
		assert_eq!(config.server.host, "127.0.0.1");
		assert_eq!(config.server.port, 8080);
		assert_eq!(config.queue.queue_capacity, 0);
	}

	#[test]
	fn test_zero_workers_rejected() {
		let result = r#"
[queue]
worker_pool = 0
queue_capacity = 16

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse::<Config>();
		assert!(result.is_err());
		let message = result.unwrap_err().to_string();
		assert!(message.contains("worker_pool"));
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let result = r#"
[queue]
worker_pool = 2
queue_capacity = 16

[storage]
primary = "postgres"
[storage.implementations.memory]
"#
		.parse::<Config>();
		assert!(result.is_err());
		let message = result.unwrap_err().to_string();
		assert!(message.contains("postgres"));
	}

	#[test]
	fn test_env_var_default_substitution() {
		let input = "value = \"${ORDERFLOW_TEST_UNSET_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_multiple_placeholders_on_one_line() {
		std::env::set_var("ORDERFLOW_TEST_HOST", "0.0.0.0");
		let input = "addr = \"${ORDERFLOW_TEST_HOST}:${ORDERFLOW_TEST_UNSET_PORT:-9000}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "addr = \"0.0.0.0:9000\"");
		std::env::remove_var("ORDERFLOW_TEST_HOST");
	}

	#[test]
	fn test_env_var_missing_without_default() {
		let input = "value = \"${ORDERFLOW_TEST_UNSET_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
	}

	#[test]
	fn test_env_var_substitution_from_environment() {
		std::env::set_var("ORDERFLOW_TEST_PORT", "7070");
		let config: Config = r#"
[server]
port = ${ORDERFLOW_TEST_PORT}

[queue]
worker_pool = 2
queue_capacity = 16

[storage]
primary = "memory"
[storage.implementations.memory]
"#
		.parse()
		.unwrap();
		assert_eq!(config.server.port, 7070);
		std::env::remove_var("ORDERFLOW_TEST_PORT");
	}

	#[test]
	fn test_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, BASE_CONFIG).unwrap();

		let config = Config::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(config.queue.worker_pool, 4);
	}
}
