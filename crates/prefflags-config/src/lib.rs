// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for prefflags.
//!
//! This crate provides:
//! - Layered configuration from defaults, a TOML file and the environment
//! - Consistent environment variable naming (`PREFFLAGS_*`)
//! - Construction of the configured store family, with `[defaults]`
//!   registered into its standard store
//!
//! # Usage
//!
//! ```ignore
//! use prefflags_config::{build_stores, initial_context, load_config};
//!
//! let config = load_config()?;
//! let stores = build_stores(&config)?;
//! let context = initial_context(&config.store);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::PrefFlagsConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;
use std::sync::Arc;

use prefflags_core::{MutableContext, SharedContext};
use prefflags_store::{validate_namespace, FileStoreProvider, MemoryStoreProvider, SharedStoreProvider};
use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefFlagsConfig {
	pub store: StoreConfig,
	pub logging: LoggingConfig,
	pub defaults: DefaultsConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`PREFFLAGS_*`)
/// 2. Config file (`$XDG_CONFIG_HOME/prefflags/config.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<PrefFlagsConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource)];
	if let Some(user) = TomlSource::user() {
		sources.push(Box::new(user));
	}
	sources.push(Box::new(EnvSource::new()));

	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<PrefFlagsConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	])
}

/// Merge the given sources in precedence order and finalize.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<PrefFlagsConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PrefFlagsConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

fn finalize(layer: PrefFlagsConfigLayer) -> Result<PrefFlagsConfig, ConfigError> {
	let store = layer.store.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();
	let defaults = layer.defaults.unwrap_or_default().finalize()?;

	validate_config(&store)?;

	Ok(PrefFlagsConfig {
		store,
		logging,
		defaults,
	})
}

impl PrefFlagsConfig {
	/// Logs the resolved settings. Call once a subscriber is installed.
	pub fn log_summary(&self) {
		info!(
			backend = %self.store.backend,
			data_dir = %self.store.data_dir.display(),
			namespace = self.store.namespace.as_deref().unwrap_or("standard"),
			defaults = self.defaults.values.len(),
			log_level = %self.logging.level,
			"prefflags configuration loaded"
		);
	}
}

fn validate_config(store: &StoreConfig) -> Result<(), ConfigError> {
	if let Some(namespace) = &store.namespace {
		if !validate_namespace(namespace) {
			return Err(ConfigError::Validation(format!(
				"store namespace '{namespace}' is not a valid namespace name"
			)));
		}
	}
	Ok(())
}

/// Opens the configured store family and registers `[defaults]` into its
/// standard store.
pub fn build_stores(config: &PrefFlagsConfig) -> Result<SharedStoreProvider, ConfigError> {
	let stores: SharedStoreProvider = match config.store.backend {
		StoreBackend::Memory => Arc::new(MemoryStoreProvider::new()),
		StoreBackend::File => Arc::new(FileStoreProvider::new(&config.store.data_dir)?),
	};

	if !config.defaults.is_empty() {
		debug!(count = config.defaults.values.len(), "registering flag defaults");
		stores
			.standard()
			.register_defaults(config.defaults.values.clone());
	}

	Ok(stores)
}

/// The context a provider should be initialized with: one selecting the
/// configured namespace, or none to use the standard store.
pub fn initial_context(store: &StoreConfig) -> Option<SharedContext> {
	store
		.namespace
		.as_ref()
		.map(|namespace| MutableContext::new().with_namespace(namespace.clone()).into_shared())
}

#[cfg(test)]
mod tests {
	use super::*;
	use prefflags_core::{EvaluationContext, Value, NAMESPACE_CONTEXT_KEY};
	use prefflags_store::NativeValue;
	use tempfile::TempDir;

	fn load(toml_str: &str, env: Vec<(&str, &str)>) -> Result<PrefFlagsConfig, ConfigError> {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("config.toml");
		std::fs::write(&path, toml_str).unwrap();

		load_from_sources(vec![
			Box::new(EnvSource::from_vars(env)),
			Box::new(TomlSource::new(&path)),
			Box::new(DefaultsSource),
		])
	}

	#[test]
	fn test_env_overrides_file() {
		let config = load(
			"[store]\nbackend = \"file\"\ndata_dir = \"/tmp/a\"\n[logging]\nlevel = \"warn\"",
			vec![("PREFFLAGS_STORE_BACKEND", "memory")],
		)
		.unwrap();

		assert_eq!(config.store.backend, StoreBackend::Memory);
		assert_eq!(config.store.data_dir, PathBuf::from("/tmp/a"));
		assert_eq!(config.logging.level, "warn");
	}

	#[test]
	fn test_invalid_namespace_fails_validation() {
		let err = load("[store]\nnamespace = \"standard\"", vec![]).unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
	}

	#[test]
	fn test_build_memory_stores_registers_defaults() {
		let config = load(
			"[store]\nbackend = \"memory\"\n[defaults]\nflag = 100",
			vec![],
		)
		.unwrap();

		let stores = build_stores(&config).unwrap();
		assert_eq!(stores.standard().get_raw("flag"), Some(NativeValue::from(100i64)));
	}

	#[test]
	fn test_build_file_stores_uses_data_dir() {
		let data = TempDir::new().unwrap();
		let config = load(
			"",
			vec![("PREFFLAGS_STORE_DATA_DIR", data.path().to_str().unwrap())],
		)
		.unwrap();

		let stores = build_stores(&config).unwrap();
		stores
			.standard()
			.set("flag", NativeValue::Bool(true))
			.unwrap();
		assert!(data.path().join("standard.json").exists());
	}

	#[test]
	fn test_initial_context() {
		let config = StoreConfig {
			backend: StoreBackend::Memory,
			data_dir: PathBuf::new(),
			namespace: Some("tenant".to_string()),
		};
		let ctx = initial_context(&config).unwrap();
		assert_eq!(
			ctx.get_value(NAMESPACE_CONTEXT_KEY),
			Some(&Value::from("tenant"))
		);

		let config = StoreConfig {
			namespace: None,
			..config
		};
		assert!(initial_context(&config).is_none());
	}

	#[derive(Clone, Default)]
	struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

	impl std::io::Write for CapturedLogs {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn test_log_summary_reaches_installed_subscriber() {
		let config = load("[store]\nbackend = \"memory\"", vec![]).unwrap();

		let logs = CapturedLogs::default();
		let writer = logs.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_ansi(false)
			.with_writer(move || writer.clone())
			.finish();
		tracing::subscriber::with_default(subscriber, || config.log_summary());

		let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
		assert!(output.contains("prefflags configuration loaded"));
		assert!(output.contains("backend=memory"));
	}
}
