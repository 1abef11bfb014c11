// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON-file-backed stores, one document per namespace.
//!
//! Layout under the data directory:
//!
//! ```text
//! <data_dir>/standard.json      process-wide default store
//! <data_dir>/<namespace>.json   one file per namespace
//! ```
//!
//! Values are written with explicit type tags, so dates and numeric
//! subtypes read back exactly as they were written. Every write replaces
//! the whole document through a temp file and a rename.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::namespace::{validate_namespace, STANDARD_NAMESPACE};
use crate::native::NativeValue;
use crate::store::{Domain, SharedStore, Store, StoreProvider};

#[derive(Debug)]
pub struct FileStore {
	name: String,
	path: PathBuf,
	domain: RwLock<Domain>,
}

impl FileStore {
	/// Opens the store at `path`, reading existing contents if the file exists.
	pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
		let name = name.into();
		let path = path.into();

		let persistent = if path.exists() {
			let contents = std::fs::read_to_string(&path)?;
			let values: BTreeMap<String, NativeValue> =
				serde_json::from_str(&contents).map_err(|e| StoreError::Malformed {
					path: path.clone(),
					source: e,
				})?;
			debug!(
				namespace = %name,
				path = %path.display(),
				count = values.len(),
				"loaded store from disk"
			);
			values
		} else {
			BTreeMap::new()
		};

		Ok(Self {
			name,
			path,
			domain: RwLock::new(Domain::with_persistent(persistent)),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self, values: &BTreeMap<String, NativeValue>) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			std::fs::create_dir_all(parent)?;
		}

		let tmp_path = self.path.with_extension("json.tmp");
		let json = serde_json::to_string_pretty(values)?;

		std::fs::write(&tmp_path, &json)?;
		std::fs::rename(&tmp_path, &self.path)?;

		debug!(
			namespace = %self.name,
			path = %self.path.display(),
			count = values.len(),
			"saved store to disk"
		);

		Ok(())
	}

	/// Applies `change` to a copy of the persisted values and commits it only
	/// once the copy is on disk.
	fn update(&self, change: impl FnOnce(&mut BTreeMap<String, NativeValue>)) -> Result<()> {
		let mut domain = self.domain.write();
		let mut next = domain.persistent.clone();
		change(&mut next);
		self.persist(&next)?;
		domain.persistent = next;
		Ok(())
	}
}

impl Store for FileStore {
	fn name(&self) -> &str {
		&self.name
	}

	fn get_raw(&self, key: &str) -> Option<NativeValue> {
		self.domain.read().get(key).cloned()
	}

	fn set(&self, key: &str, value: NativeValue) -> Result<()> {
		self.update(|values| {
			values.insert(key.to_string(), value);
		})
	}

	fn remove(&self, key: &str) -> Result<()> {
		if !self.domain.read().persistent.contains_key(key) {
			return Ok(());
		}
		self.update(|values| {
			values.remove(key);
		})
	}

	fn register_defaults(&self, defaults: BTreeMap<String, NativeValue>) {
		self.domain.write().registered.extend(defaults);
	}

	fn keys(&self) -> Vec<String> {
		self.domain.read().keys()
	}
}

/// A family of file stores rooted at one data directory.
#[derive(Debug)]
pub struct FileStoreProvider {
	root: PathBuf,
	standard: Arc<FileStore>,
	namespaces: RwLock<HashMap<String, Arc<FileStore>>>,
}

impl FileStoreProvider {
	pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		std::fs::create_dir_all(&root)?;

		let standard = FileStore::open(STANDARD_NAMESPACE, store_path(&root, STANDARD_NAMESPACE))?;

		info!(root = %root.display(), "initialized file store provider");

		Ok(Self {
			root,
			standard: Arc::new(standard),
			namespaces: RwLock::new(HashMap::new()),
		})
	}

	/// Roots the stores at `$XDG_DATA_HOME/prefflags`.
	pub fn from_xdg() -> Result<Self> {
		let data_dir = dirs::data_dir().ok_or(StoreError::DataDirNotFound)?;
		Self::new(data_dir.join("prefflags"))
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

impl StoreProvider for FileStoreProvider {
	fn standard(&self) -> SharedStore {
		self.standard.clone()
	}

	fn open_named(&self, namespace: &str) -> Option<SharedStore> {
		if !validate_namespace(namespace) {
			debug!(namespace = %namespace, "rejected invalid namespace");
			return None;
		}

		if let Some(store) = self.namespaces.read().get(namespace) {
			return Some(store.clone());
		}

		let mut namespaces = self.namespaces.write();
		if let Some(store) = namespaces.get(namespace) {
			return Some(store.clone());
		}

		match FileStore::open(namespace, store_path(&self.root, namespace)) {
			Ok(store) => {
				let store = Arc::new(store);
				namespaces.insert(namespace.to_string(), store.clone());
				Some(store)
			}
			Err(e) => {
				warn!(namespace = %namespace, error = %e, "failed to open namespace store");
				None
			}
		}
	}
}

fn store_path(root: &Path, namespace: &str) -> PathBuf {
	root.join(format!("{namespace}.json"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{TimeZone, Utc};
	use tempfile::TempDir;

	use crate::native::Number;

	fn create_test_provider() -> (FileStoreProvider, TempDir) {
		let tmp = TempDir::new().unwrap();
		let provider = FileStoreProvider::new(tmp.path()).unwrap();
		(provider, tmp)
	}

	#[test]
	fn test_values_survive_reopen() {
		let tmp = TempDir::new().unwrap();
		let date = Utc.timestamp_opt(1_000_000_000, 0).unwrap();

		{
			let provider = FileStoreProvider::new(tmp.path()).unwrap();
			let store = provider.open_named("suiteName").unwrap();
			store.set("date", NativeValue::Date(date)).unwrap();
			store
				.set("small", NativeValue::Number(Number::I16(7)))
				.unwrap();
			store.set("pi", NativeValue::from(3.1415)).unwrap();
		}

		let provider = FileStoreProvider::new(tmp.path()).unwrap();
		let store = provider.open_named("suiteName").unwrap();

		assert_eq!(store.get_date("date"), Some(date));
		assert_eq!(
			store.get_raw("small"),
			Some(NativeValue::Number(Number::I16(7)))
		);
		assert_eq!(store.get_double("pi"), 3.1415);
	}

	#[test]
	fn test_non_finite_doubles_survive_reopen() {
		let tmp = TempDir::new().unwrap();

		{
			let provider = FileStoreProvider::new(tmp.path()).unwrap();
			let store = provider.standard();
			store.set("ratio", NativeValue::from(f64::NAN)).unwrap();
			store.set("ceiling", NativeValue::from(f64::INFINITY)).unwrap();
			store.set("other", NativeValue::from(1)).unwrap();
		}

		let provider = FileStoreProvider::new(tmp.path()).unwrap();
		let store = provider.standard();
		assert!(store.get_double("ratio").is_nan());
		assert_eq!(store.get_double("ceiling"), f64::INFINITY);
		assert_eq!(store.get_integer("other"), 1);
	}

	#[test]
	fn test_namespace_file_layout() {
		let (provider, tmp) = create_test_provider();
		provider
			.standard()
			.set("flag", NativeValue::Bool(true))
			.unwrap();
		provider
			.open_named("tenant")
			.unwrap()
			.set("flag", NativeValue::Bool(false))
			.unwrap();

		assert!(tmp.path().join("standard.json").exists());
		assert!(tmp.path().join("tenant.json").exists());
		assert!(!tmp.path().join("tenant.json.tmp").exists());
	}

	#[test]
	fn test_registered_defaults_are_not_persisted() {
		let tmp = TempDir::new().unwrap();

		{
			let provider = FileStoreProvider::new(tmp.path()).unwrap();
			let mut defaults = BTreeMap::new();
			defaults.insert("flag".to_string(), NativeValue::Bool(true));
			provider.standard().register_defaults(defaults);
			provider
				.standard()
				.set("other", NativeValue::from(1))
				.unwrap();
			assert!(provider.standard().has("flag"));
		}

		let provider = FileStoreProvider::new(tmp.path()).unwrap();
		assert!(!provider.standard().has("flag"));
		assert!(provider.standard().has("other"));
	}

	#[test]
	fn test_remove_persists() {
		let (provider, tmp) = create_test_provider();
		let store = provider.standard();
		store.set("flag", NativeValue::from("x")).unwrap();
		store.remove("flag").unwrap();

		let reopened = FileStore::open(STANDARD_NAMESPACE, tmp.path().join("standard.json")).unwrap();
		assert!(!reopened.has("flag"));
	}

	#[test]
	fn test_malformed_namespace_file_fails_open() {
		let (provider, tmp) = create_test_provider();
		std::fs::write(tmp.path().join("broken.json"), "not json").unwrap();

		assert!(provider.open_named("broken").is_none());
	}

	#[test]
	fn test_malformed_file_reports_path() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("broken.json");
		std::fs::write(&path, "{").unwrap();

		let result = FileStore::open("broken", &path);
		assert!(matches!(result, Err(StoreError::Malformed { .. })));
	}

	#[test]
	fn test_open_named_shares_instance() {
		let (provider, _tmp) = create_test_provider();
		let first = provider.open_named("shared").unwrap();
		first.set("flag", NativeValue::from(5)).unwrap();

		let second = provider.open_named("shared").unwrap();
		assert_eq!(second.get_integer("flag"), 5);
	}
}
