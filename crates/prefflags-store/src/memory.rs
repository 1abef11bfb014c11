// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stores. Contents live as long as the provider.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::namespace::{validate_namespace, STANDARD_NAMESPACE};
use crate::native::NativeValue;
use crate::store::{Domain, SharedStore, Store, StoreProvider};

#[derive(Debug)]
pub struct MemoryStore {
	name: String,
	domain: RwLock<Domain>,
}

impl MemoryStore {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			domain: RwLock::new(Domain::default()),
		}
	}
}

impl Store for MemoryStore {
	fn name(&self) -> &str {
		&self.name
	}

	fn get_raw(&self, key: &str) -> Option<NativeValue> {
		self.domain.read().get(key).cloned()
	}

	fn set(&self, key: &str, value: NativeValue) -> Result<(), StoreError> {
		self
			.domain
			.write()
			.persistent
			.insert(key.to_string(), value);
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.domain.write().persistent.remove(key);
		Ok(())
	}

	fn register_defaults(&self, defaults: BTreeMap<String, NativeValue>) {
		self.domain.write().registered.extend(defaults);
	}

	fn keys(&self) -> Vec<String> {
		self.domain.read().keys()
	}
}

/// A family of in-memory stores keyed by namespace.
#[derive(Debug)]
pub struct MemoryStoreProvider {
	standard: Arc<MemoryStore>,
	namespaces: RwLock<HashMap<String, Arc<MemoryStore>>>,
}

impl MemoryStoreProvider {
	pub fn new() -> Self {
		Self {
			standard: Arc::new(MemoryStore::new(STANDARD_NAMESPACE)),
			namespaces: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryStoreProvider {
	fn default() -> Self {
		Self::new()
	}
}

impl StoreProvider for MemoryStoreProvider {
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

		let store = self
			.namespaces
			.write()
			.entry(namespace.to_string())
			.or_insert_with(|| {
				debug!(namespace = %namespace, "created in-memory store");
				Arc::new(MemoryStore::new(namespace))
			})
			.clone();
		Some(store)
	}
}
