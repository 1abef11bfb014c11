// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store traits shared by every backend.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::native::NativeValue;

/// A key-value preference store.
///
/// Implementations own their thread-safety: each call is atomic on its own,
/// but nothing spans two calls.
pub trait Store: Send + Sync + fmt::Debug {
	/// Namespace this store was opened with, or the standard store name.
	fn name(&self) -> &str;

	/// Returns the stored value, falling back to registered defaults.
	fn get_raw(&self, key: &str) -> Option<NativeValue>;

	fn set(&self, key: &str, value: NativeValue) -> Result<(), StoreError>;

	/// Removes a persisted value. Registered defaults stay visible.
	fn remove(&self, key: &str) -> Result<(), StoreError>;

	/// Adds values to the volatile registration domain, consulted when no
	/// persisted value exists. Never written to disk.
	fn register_defaults(&self, defaults: BTreeMap<String, NativeValue>);

	/// All visible keys, persisted and registered, sorted.
	fn keys(&self) -> Vec<String>;

	fn has(&self, key: &str) -> bool {
		self.get_raw(key).is_some()
	}

	fn get_bool(&self, key: &str) -> bool {
		self
			.get_raw(key)
			.map(|v| v.coerce_bool())
			.unwrap_or(false)
	}

	fn get_integer(&self, key: &str) -> i64 {
		self.get_raw(key).map(|v| v.coerce_integer()).unwrap_or(0)
	}

	fn get_double(&self, key: &str) -> f64 {
		self.get_raw(key).map(|v| v.coerce_double()).unwrap_or(0.0)
	}

	fn get_string(&self, key: &str) -> Option<String> {
		self.get_raw(key).and_then(|v| v.coerce_string())
	}

	fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
		match self.get_raw(key)? {
			NativeValue::Date(date) => Some(date),
			_ => None,
		}
	}

	fn get_array(&self, key: &str) -> Option<Vec<NativeValue>> {
		match self.get_raw(key)? {
			NativeValue::Array(items) => Some(items),
			_ => None,
		}
	}

	fn get_dictionary(&self, key: &str) -> Option<BTreeMap<String, NativeValue>> {
		match self.get_raw(key)? {
			NativeValue::Dictionary(map) => Some(map),
			_ => None,
		}
	}
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn Store>;

/// A family of stores: one process-wide default plus named namespaces.
pub trait StoreProvider: Send + Sync + fmt::Debug {
	/// The process-wide default store.
	fn standard(&self) -> SharedStore;

	/// Opens the store for `namespace`, or `None` if it cannot be opened.
	///
	/// Opening the same namespace twice yields the same underlying store.
	fn open_named(&self, namespace: &str) -> Option<SharedStore>;
}

/// Shared handle to a store family.
pub type SharedStoreProvider = Arc<dyn StoreProvider>;

/// Persisted values layered over registered defaults.
#[derive(Debug, Clone, Default)]
pub(crate) struct Domain {
	pub(crate) persistent: BTreeMap<String, NativeValue>,
	pub(crate) registered: BTreeMap<String, NativeValue>,
}

impl Domain {
	pub(crate) fn with_persistent(persistent: BTreeMap<String, NativeValue>) -> Self {
		Self {
			persistent,
			registered: BTreeMap::new(),
		}
	}

	pub(crate) fn get(&self, key: &str) -> Option<&NativeValue> {
		self
			.persistent
			.get(key)
			.or_else(|| self.registered.get(key))
	}

	pub(crate) fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self
			.persistent
			.keys()
			.chain(self.registered.keys())
			.cloned()
			.collect();
		keys.sort();
		keys.dedup();
		keys
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_domain_prefers_persistent() {
		let mut domain = Domain::default();
		domain.registered.insert("flag".to_string(), NativeValue::from(1));
		domain.persistent.insert("flag".to_string(), NativeValue::from(2));

		assert_eq!(domain.get("flag"), Some(&NativeValue::from(2)));
	}

	#[test]
	fn test_domain_falls_back_to_registered() {
		let mut domain = Domain::default();
		domain.registered.insert("flag".to_string(), NativeValue::from(true));

		assert_eq!(domain.get("flag"), Some(&NativeValue::Bool(true)));
		assert_eq!(domain.get("missing"), None);
	}

	#[test]
	fn test_domain_keys_are_merged_and_sorted() {
		let mut domain = Domain::default();
		domain.registered.insert("b".to_string(), NativeValue::Null);
		domain.registered.insert("a".to_string(), NativeValue::Null);
		domain.persistent.insert("b".to_string(), NativeValue::Null);
		domain.persistent.insert("c".to_string(), NativeValue::Null);

		assert_eq!(domain.keys(), vec!["a", "b", "c"]);
	}
}
