// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluation context.
//!
//! Contexts are owned by the caller and only read here. Besides the
//! targeting key, a context may name the store namespace to evaluate
//! against under [`NAMESPACE_CONTEXT_KEY`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Context key naming the store namespace to read and write.
pub const NAMESPACE_CONTEXT_KEY: &str = "prefflags.namespace";

/// Details key carrying the previous context on a context change.
pub const OLD_CONTEXT_KEY: &str = "prefflags.old_context";

/// Details key carrying the new context on a context change.
pub const NEW_CONTEXT_KEY: &str = "prefflags.new_context";

/// Key under which [`EvaluationContext::to_value`] records the targeting key.
pub const TARGETING_KEY: &str = "targetingKey";

pub trait EvaluationContext: Send + Sync + fmt::Debug {
	fn targeting_key(&self) -> &str;

	fn get_value(&self, key: &str) -> Option<&Value>;

	/// All attributes, excluding the targeting key.
	fn as_map(&self) -> BTreeMap<String, Value>;

	/// Attributes as plain JSON, for diagnostics.
	fn as_object_map(&self) -> BTreeMap<String, serde_json::Value> {
		self
			.as_map()
			.into_iter()
			.map(|(k, v)| (k, v.to_json()))
			.collect()
	}

	/// The whole context as a structure, targeting key included when set.
	fn to_value(&self) -> Value {
		let mut map = self.as_map();
		let targeting_key = self.targeting_key();
		if !targeting_key.is_empty() {
			map.insert(TARGETING_KEY.to_string(), Value::from(targeting_key));
		}
		Value::Structure(map)
	}
}

pub type SharedContext = Arc<dyn EvaluationContext>;

/// A context built up by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutableContext {
	targeting_key: String,
	attributes: BTreeMap<String, Value>,
}

impl MutableContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
		self.targeting_key = targeting_key.into();
		self
	}

	pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	/// Selects the store namespace this context evaluates against.
	pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
		self.with_value(NAMESPACE_CONTEXT_KEY, Value::String(namespace.into()))
	}

	pub fn set_targeting_key(&mut self, targeting_key: impl Into<String>) {
		self.targeting_key = targeting_key.into();
	}

	pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.attributes.insert(key.into(), value.into());
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.attributes.remove(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.attributes.keys().map(String::as_str)
	}

	pub fn into_shared(self) -> SharedContext {
		Arc::new(self)
	}
}

impl EvaluationContext for MutableContext {
	fn targeting_key(&self) -> &str {
		&self.targeting_key
	}

	fn get_value(&self, key: &str) -> Option<&Value> {
		self.attributes.get(key)
	}

	fn as_map(&self) -> BTreeMap<String, Value> {
		self.attributes.clone()
	}
}
