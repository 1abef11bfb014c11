// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Writing flag values computed from a targeting key.
//!
//! Values persist in their native form: dates as timestamps, lists and
//! structures as containers, so the matching getter reads them back
//! unchanged.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use prefflags_core::{EvaluationContext, EventDetails, ProviderError, ProviderEvent, Result, Value};
use prefflags_store::NativeValue;
use tracing::info;

use crate::provider::PrefFlagsProvider;

impl PrefFlagsProvider {
	pub fn set_boolean_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> bool,
	{
		self.store_computed("set_boolean_value", key, |t| Value::Boolean(compute(t)), context)
	}

	pub fn set_string_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> String,
	{
		self.store_computed("set_string_value", key, |t| Value::String(compute(t)), context)
	}

	pub fn set_integer_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> i64,
	{
		self.store_computed("set_integer_value", key, |t| Value::Integer(compute(t)), context)
	}

	pub fn set_double_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> f64,
	{
		self.store_computed("set_double_value", key, |t| Value::Double(compute(t)), context)
	}

	pub fn set_date_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> DateTime<Utc>,
	{
		self.store_computed("set_date_value", key, |t| Value::Date(compute(t)), context)
	}

	pub fn set_list_value<F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		F: FnOnce(&str) -> Vec<Value>,
	{
		self.store_computed("set_list_value", key, |t| Value::List(compute(t)), context)
	}

	pub fn set_structure_value<F>(
		&self,
		key: &str,
		compute: F,
		context: Option<&dyn EvaluationContext>,
	) -> Result<()>
	where
		F: FnOnce(&str) -> BTreeMap<String, Value>,
	{
		self.store_computed("set_structure_value", key, |t| Value::Structure(compute(t)), context)
	}

	/// Stores a value of any kind.
	///
	/// `compute` receives the targeting key of the per-call context, else of
	/// the provider's default context. Fails with a general error when
	/// neither exists. On success a configuration change carrying
	/// `{key: value}` is emitted.
	pub fn set_value<T, F>(&self, key: &str, compute: F, context: Option<&dyn EvaluationContext>) -> Result<()>
	where
		T: Into<Value>,
		F: FnOnce(&str) -> T,
	{
		self.store_computed("set_value", key, |t| compute(t).into(), context)
	}

	fn store_computed<F>(
		&self,
		operation: &str,
		key: &str,
		compute: F,
		context: Option<&dyn EvaluationContext>,
	) -> Result<()>
	where
		F: FnOnce(&str) -> Value,
	{
		let default_context = self.default_context();
		let context: &dyn EvaluationContext = match (context, default_context.as_deref()) {
			(Some(context), _) => context,
			(None, Some(context)) => context,
			(None, None) => {
				return Err(ProviderError::general(format!(
					"`{operation}` needs context or initial context to define targeting key"
				)))
			}
		};

		let store = self.resolve_store(Some(context))?;
		let value = compute(context.targeting_key());

		store
			.set(key, NativeValue::from(&value))
			.map_err(|e| ProviderError::general(format!("cannot store {key}: {e}")))?;

		info!(key = %key, store = %store.name(), operation, "stored flag value");

		let mut details = EventDetails::new();
		details.insert(key.to_string(), value);
		self.emit(ProviderEvent::ConfigurationChanged, None, Some(&details));

		Ok(())
	}
}
