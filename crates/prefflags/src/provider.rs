// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use prefflags_core::{
	EvaluationContext, EvaluationResult, EventDetails, FeatureProvider, ProviderError, ProviderEvent,
	ProviderMetadata, ProviderStatus, Result, SharedContext, SharedEventSink, Value,
	NAMESPACE_CONTEXT_KEY, NEW_CONTEXT_KEY, OLD_CONTEXT_KEY,
};
use prefflags_store::{SharedStore, SharedStoreProvider};
use tracing::{debug, error, info};

use crate::evaluate;

/// Display name reported in provider metadata and events.
pub const PROVIDER_NAME: &str = "PrefFlagsProvider";

#[derive(Default)]
struct ProviderState {
	default_context: Option<SharedContext>,
	default_store: Option<SharedStore>,
	status: ProviderStatus,
}

/// A flag provider backed by a family of local preference stores.
///
/// Each evaluation picks its store from the per-call context, else the
/// context the provider was initialized with, else the store chosen at
/// initialization. A context picks a namespace through the string entry
/// under [`NAMESPACE_CONTEXT_KEY`]; without one it uses the standard store.
///
/// Operations are synchronous. The provider only locks its own state;
/// concurrent access to stored values relies on the stores' own locking.
pub struct PrefFlagsProvider {
	stores: SharedStoreProvider,
	sink: SharedEventSink,
	state: RwLock<ProviderState>,
}

impl fmt::Debug for PrefFlagsProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.read();
		f.debug_struct("PrefFlagsProvider")
			.field("stores", &self.stores)
			.field("status", &state.status)
			.field("default_context", &state.default_context)
			.finish_non_exhaustive()
	}
}

impl PrefFlagsProvider {
	pub fn new(stores: SharedStoreProvider, sink: SharedEventSink) -> Self {
		Self {
			stores,
			sink,
			state: RwLock::new(ProviderState::default()),
		}
	}

	/// The context set by the last `initialize` or `on_context_set`.
	pub fn default_context(&self) -> Option<SharedContext> {
		self.state.read().default_context.clone()
	}

	pub fn stores(&self) -> &SharedStoreProvider {
		&self.stores
	}

	pub(crate) fn emit(
		&self,
		event: ProviderEvent,
		err: Option<&ProviderError>,
		details: Option<&EventDetails>,
	) {
		self.sink.emit(PROVIDER_NAME, event, err, details);
	}

	fn set_status(&self, status: ProviderStatus, err: Option<&ProviderError>) {
		self.state.write().status = status;

		let event = match status {
			ProviderStatus::NotReady => return,
			ProviderStatus::Ready => ProviderEvent::Ready,
			ProviderStatus::Stale => ProviderEvent::Stale,
			ProviderStatus::Error => ProviderEvent::Error,
		};
		self.emit(event, err, None);
	}

	/// Picks the store an operation runs against.
	pub(crate) fn resolve_store(&self, context: Option<&dyn EvaluationContext>) -> Result<SharedStore> {
		if let Some(context) = context {
			return self.store_for(context);
		}

		let (default_context, default_store) = {
			let state = self.state.read();
			(state.default_context.clone(), state.default_store.clone())
		};

		if let Some(context) = default_context {
			return self.store_for(context.as_ref());
		}

		default_store.ok_or(ProviderError::ProviderNotReady)
	}

	fn store_for(&self, context: &dyn EvaluationContext) -> Result<SharedStore> {
		let Some(Value::String(namespace)) = context.get_value(NAMESPACE_CONTEXT_KEY) else {
			return Ok(self.stores.standard());
		};

		self.stores.open_named(namespace).ok_or_else(|| {
			ProviderError::general(format!(
				"cannot open store with namespace: {namespace}, in context: {:?}",
				context.as_object_map()
			))
		})
	}

	pub fn get_date_evaluation(
		&self,
		key: &str,
		default: DateTime<Utc>,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<DateTime<Utc>>> {
		let store = self.resolve_store(context)?;
		evaluate::date(store.as_ref(), key, default)
	}

	pub fn get_list_evaluation(
		&self,
		key: &str,
		default: Vec<Value>,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<Vec<Value>>> {
		let store = self.resolve_store(context)?;
		evaluate::list(store.as_ref(), key, default)
	}

	pub fn get_structure_evaluation(
		&self,
		key: &str,
		default: BTreeMap<String, Value>,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<BTreeMap<String, Value>>> {
		let store = self.resolve_store(context)?;
		evaluate::structure(store.as_ref(), key, default)
	}
}

impl FeatureProvider for PrefFlagsProvider {
	fn metadata(&self) -> ProviderMetadata {
		ProviderMetadata::new(PROVIDER_NAME)
	}

	fn status(&self) -> ProviderStatus {
		self.state.read().status
	}

	/// Adopts `context` as the default context and picks the default store.
	///
	/// Without a context the standard store is used. A context naming a
	/// namespace that cannot be opened moves the provider to `Error`.
	fn initialize(&self, context: Option<SharedContext>) -> Result<()> {
		let store = match &context {
			Some(context) => self.store_for(context.as_ref()),
			None => Ok(self.stores.standard()),
		};

		{
			let mut state = self.state.write();
			state.default_context = context;
			if let Ok(store) = &store {
				state.default_store = Some(store.clone());
			}
		}

		match store {
			Ok(store) => {
				info!(provider = PROVIDER_NAME, store = %store.name(), "provider initialized");
				self.set_status(ProviderStatus::Ready, None);
				Ok(())
			}
			Err(e) => {
				error!(provider = PROVIDER_NAME, error = %e, "provider initialization failed");
				self.set_status(ProviderStatus::Error, Some(&e));
				Err(e)
			}
		}
	}

	fn on_context_set(&self, old: Option<SharedContext>, new: SharedContext) -> Result<()> {
		let result = self.initialize(Some(new.clone()));

		let mut details = EventDetails::new();
		details.insert(
			OLD_CONTEXT_KEY.to_string(),
			old.map(|c| c.to_value()).unwrap_or(Value::Null),
		);
		details.insert(NEW_CONTEXT_KEY.to_string(), new.to_value());
		self.emit(ProviderEvent::ConfigurationChanged, None, Some(&details));

		result
	}

	fn get_boolean_evaluation(
		&self,
		key: &str,
		_default: bool,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<bool>> {
		let store = self.resolve_store(context)?;
		evaluate::boolean(store.as_ref(), key)
	}

	fn get_string_evaluation(
		&self,
		key: &str,
		default: String,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<String>> {
		let store = self.resolve_store(context)?;
		evaluate::string(store.as_ref(), key, default)
	}

	fn get_integer_evaluation(
		&self,
		key: &str,
		_default: i64,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<i64>> {
		let store = self.resolve_store(context)?;
		evaluate::integer(store.as_ref(), key)
	}

	fn get_double_evaluation(
		&self,
		key: &str,
		_default: f64,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<f64>> {
		let store = self.resolve_store(context)?;
		evaluate::double(store.as_ref(), key)
	}

	fn get_object_evaluation(
		&self,
		key: &str,
		default: Value,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<Value>> {
		let store = self.resolve_store(context)?;
		debug!(key = %key, store = %store.name(), "evaluating object flag");
		evaluate::object(store.as_ref(), key, default)
	}
}
