// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-kind flag resolution against one resolved store.
//!
//! Every typed resolution fails with `FlagNotFound` when the key is absent.
//! Booleans and numbers then read through the store's best-effort accessors
//! and cannot fail. Strings, dates, lists and structures fall back to the
//! caller's default with reason `Default` when the stored value is not of
//! the requested kind or does not convert.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use prefflags_core::{
	detect_type, wrap_array, wrap_in_value, wrap_structure, DetectedType, EvaluationResult,
	ProviderError, Reason, Result, Value,
};
use prefflags_store::Store;
use tracing::{debug, warn};

fn ensure_present(store: &dyn Store, key: &str) -> Result<()> {
	if store.has(key) {
		Ok(())
	} else {
		debug!(key = %key, store = %store.name(), "flag not found");
		Err(ProviderError::flag_not_found(key))
	}
}

fn fallback<T>(store: &dyn Store, key: &str, default: T) -> EvaluationResult<T>
where
	T: Clone + Into<Value>,
{
	debug!(key = %key, store = %store.name(), "stored value unreadable, using default");
	EvaluationResult::described(default, Reason::Default)
}

pub(crate) fn boolean(store: &dyn Store, key: &str) -> Result<EvaluationResult<bool>> {
	ensure_present(store, key)?;
	Ok(EvaluationResult::described(store.get_bool(key), Reason::Cached))
}

pub(crate) fn integer(store: &dyn Store, key: &str) -> Result<EvaluationResult<i64>> {
	ensure_present(store, key)?;
	Ok(EvaluationResult::described(store.get_integer(key), Reason::Cached))
}

pub(crate) fn double(store: &dyn Store, key: &str) -> Result<EvaluationResult<f64>> {
	ensure_present(store, key)?;
	Ok(EvaluationResult::described(store.get_double(key), Reason::Cached))
}

pub(crate) fn string(store: &dyn Store, key: &str, default: String) -> Result<EvaluationResult<String>> {
	ensure_present(store, key)?;
	Ok(match store.get_string(key) {
		Some(value) => EvaluationResult::described(value, Reason::Cached),
		None => fallback(store, key, default),
	})
}

pub(crate) fn date(
	store: &dyn Store,
	key: &str,
	default: DateTime<Utc>,
) -> Result<EvaluationResult<DateTime<Utc>>> {
	ensure_present(store, key)?;
	Ok(match store.get_date(key) {
		Some(value) => EvaluationResult::described(value, Reason::Cached),
		None => fallback(store, key, default),
	})
}

pub(crate) fn list(store: &dyn Store, key: &str, default: Vec<Value>) -> Result<EvaluationResult<Vec<Value>>> {
	ensure_present(store, key)?;
	let Some(items) = store.get_array(key) else {
		return Ok(fallback(store, key, default));
	};
	Ok(match wrap_array(&items) {
		Ok(value) => EvaluationResult::described(value, Reason::Cached),
		Err(e) => {
			warn!(key = %key, store = %store.name(), error = %e, "stored list does not convert");
			fallback(store, key, default)
		}
	})
}

pub(crate) fn structure(
	store: &dyn Store,
	key: &str,
	default: BTreeMap<String, Value>,
) -> Result<EvaluationResult<BTreeMap<String, Value>>> {
	ensure_present(store, key)?;
	let Some(map) = store.get_dictionary(key) else {
		return Ok(fallback(store, key, default));
	};
	Ok(match wrap_structure(&map) {
		Ok(value) => EvaluationResult::described(value, Reason::Cached),
		Err(e) => {
			warn!(key = %key, store = %store.name(), error = %e, "stored structure does not convert");
			fallback(store, key, default)
		}
	})
}

/// Resolves a flag of whatever kind the store holds.
///
/// The stored value is classified, then resolved by the matching typed
/// resolution with a default taken from `default` (or that kind's zero
/// value). Any failure becomes a `Null`/`Default` result when `default` is
/// itself `Null`.
pub(crate) fn object(store: &dyn Store, key: &str, default: Value) -> Result<EvaluationResult<Value>> {
	let Some(raw) = store.get_raw(key) else {
		return null_or(&default, ProviderError::flag_not_found(key));
	};

	let kind = detect_type(&raw);
	debug!(key = %key, store = %store.name(), kind = kind.type_name(), "dispatching object flag");

	let dispatched = match kind {
		DetectedType::Boolean => boolean(store, key).map(EvaluationResult::into_value_result),
		DetectedType::String => {
			let default = default.as_string().unwrap_or_default().to_string();
			string(store, key, default).map(EvaluationResult::into_value_result)
		}
		// the integer accessor saturates; out-of-range values must not resolve
		DetectedType::Integer => wrap_in_value(&raw)
			.map_err(|e| {
				warn!(key = %key, store = %store.name(), error = %e, "stored integer out of range");
				ProviderError::from(e)
			})
			.and_then(|_| integer(store, key))
			.map(EvaluationResult::into_value_result),
		DetectedType::Double => double(store, key).map(EvaluationResult::into_value_result),
		DetectedType::Date => {
			let default = default.as_date().unwrap_or_default();
			date(store, key, default).map(EvaluationResult::into_value_result)
		}
		DetectedType::Array => {
			let default = default.as_list().map(<[Value]>::to_vec).unwrap_or_default();
			list(store, key, default).map(EvaluationResult::into_value_result)
		}
		DetectedType::Structure => {
			let default = default.as_structure().cloned().unwrap_or_default();
			structure(store, key, default).map(EvaluationResult::into_value_result)
		}
		DetectedType::Null => return Ok(EvaluationResult::new(Value::Null, "null", Reason::Cached)),
		DetectedType::Unknown => {
			warn!(key = %key, store = %store.name(), value = %raw, "stored value has no flag kind");
			return Err(ProviderError::TypeMismatch);
		}
	};

	dispatched.or_else(|_| null_or(&default, ProviderError::TypeMismatch))
}

fn null_or(default: &Value, err: ProviderError) -> Result<EvaluationResult<Value>> {
	if default.is_null() {
		Ok(EvaluationResult::new(Value::Null, default.to_string(), Reason::Default))
	} else {
		Err(err)
	}
}
