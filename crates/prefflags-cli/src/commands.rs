// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Output is JSON on the given writer.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use prefflags::{EvaluationContext, EvaluationResult, FeatureProvider, PrefFlagsProvider, Value};
use prefflags_core::wrap_in_value;
use prefflags_store::Store;

/// The flag kind a command reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagKind {
	Bool,
	String,
	Int,
	Double,
	Date,
	List,
	Structure,
	/// Whatever kind is stored; values are parsed as JSON.
	Object,
}

/// Parses a command-line value as `kind`.
///
/// Strings are taken verbatim, dates as RFC 3339, lists, structures and
/// objects as JSON. An object that is not valid JSON is taken as a string.
pub fn parse_value(kind: FlagKind, raw: &str) -> Result<Value> {
	Ok(match kind {
		FlagKind::Bool => Value::Boolean(
			raw.parse()
				.with_context(|| format!("'{raw}' is not a boolean"))?,
		),
		FlagKind::String => Value::String(raw.to_string()),
		FlagKind::Int => Value::Integer(
			raw.parse()
				.with_context(|| format!("'{raw}' is not an integer"))?,
		),
		FlagKind::Double => Value::Double(
			raw.parse()
				.with_context(|| format!("'{raw}' is not a number"))?,
		),
		FlagKind::Date => Value::Date(
			DateTime::parse_from_rfc3339(raw)
				.with_context(|| format!("'{raw}' is not an RFC 3339 date"))?
				.with_timezone(&Utc),
		),
		FlagKind::List => match parse_json(raw)? {
			list @ Value::List(_) => list,
			_ => bail!("'{raw}' is not a JSON array"),
		},
		FlagKind::Structure => match parse_json(raw)? {
			structure @ Value::Structure(_) => structure,
			_ => bail!("'{raw}' is not a JSON object"),
		},
		FlagKind::Object => serde_json::from_str::<serde_json::Value>(raw)
			.map(|json| Value::from_json(&json))
			.unwrap_or_else(|_| Value::String(raw.to_string())),
	})
}

fn parse_json(raw: &str) -> Result<Value> {
	let json: serde_json::Value =
		serde_json::from_str(raw).with_context(|| format!("'{raw}' is not valid JSON"))?;
	Ok(Value::from_json(&json))
}

fn zero_value(kind: FlagKind) -> Value {
	match kind {
		FlagKind::Bool => Value::Boolean(false),
		FlagKind::String => Value::String(String::new()),
		FlagKind::Int => Value::Integer(0),
		FlagKind::Double => Value::Double(0.0),
		FlagKind::Date => Value::Date(DateTime::<Utc>::default()),
		FlagKind::List => Value::List(Vec::new()),
		FlagKind::Structure => Value::Structure(BTreeMap::new()),
		FlagKind::Object => Value::Null,
	}
}

/// Evaluates `key` and prints the resolution details.
pub fn get(
	provider: &PrefFlagsProvider,
	key: &str,
	kind: FlagKind,
	default: Option<&str>,
	context: &dyn EvaluationContext,
	out: &mut impl Write,
) -> Result<()> {
	let default = match default {
		Some(raw) => parse_value(kind, raw)?,
		None => zero_value(kind),
	};
	let ctx = Some(context);
	let mismatch = || anyhow!("default does not match kind {kind:?}");

	let result: EvaluationResult<Value> = match kind {
		FlagKind::Bool => {
			let default = default.as_boolean().ok_or_else(mismatch)?;
			provider
				.get_boolean_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::String => {
			let default = default.as_string().ok_or_else(mismatch)?.to_string();
			provider
				.get_string_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::Int => {
			let default = default.as_integer().ok_or_else(mismatch)?;
			provider
				.get_integer_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::Double => {
			let default = default.as_double().ok_or_else(mismatch)?;
			provider
				.get_double_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::Date => {
			let default = default.as_date().ok_or_else(mismatch)?;
			provider
				.get_date_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::List => {
			let default = default.as_list().ok_or_else(mismatch)?.to_vec();
			provider
				.get_list_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::Structure => {
			let default = default.as_structure().ok_or_else(mismatch)?.clone();
			provider
				.get_structure_evaluation(key, default, ctx)?
				.into_value_result()
		}
		FlagKind::Object => provider.get_object_evaluation(key, default, ctx)?,
	};

	writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
	Ok(())
}

/// Stores `raw` under `key`, parsed as `kind`.
pub fn set(
	provider: &PrefFlagsProvider,
	key: &str,
	kind: FlagKind,
	raw: &str,
	context: &dyn EvaluationContext,
) -> Result<()> {
	let value = parse_value(kind, raw)?;
	provider.set_value(key, |_| value, Some(context))?;
	Ok(())
}

pub fn remove(store: &dyn Store, key: &str) -> Result<()> {
	store
		.remove(key)
		.with_context(|| format!("failed to remove {key}"))
}

/// Prints every visible key with its value. Values that do not convert are
/// shown as their conversion error.
pub fn list(store: &dyn Store, out: &mut impl Write) -> Result<()> {
	let mut entries = serde_json::Map::new();
	for key in store.keys() {
		let Some(raw) = store.get_raw(&key) else {
			continue;
		};
		let json = match wrap_in_value(&raw) {
			Ok(value) => value.to_json(),
			Err(e) => serde_json::json!({ "error": e.to_string() }),
		};
		entries.insert(key, json);
	}

	writeln!(
		out,
		"{}",
		serde_json::to_string_pretty(&serde_json::Value::Object(entries))?
	)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	use prefflags::{MutableContext, NoOpEventSink};
	use prefflags_store::{FileStoreProvider, MemoryStoreProvider, NativeValue, StoreProvider};

	fn create_test_provider() -> (PrefFlagsProvider, Arc<MemoryStoreProvider>) {
		let stores = Arc::new(MemoryStoreProvider::new());
		let provider = PrefFlagsProvider::new(stores.clone(), Arc::new(NoOpEventSink));
		provider.initialize(None).unwrap();
		(provider, stores)
	}

	fn output(buf: Vec<u8>) -> serde_json::Value {
		serde_json::from_slice(&buf).unwrap()
	}

	#[test]
	fn test_parse_value() {
		assert_eq!(parse_value(FlagKind::Bool, "true").unwrap(), Value::Boolean(true));
		assert_eq!(parse_value(FlagKind::Int, "-4").unwrap(), Value::Integer(-4));
		assert_eq!(parse_value(FlagKind::String, "[1]").unwrap(), Value::from("[1]"));
		assert_eq!(
			parse_value(FlagKind::List, "[1, \"a\"]").unwrap(),
			Value::List(vec![Value::Integer(1), Value::from("a")])
		);
		assert_eq!(parse_value(FlagKind::Object, "plain").unwrap(), Value::from("plain"));
		assert!(parse_value(FlagKind::Int, "1.5").is_err());
		assert!(parse_value(FlagKind::Structure, "[]").is_err());
		assert!(parse_value(FlagKind::Date, "yesterday").is_err());
	}

	#[test]
	fn test_set_then_get() {
		let (provider, _) = create_test_provider();
		let ctx = MutableContext::new().with_targeting_key("cli");

		set(&provider, "limit", FlagKind::Int, "100", &ctx).unwrap();

		let mut buf = Vec::new();
		get(&provider, "limit", FlagKind::Int, None, &ctx, &mut buf).unwrap();
		let json = output(buf);
		assert_eq!(json["value"], 100);
		assert_eq!(json["variant"], "100");
		assert_eq!(json["reason"], "CACHED");
	}

	#[test]
	fn test_get_missing_object_with_null_default() {
		let (provider, _) = create_test_provider();
		let ctx = MutableContext::new();

		let mut buf = Vec::new();
		get(&provider, "missing", FlagKind::Object, None, &ctx, &mut buf).unwrap();
		let json = output(buf);
		assert_eq!(json["value"], serde_json::Value::Null);
		assert_eq!(json["reason"], "DEFAULT");
	}

	#[test]
	fn test_get_rejects_mismatched_default() {
		let (provider, _) = create_test_provider();
		let ctx = MutableContext::new();
		let mut buf = Vec::new();
		assert!(get(&provider, "k", FlagKind::Int, Some("x"), &ctx, &mut buf).is_err());
	}

	#[test]
	fn test_list_and_remove() {
		let (_, stores) = create_test_provider();
		let store = stores.standard();
		store.set("a", NativeValue::from(1)).unwrap();
		store.set("blob", NativeValue::Data(vec![1])).unwrap();

		let mut buf = Vec::new();
		list(store.as_ref(), &mut buf).unwrap();
		let json = output(buf);
		assert_eq!(json["a"], 1);
		assert_eq!(json["blob"]["error"], "cannot detect type of <1 bytes>");

		remove(store.as_ref(), "a").unwrap();
		assert!(!store.has("a"));
	}

	#[test]
	fn test_set_in_namespace_persists_to_file_store() {
		let tmp = tempfile::TempDir::new().unwrap();
		let stores = Arc::new(FileStoreProvider::new(tmp.path()).unwrap());
		let provider = PrefFlagsProvider::new(stores.clone(), Arc::new(NoOpEventSink));
		provider.initialize(None).unwrap();

		let ctx = MutableContext::new()
			.with_targeting_key("cli")
			.with_namespace("tenant");
		set(&provider, "layout", FlagKind::Structure, r#"{"columns": 3}"#, &ctx).unwrap();

		let reopened = FileStoreProvider::new(tmp.path()).unwrap();
		let store = reopened.open_named("tenant").unwrap();
		let mut buf = Vec::new();
		list(store.as_ref(), &mut buf).unwrap();
		assert_eq!(output(buf)["layout"]["columns"], 3);
	}
}
