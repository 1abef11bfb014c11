// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tagged flag value.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use prefflags_store::{NativeValue, Number};
use serde::Serialize;

/// A flag value of exactly one kind.
///
/// Serializes untagged: dates as RFC 3339 strings, `Null` as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
	Boolean(bool),
	String(String),
	Integer(i64),
	Double(f64),
	Date(DateTime<Utc>),
	List(Vec<Value>),
	Structure(BTreeMap<String, Value>),
	Null,
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_boolean(&self) -> Option<bool> {
		match self {
			Value::Boolean(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_string(&self) -> Option<&str> {
		match self {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			Value::Integer(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_double(&self) -> Option<f64> {
		match self {
			Value::Double(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_date(&self) -> Option<DateTime<Utc>> {
		match self {
			Value::Date(d) => Some(*d),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_structure(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Value::Structure(map) => Some(map),
			_ => None,
		}
	}

	/// Converts to JSON. Dates become RFC 3339 strings.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Boolean(b) => serde_json::Value::Bool(*b),
			Value::String(s) => serde_json::Value::String(s.clone()),
			Value::Integer(n) => serde_json::Value::from(*n),
			// Non-finite doubles have no JSON form
			Value::Double(n) => serde_json::Number::from_f64(*n)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			Value::Date(d) => serde_json::Value::String(format_date(d)),
			Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
			Value::Structure(map) => serde_json::Value::Object(
				map
					.iter()
					.map(|(k, v)| (k.clone(), v.to_json()))
					.collect(),
			),
			Value::Null => serde_json::Value::Null,
		}
	}

	/// Builds a value from JSON. Integers that fit `i64` become `Integer`,
	/// every other number `Double`. Strings are never read as dates.
	pub fn from_json(json: &serde_json::Value) -> Value {
		match json {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(b) => Value::Boolean(*b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Value::Integer(i),
				None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
			},
			serde_json::Value::String(s) => Value::String(s.clone()),
			serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
			serde_json::Value::Object(map) => Value::Structure(
				map
					.iter()
					.map(|(k, v)| (k.clone(), Value::from_json(v)))
					.collect(),
			),
		}
	}
}

/// Formats a date the way variants and JSON output show it:
/// `yyyy-MM-ddTHH:mm:ss.SSSZ` in UTC.
pub fn format_date(date: &DateTime<Utc>) -> String {
	date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Boolean(b) => write!(f, "{b}"),
			Value::String(s) => write!(f, "{s}"),
			Value::Integer(n) => write!(f, "{n}"),
			Value::Double(n) => write!(f, "{n}"),
			Value::Date(d) => write!(f, "{}", format_date(d)),
			Value::List(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write_nested(f, item)?;
				}
				write!(f, "]")
			}
			Value::Structure(map) => {
				write!(f, "{{")?;
				for (i, (key, value)) in map.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key:?}: ")?;
					write_nested(f, value)?;
				}
				write!(f, "}}")
			}
			Value::Null => write!(f, "null"),
		}
	}
}

// Strings inside containers are quoted so `["a, b"]` stays distinguishable
// from `["a", "b"]`.
fn write_nested(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
	match value {
		Value::String(s) => write!(f, "{s:?}"),
		other => write!(f, "{other}"),
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Boolean(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::String(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::String(value.to_string())
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Integer(value)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Double(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Value::Date(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Value::List(value)
	}
}

impl From<BTreeMap<String, Value>> for Value {
	fn from(value: BTreeMap<String, Value>) -> Self {
		Value::Structure(value)
	}
}

/// The store-native form a value is persisted in.
///
/// Dates stay timestamps and containers stay containers; nothing is
/// flattened to a string.
impl From<&Value> for NativeValue {
	fn from(value: &Value) -> Self {
		match value {
			Value::Boolean(b) => NativeValue::Bool(*b),
			Value::String(s) => NativeValue::String(s.clone()),
			Value::Integer(n) => NativeValue::Number(Number::I64(*n)),
			Value::Double(n) => NativeValue::Number(Number::F64(*n)),
			Value::Date(d) => NativeValue::Date(*d),
			Value::List(items) => NativeValue::Array(items.iter().map(NativeValue::from).collect()),
			Value::Structure(map) => NativeValue::Dictionary(
				map
					.iter()
					.map(|(k, v)| (k.clone(), NativeValue::from(v)))
					.collect(),
			),
			Value::Null => NativeValue::Null,
		}
	}
}

impl From<Value> for NativeValue {
	fn from(value: Value) -> Self {
		NativeValue::from(&value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	#[test]
	fn test_display_scalars() {
		assert_eq!(Value::Boolean(true).to_string(), "true");
		assert_eq!(Value::from("string").to_string(), "string");
		assert_eq!(Value::Integer(100).to_string(), "100");
		assert_eq!(Value::Double(3.1415).to_string(), "3.1415");
		assert_eq!(Value::Null.to_string(), "null");
	}

	#[test]
	fn test_display_date_uses_millis_utc() {
		let date = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
		assert_eq!(Value::Date(date).to_string(), "2001-09-09T01:46:40.000Z");
	}

	#[test]
	fn test_display_containers() {
		let mut map = BTreeMap::new();
		map.insert("falseKey".to_string(), Value::Boolean(false));
		let list = Value::List(vec![
			Value::from("a, b"),
			Value::Integer(1),
			Value::Structure(map),
		]);
		assert_eq!(list.to_string(), r#"["a, b", 1, {"falseKey": false}]"#);
	}

	#[test]
	fn test_accessors_match_only_their_kind() {
		assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
		assert_eq!(Value::Integer(1).as_boolean(), None);
		assert_eq!(Value::Integer(1).as_double(), None);
		assert_eq!(Value::Double(1.0).as_integer(), None);
		assert_eq!(Value::from("x").as_string(), Some("x"));
		assert!(Value::Null.is_null());
		assert!(Value::List(vec![]).as_structure().is_none());
	}

	#[test]
	fn test_json_conversion() {
		let json = serde_json::json!({
			"enabled": true,
			"count": 3,
			"ratio": 0.5,
			"tags": ["a", null],
		});
		let value = Value::from_json(&json);

		let map = value.as_structure().unwrap();
		assert_eq!(map["enabled"], Value::Boolean(true));
		assert_eq!(map["count"], Value::Integer(3));
		assert_eq!(map["ratio"], Value::Double(0.5));
		assert_eq!(map["tags"], Value::List(vec![Value::from("a"), Value::Null]));
		assert_eq!(value.to_json(), json);
	}

	#[test]
	fn test_serialize_is_untagged() {
		let value = Value::List(vec![Value::Integer(1), Value::Null, Value::from("x")]);
		assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,null,"x"]"#);
	}

	#[test]
	fn test_native_form_keeps_dates_and_containers() {
		let date = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
		let value = Value::List(vec![Value::Date(date), Value::Double(1.5)]);

		assert_eq!(
			NativeValue::from(&value),
			NativeValue::Array(vec![
				NativeValue::Date(date),
				NativeValue::Number(Number::F64(1.5)),
			])
		);
	}
}
