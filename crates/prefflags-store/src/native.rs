// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store-native value representation.
//!
//! A [`NativeValue`] is what a preference store holds under a key. It is
//! deliberately richer than the tagged flag value: numbers keep the width
//! they were written with, and the store can hold opaque byte blobs that no
//! flag kind maps onto.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A number as the store recorded it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Number {
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	U64(u64),
	#[serde(with = "float_repr")]
	F32(f32),
	#[serde(with = "float_repr")]
	F64(f64),
}

/// Floats serialize as JSON numbers when finite and as `"NaN"`, `"inf"` or
/// `"-inf"` otherwise, since JSON has no literal for them.
mod float_repr {
	use serde::{de, Deserialize, Deserializer, Serializer};

	pub trait Float: Copy + Into<f64> {
		fn from_f64(value: f64) -> Self;
	}

	impl Float for f32 {
		fn from_f64(value: f64) -> Self {
			value as f32
		}
	}

	impl Float for f64 {
		fn from_f64(value: f64) -> Self {
			value
		}
	}

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Repr {
		Number(f64),
		Text(String),
	}

	pub fn serialize<T: Float, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
		let value: f64 = (*value).into();
		if value.is_finite() {
			serializer.serialize_f64(value)
		} else if value.is_nan() {
			serializer.serialize_str("NaN")
		} else if value > 0.0 {
			serializer.serialize_str("inf")
		} else {
			serializer.serialize_str("-inf")
		}
	}

	pub fn deserialize<'de, T: Float, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
		let value = match Repr::deserialize(deserializer)? {
			Repr::Number(n) => n,
			Repr::Text(text) => match text.as_str() {
				"NaN" => f64::NAN,
				"inf" => f64::INFINITY,
				"-inf" => f64::NEG_INFINITY,
				_ => {
					return Err(de::Error::invalid_value(
						de::Unexpected::Str(&text),
						&"a number, \"NaN\", \"inf\" or \"-inf\"",
					))
				}
			},
		};
		Ok(T::from_f64(value))
	}
}

impl Number {
	/// Widens any subtype to `f64`.
	pub fn as_f64(&self) -> f64 {
		match *self {
			Number::I8(n) => f64::from(n),
			Number::I16(n) => f64::from(n),
			Number::I32(n) => f64::from(n),
			Number::I64(n) => n as f64,
			Number::U64(n) => n as f64,
			Number::F32(n) => f64::from(n),
			Number::F64(n) => n,
		}
	}

	/// Converts to `i64`, truncating floats toward zero and saturating at the
	/// bounds of `i64`.
	pub fn truncated_i64(&self) -> i64 {
		match *self {
			Number::I8(n) => i64::from(n),
			Number::I16(n) => i64::from(n),
			Number::I32(n) => i64::from(n),
			Number::I64(n) => n,
			Number::U64(n) => i64::try_from(n).unwrap_or(i64::MAX),
			// `as` saturates and maps NaN to zero
			Number::F32(n) => n as i64,
			Number::F64(n) => n as i64,
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Number::I8(n) => write!(f, "{n}"),
			Number::I16(n) => write!(f, "{n}"),
			Number::I32(n) => write!(f, "{n}"),
			Number::I64(n) => write!(f, "{n}"),
			Number::U64(n) => write!(f, "{n}"),
			Number::F32(n) => write!(f, "{n}"),
			Number::F64(n) => write!(f, "{n}"),
		}
	}
}

/// A value held by a preference store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NativeValue {
	Bool(bool),
	String(String),
	Number(Number),
	Date(DateTime<Utc>),
	Array(Vec<NativeValue>),
	Dictionary(BTreeMap<String, NativeValue>),
	Null,
	/// Raw bytes. No flag kind reads these.
	Data(Vec<u8>),
}

impl NativeValue {
	/// Best-effort boolean read.
	///
	/// Numbers are true when non-zero. Strings are true for `true`/`yes`
	/// (any case) or a non-zero number. Everything else is false.
	pub fn coerce_bool(&self) -> bool {
		match self {
			NativeValue::Bool(b) => *b,
			NativeValue::Number(n) => n.as_f64() != 0.0,
			NativeValue::String(s) => {
				let s = s.trim();
				if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") {
					return true;
				}
				parse_number(s).map(|n| n != 0.0).unwrap_or(false)
			}
			_ => false,
		}
	}

	/// Best-effort integer read; zero when nothing sensible exists.
	pub fn coerce_integer(&self) -> i64 {
		match self {
			NativeValue::Bool(b) => i64::from(*b),
			NativeValue::Number(n) => n.truncated_i64(),
			NativeValue::String(s) => {
				let s = s.trim();
				s.parse::<i64>()
					.ok()
					.or_else(|| parse_number(s).map(|f| f as i64))
					.unwrap_or(0)
			}
			_ => 0,
		}
	}

	/// Best-effort floating-point read; zero when nothing sensible exists.
	pub fn coerce_double(&self) -> f64 {
		match self {
			NativeValue::Bool(b) => {
				if *b {
					1.0
				} else {
					0.0
				}
			}
			NativeValue::Number(n) => n.as_f64(),
			NativeValue::String(s) => parse_number(s.trim()).unwrap_or(0.0),
			_ => 0.0,
		}
	}

	/// Text read. Numbers render as text; other kinds yield `None`.
	pub fn coerce_string(&self) -> Option<String> {
		match self {
			NativeValue::String(s) => Some(s.clone()),
			NativeValue::Number(n) => Some(n.to_string()),
			_ => None,
		}
	}
}

fn parse_number(s: &str) -> Option<f64> {
	s.parse::<f64>().ok().filter(|f| f.is_finite())
}

impl fmt::Display for NativeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NativeValue::Bool(b) => write!(f, "{b}"),
			NativeValue::String(s) => write!(f, "{s:?}"),
			NativeValue::Number(n) => write!(f, "{n}"),
			NativeValue::Date(d) => write!(f, "{}", d.to_rfc3339_opts(SecondsFormat::Millis, true)),
			NativeValue::Array(items) => {
				write!(f, "[")?;
				for (i, item) in items.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
			NativeValue::Dictionary(map) => {
				write!(f, "{{")?;
				for (i, (key, value)) in map.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key:?}: {value}")?;
				}
				write!(f, "}}")
			}
			NativeValue::Null => write!(f, "null"),
			NativeValue::Data(bytes) => write!(f, "<{} bytes>", bytes.len()),
		}
	}
}

impl From<bool> for NativeValue {
	fn from(value: bool) -> Self {
		NativeValue::Bool(value)
	}
}

impl From<&str> for NativeValue {
	fn from(value: &str) -> Self {
		NativeValue::String(value.to_string())
	}
}

impl From<String> for NativeValue {
	fn from(value: String) -> Self {
		NativeValue::String(value)
	}
}

impl From<i32> for NativeValue {
	fn from(value: i32) -> Self {
		NativeValue::Number(Number::I32(value))
	}
}

impl From<i64> for NativeValue {
	fn from(value: i64) -> Self {
		NativeValue::Number(Number::I64(value))
	}
}

impl From<f64> for NativeValue {
	fn from(value: f64) -> Self {
		NativeValue::Number(Number::F64(value))
	}
}

impl From<DateTime<Utc>> for NativeValue {
	fn from(value: DateTime<Utc>) -> Self {
		NativeValue::Date(value)
	}
}
