// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conversion from store-native values to [`Value`].
//!
//! Every conversion first classifies the value with [`detect_type`], then
//! extracts it as the native type that kind implies. Containers convert
//! element by element and stop at the first failure: a container either
//! converts completely or not at all.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use prefflags_store::{NativeValue, Number};
use thiserror::Error;

use crate::detect::{detect_type, DetectedType};
use crate::value::Value;

/// A stored value that cannot be read as the kind it was classified as.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct ConversionError {
	pub detail: String,
}

impl ConversionError {
	fn cannot_parse(value: &NativeValue, expected: DetectedType) -> Self {
		Self {
			detail: format!("cannot parse {value} as {}", expected.type_name()),
		}
	}

	fn unknown_type(value: &NativeValue) -> Self {
		Self {
			detail: format!("cannot detect type of {value}"),
		}
	}
}

/// Converts one stored value, recursing into containers.
pub fn wrap_in_value(native: &NativeValue) -> Result<Value, ConversionError> {
	let kind = detect_type(native);
	match kind {
		DetectedType::Boolean => extract_bool(native)
			.map(Value::Boolean)
			.ok_or_else(|| ConversionError::cannot_parse(native, kind)),
		DetectedType::String => extract_string(native)
			.map(Value::String)
			.ok_or_else(|| ConversionError::cannot_parse(native, kind)),
		DetectedType::Integer => extract_integer(native)
			.map(Value::Integer)
			.ok_or_else(|| ConversionError::cannot_parse(native, kind)),
		DetectedType::Double => extract_double(native)
			.map(Value::Double)
			.ok_or_else(|| ConversionError::cannot_parse(native, kind)),
		DetectedType::Date => extract_date(native)
			.map(Value::Date)
			.ok_or_else(|| ConversionError::cannot_parse(native, kind)),
		DetectedType::Array => match native {
			NativeValue::Array(items) => wrap_array(items).map(Value::List),
			_ => Err(ConversionError::cannot_parse(native, kind)),
		},
		DetectedType::Structure => match native {
			NativeValue::Dictionary(map) => wrap_structure(map).map(Value::Structure),
			_ => Err(ConversionError::cannot_parse(native, kind)),
		},
		DetectedType::Null => Ok(Value::Null),
		DetectedType::Unknown => Err(ConversionError::unknown_type(native)),
	}
}

/// Converts every element of a stored array.
pub fn wrap_array(items: &[NativeValue]) -> Result<Vec<Value>, ConversionError> {
	items.iter().map(wrap_in_value).collect()
}

/// Converts every entry of a stored dictionary.
pub fn wrap_structure(
	map: &BTreeMap<String, NativeValue>,
) -> Result<BTreeMap<String, Value>, ConversionError> {
	map
		.iter()
		.map(|(key, value)| wrap_in_value(value).map(|v| (key.clone(), v)))
		.collect()
}

fn extract_bool(native: &NativeValue) -> Option<bool> {
	match native {
		NativeValue::Bool(b) => Some(*b),
		_ => None,
	}
}

fn extract_string(native: &NativeValue) -> Option<String> {
	match native {
		NativeValue::String(s) => Some(s.clone()),
		_ => None,
	}
}

/// Fails for unsigned values beyond `i64::MAX`.
fn extract_integer(native: &NativeValue) -> Option<i64> {
	match native {
		NativeValue::Number(number) => match *number {
			Number::I8(n) => Some(i64::from(n)),
			Number::I16(n) => Some(i64::from(n)),
			Number::I32(n) => Some(i64::from(n)),
			Number::I64(n) => Some(n),
			Number::U64(n) => i64::try_from(n).ok(),
			Number::F32(_) | Number::F64(_) => None,
		},
		_ => None,
	}
}

fn extract_double(native: &NativeValue) -> Option<f64> {
	match native {
		NativeValue::Number(Number::F32(n)) => Some(f64::from(*n)),
		NativeValue::Number(Number::F64(n)) => Some(*n),
		_ => None,
	}
}

fn extract_date(native: &NativeValue) -> Option<DateTime<Utc>> {
	match native {
		NativeValue::Date(d) => Some(*d),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use proptest::prelude::*;

	fn date() -> DateTime<Utc> {
		Utc.timestamp_opt(1_000_000_000, 0).unwrap()
	}

	#[test]
	fn test_scalars() {
		assert_eq!(wrap_in_value(&NativeValue::Bool(true)), Ok(Value::Boolean(true)));
		assert_eq!(wrap_in_value(&NativeValue::from("s")), Ok(Value::from("s")));
		assert_eq!(
			wrap_in_value(&NativeValue::Number(Number::I8(-3))),
			Ok(Value::Integer(-3))
		);
		assert_eq!(
			wrap_in_value(&NativeValue::Number(Number::F32(0.5))),
			Ok(Value::Double(0.5))
		);
		assert_eq!(wrap_in_value(&NativeValue::Date(date())), Ok(Value::Date(date())));
		assert_eq!(wrap_in_value(&NativeValue::Null), Ok(Value::Null));
	}

	#[test]
	fn test_unsigned_out_of_range_fails() {
		let err = wrap_in_value(&NativeValue::Number(Number::U64(u64::MAX))).unwrap_err();
		assert_eq!(err.detail, "cannot parse 18446744073709551615 as Int64");
	}

	#[test]
	fn test_unknown_fails() {
		let err = wrap_in_value(&NativeValue::Data(vec![1, 2, 3])).unwrap_err();
		assert_eq!(err.detail, "cannot detect type of <3 bytes>");
	}

	#[test]
	fn test_nested_structure() {
		let mut inner = BTreeMap::new();
		inner.insert("falseKey".to_string(), NativeValue::Bool(false));

		let mut outer = BTreeMap::new();
		outer.insert(
			"mixedArrayKey".to_string(),
			NativeValue::Array(vec![
				NativeValue::Bool(true),
				NativeValue::from("string"),
				NativeValue::from(100),
				NativeValue::from(3.1415),
				NativeValue::Date(date()),
				NativeValue::Dictionary(inner),
			]),
		);

		let wrapped = wrap_structure(&outer).unwrap();

		let mut expected_inner = BTreeMap::new();
		expected_inner.insert("falseKey".to_string(), Value::Boolean(false));
		assert_eq!(
			wrapped["mixedArrayKey"],
			Value::List(vec![
				Value::Boolean(true),
				Value::from("string"),
				Value::Integer(100),
				Value::Double(3.1415),
				Value::Date(date()),
				Value::Structure(expected_inner),
			])
		);
	}

	#[test]
	fn test_malformed_leaf_fails_whole_structure() {
		let mut deepest = BTreeMap::new();
		deepest.insert("ok".to_string(), NativeValue::Bool(true));
		deepest.insert("blob".to_string(), NativeValue::Data(vec![0]));

		let mut outer = BTreeMap::new();
		outer.insert("fine".to_string(), NativeValue::from(1));
		outer.insert(
			"list".to_string(),
			NativeValue::Array(vec![NativeValue::Dictionary(deepest)]),
		);

		assert!(wrap_structure(&outer).is_err());
		assert!(wrap_in_value(&NativeValue::Dictionary(outer)).is_err());
	}

	#[test]
	fn test_first_failing_element_is_reported() {
		let items = vec![
			NativeValue::from(1),
			NativeValue::Number(Number::U64(u64::MAX)),
			NativeValue::Data(vec![]),
		];
		let err = wrap_array(&items).unwrap_err();
		assert!(err.detail.contains("Int64"));
	}

	fn arb_native() -> impl Strategy<Value = NativeValue> {
		let leaf = prop_oneof![
			any::<bool>().prop_map(NativeValue::Bool),
			"[a-z]{0,8}".prop_map(NativeValue::String),
			any::<i64>().prop_map(NativeValue::from),
			(-1.0e9f64..1.0e9).prop_map(NativeValue::from),
			Just(NativeValue::Null),
		];
		leaf.prop_recursive(4, 32, 4, |inner| {
			prop_oneof![
				prop::collection::vec(inner.clone(), 0..4).prop_map(NativeValue::Array),
				prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(NativeValue::Dictionary),
			]
		})
	}

	proptest! {
		#[test]
		fn scalar_integers_always_convert(n: i64) {
			prop_assert_eq!(wrap_in_value(&NativeValue::from(n)), Ok(Value::Integer(n)));
		}

		#[test]
		fn scalar_strings_always_convert(s in ".{0,20}") {
			prop_assert_eq!(
				wrap_in_value(&NativeValue::String(s.clone())),
				Ok(Value::String(s))
			);
		}

		/// Anything built from supported kinds converts, and converting the
		/// result back yields the same value.
		#[test]
		fn supported_trees_convert(native in arb_native()) {
			let value = wrap_in_value(&native).unwrap();
			prop_assert_eq!(NativeValue::from(&value), native);
		}

		/// One opaque leaf anywhere poisons the whole tree.
		#[test]
		fn opaque_leaf_poisons_tree(native in arb_native(), depth in 1usize..4) {
			let mut poisoned = NativeValue::Array(vec![native, NativeValue::Data(vec![1])]);
			for _ in 0..depth {
				let mut map = BTreeMap::new();
				map.insert("k".to_string(), poisoned);
				poisoned = NativeValue::Dictionary(map);
			}
			prop_assert!(wrap_in_value(&poisoned).is_err());
		}
	}
}
