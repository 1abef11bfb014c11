// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Classification of store-native values.

use prefflags_store::{NativeValue, Number};

/// The semantic kind of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectedType {
	Boolean,
	String,
	Integer,
	Double,
	Date,
	Array,
	Structure,
	Null,
	/// The store holds something no flag kind can represent.
	Unknown,
}

impl DetectedType {
	/// Name used in conversion error messages.
	pub fn type_name(&self) -> &'static str {
		match self {
			DetectedType::Boolean => "Bool",
			DetectedType::String => "String",
			DetectedType::Integer => "Int64",
			DetectedType::Double => "Double",
			DetectedType::Date => "Date",
			DetectedType::Array => "Array",
			DetectedType::Structure => "Structure",
			DetectedType::Null => "Null",
			DetectedType::Unknown => "Unknown",
		}
	}
}

/// Classifies a stored value. Never fails; anything unrecognized is
/// [`DetectedType::Unknown`].
///
/// Integer and floating-point subtypes must stay apart: reading a double
/// through the integer path truncates it.
pub fn detect_type(value: &NativeValue) -> DetectedType {
	match value {
		NativeValue::Bool(_) => DetectedType::Boolean,
		NativeValue::String(_) => DetectedType::String,
		NativeValue::Number(number) => match number {
			Number::I8(_) | Number::I16(_) | Number::I32(_) | Number::I64(_) | Number::U64(_) => {
				DetectedType::Integer
			}
			Number::F32(_) | Number::F64(_) => DetectedType::Double,
		},
		NativeValue::Date(_) => DetectedType::Date,
		NativeValue::Array(_) => DetectedType::Array,
		NativeValue::Dictionary(_) => DetectedType::Structure,
		NativeValue::Null => DetectedType::Null,
		NativeValue::Data(_) => DetectedType::Unknown,
	}
}
