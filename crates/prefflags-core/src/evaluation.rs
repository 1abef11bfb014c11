// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Why a flag resolved to the value it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
	Static,
	Default,
	TargetingMatch,
	Split,
	/// Read directly from the store.
	Cached,
	Disabled,
	Unknown,
	Stale,
	Error,
}

impl Reason {
	pub fn as_str(&self) -> &'static str {
		match self {
			Reason::Static => "STATIC",
			Reason::Default => "DEFAULT",
			Reason::TargetingMatch => "TARGETING_MATCH",
			Reason::Split => "SPLIT",
			Reason::Cached => "CACHED",
			Reason::Disabled => "DISABLED",
			Reason::Unknown => "UNKNOWN",
			Reason::Stale => "STALE",
			Reason::Error => "ERROR",
		}
	}
}

impl fmt::Display for Reason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	ProviderNotReady,
	FlagNotFound,
	ParseError,
	TypeMismatch,
	TargetingKeyMissing,
	InvalidContext,
	General,
}

/// Resolution details for one flag evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult<T> {
	pub value: T,
	/// Human-readable description of the resolved value.
	pub variant: Option<String>,
	pub reason: Reason,
	/// Always `None` on a successful resolution.
	pub error_code: Option<ErrorCode>,
	pub error_message: Option<String>,
}

impl<T> EvaluationResult<T> {
	pub fn new(value: T, variant: impl Into<String>, reason: Reason) -> Self {
		Self {
			value,
			variant: Some(variant.into()),
			reason,
			error_code: None,
			error_message: None,
		}
	}

	/// Builds a result whose variant describes the value itself.
	pub fn described(value: T, reason: Reason) -> Self
	where
		T: Clone + Into<Value>,
	{
		let described: Value = value.clone().into();
		Self::new(value, described.to_string(), reason)
	}

	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EvaluationResult<U> {
		EvaluationResult {
			value: f(self.value),
			variant: self.variant,
			reason: self.reason,
			error_code: self.error_code,
			error_message: self.error_message,
		}
	}

	/// Rewraps a typed result as a [`Value`] result, keeping variant and reason.
	pub fn into_value_result(self) -> EvaluationResult<Value>
	where
		T: Into<Value>,
	{
		self.map(Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_described_uses_value_description() {
		let result = EvaluationResult::described(100i64, Reason::Cached);
		assert_eq!(result.value, 100);
		assert_eq!(result.variant.as_deref(), Some("100"));
		assert_eq!(result.reason, Reason::Cached);
		assert!(result.error_code.is_none());
		assert!(result.error_message.is_none());
	}

	#[test]
	fn test_into_value_result_keeps_metadata() {
		let result = EvaluationResult::new(true, "on", Reason::Default).into_value_result();
		assert_eq!(result.value, Value::Boolean(true));
		assert_eq!(result.variant.as_deref(), Some("on"));
		assert_eq!(result.reason, Reason::Default);
	}

	#[test]
	fn test_reason_serialization() {
		assert_eq!(serde_json::to_string(&Reason::Cached).unwrap(), r#""CACHED""#);
		assert_eq!(
			serde_json::to_string(&Reason::TargetingMatch).unwrap(),
			r#""TARGETING_MATCH""#
		);
		for reason in [Reason::Static, Reason::Default, Reason::Error, Reason::Stale] {
			let json = serde_json::to_string(&reason).unwrap();
			assert_eq!(json, format!("\"{}\"", reason.as_str()));
		}
	}

	#[test]
	fn test_result_serialization() {
		let result = EvaluationResult::described(Value::Integer(1), Reason::Cached);
		let json = serde_json::to_value(&result).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"value": 1,
				"variant": "1",
				"reason": "CACHED",
				"error_code": null,
				"error_message": null,
			})
		);
	}
}
