// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The host-facing provider contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{EvaluationContext, SharedContext};
use crate::error::Result;
use crate::evaluation::EvaluationResult;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
	pub name: String,
}

impl ProviderMetadata {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

/// Provider lifecycle state.
///
/// `NotReady` until the first `initialize`. `Stale` is part of the host
/// contract but never entered by a store-backed provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
	#[default]
	NotReady,
	Ready,
	Stale,
	Error,
}

impl fmt::Display for ProviderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ProviderStatus::NotReady => "not_ready",
			ProviderStatus::Ready => "ready",
			ProviderStatus::Stale => "stale",
			ProviderStatus::Error => "error",
		};
		f.write_str(s)
	}
}

/// A source of flag evaluations.
///
/// Every evaluation takes an optional per-call context; when absent the
/// provider falls back to the context it was initialized with.
pub trait FeatureProvider: Send + Sync {
	fn metadata(&self) -> ProviderMetadata;

	fn status(&self) -> ProviderStatus;

	fn initialize(&self, context: Option<SharedContext>) -> Result<()>;

	/// Replaces the provider's context wholesale.
	fn on_context_set(&self, old: Option<SharedContext>, new: SharedContext) -> Result<()>;

	fn get_boolean_evaluation(
		&self,
		key: &str,
		default: bool,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<bool>>;

	fn get_string_evaluation(
		&self,
		key: &str,
		default: String,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<String>>;

	fn get_integer_evaluation(
		&self,
		key: &str,
		default: i64,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<i64>>;

	fn get_double_evaluation(
		&self,
		key: &str,
		default: f64,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<f64>>;

	fn get_object_evaluation(
		&self,
		key: &str,
		default: Value,
		context: Option<&dyn EvaluationContext>,
	) -> Result<EvaluationResult<Value>>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_defaults_to_not_ready() {
		assert_eq!(ProviderStatus::default(), ProviderStatus::NotReady);
		assert_eq!(ProviderStatus::NotReady.to_string(), "not_ready");
	}

	#[test]
	fn test_metadata() {
		let metadata = ProviderMetadata::new("PrefFlagsProvider");
		assert_eq!(metadata.name, "PrefFlagsProvider");
	}
}
