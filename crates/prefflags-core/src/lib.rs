// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for prefflags.
//!
//! This crate holds everything a flag provider and its callers share: the
//! tagged [`Value`], classification and conversion of store-native values,
//! evaluation results, errors, the evaluation context and the event sink.
//! The store-backed provider itself lives in the `prefflags` crate.
//!
//! # Example
//!
//! ```
//! use prefflags_core::{wrap_in_value, EvaluationResult, MutableContext, Reason, Value};
//! use prefflags_store::NativeValue;
//!
//! // Contexts name the store namespace to evaluate against
//! let ctx = MutableContext::new()
//!     .with_targeting_key("user123")
//!     .with_namespace("tenant-a");
//!
//! // Stored values convert to tagged values
//! let value = wrap_in_value(&NativeValue::from(100)).unwrap();
//! assert_eq!(value, Value::Integer(100));
//!
//! let result = EvaluationResult::described(100i64, Reason::Cached);
//! assert_eq!(result.variant.as_deref(), Some("100"));
//! ```

pub mod context;
pub mod convert;
pub mod detect;
pub mod error;
pub mod evaluation;
pub mod event;
pub mod provider;
pub mod value;

pub use context::{
	EvaluationContext, MutableContext, SharedContext, NAMESPACE_CONTEXT_KEY, NEW_CONTEXT_KEY,
	OLD_CONTEXT_KEY, TARGETING_KEY,
};
pub use convert::{wrap_array, wrap_in_value, wrap_structure, ConversionError};
pub use detect::{detect_type, DetectedType};
pub use error::{ProviderError, Result};
pub use evaluation::{ErrorCode, EvaluationResult, Reason};
pub use event::{
	EventDetails, EventSink, NoOpEventSink, ProviderEvent, RecordedEvent, RecordingEventSink,
	SharedEventSink, TracingEventSink,
};
pub use provider::{FeatureProvider, ProviderMetadata, ProviderStatus};
pub use value::{format_date, Value};
