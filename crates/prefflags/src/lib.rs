// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature flag provider backed by local preference stores.
//!
//! [`PrefFlagsProvider`] resolves typed flag values from a key-value store
//! family and writes values computed from a targeting key back into it.
//!
//! # Features
//!
//! - **Typed evaluation**: boolean, string, integer, double, date, list,
//!   structure and a generic object kind that dispatches on what is stored
//! - **Namespaces**: a context selects a named store through
//!   [`NAMESPACE_CONTEXT_KEY`]
//! - **Setters**: compute a value from the targeting key and persist it
//! - **Events**: lifecycle and configuration changes go to an injected sink
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use prefflags::{FeatureProvider, MutableContext, NoOpEventSink, PrefFlagsProvider, Reason};
//! use prefflags_store::MemoryStoreProvider;
//!
//! let provider = PrefFlagsProvider::new(
//!     Arc::new(MemoryStoreProvider::new()),
//!     Arc::new(NoOpEventSink),
//! );
//! provider.initialize(None).unwrap();
//!
//! let ctx = MutableContext::new().with_targeting_key("user123");
//! provider
//!     .set_boolean_value("feature.new_flow", |user| user.ends_with("123"), Some(&ctx))
//!     .unwrap();
//!
//! let result = provider
//!     .get_boolean_evaluation("feature.new_flow", false, None)
//!     .unwrap();
//! assert!(result.value);
//! assert_eq!(result.reason, Reason::Cached);
//! ```

mod evaluate;
mod provider;
mod setter;

pub use provider::{PrefFlagsProvider, PROVIDER_NAME};

// Re-export core types for convenience
pub use prefflags_core::{
	ErrorCode, EvaluationContext, EvaluationResult, EventDetails, EventSink, FeatureProvider,
	MutableContext, NoOpEventSink, ProviderError, ProviderEvent, ProviderMetadata, ProviderStatus,
	Reason, RecordingEventSink, Result, SharedContext, SharedEventSink, TracingEventSink, Value,
	NAMESPACE_CONTEXT_KEY, NEW_CONTEXT_KEY, OLD_CONTEXT_KEY,
};
