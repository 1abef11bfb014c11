// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider event emission.
//!
//! The provider reports lifecycle and configuration events to an injected
//! [`EventSink`]. Hosts that want process-wide delivery share one sink
//! between providers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ProviderError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderEvent {
	Ready,
	Stale,
	Error,
	ConfigurationChanged,
}

impl ProviderEvent {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProviderEvent::Ready => "ready",
			ProviderEvent::Stale => "stale",
			ProviderEvent::Error => "error",
			ProviderEvent::ConfigurationChanged => "configuration_changed",
		}
	}
}

impl fmt::Display for ProviderEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Payload attached to an event, keyed by flag name or context key.
pub type EventDetails = BTreeMap<String, Value>;

/// Receives provider events.
///
/// Called synchronously from the emitting operation; implementations
/// should return promptly.
pub trait EventSink: Send + Sync {
	fn emit(
		&self,
		provider: &str,
		event: ProviderEvent,
		error: Option<&ProviderError>,
		details: Option<&EventDetails>,
	);
}

pub type SharedEventSink = Arc<dyn EventSink>;

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
	fn emit(
		&self,
		_provider: &str,
		_event: ProviderEvent,
		_error: Option<&ProviderError>,
		_details: Option<&EventDetails>,
	) {
	}
}

/// Reports events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
	fn emit(
		&self,
		provider: &str,
		event: ProviderEvent,
		err: Option<&ProviderError>,
		details: Option<&EventDetails>,
	) {
		let keys = details
			.map(|d| d.keys().cloned().collect::<Vec<_>>().join(","))
			.unwrap_or_default();

		match (event, err) {
			(_, Some(err)) => error!(provider = %provider, event = %event, error = %err, "provider event"),
			(ProviderEvent::Error, None) => error!(provider = %provider, event = %event, "provider event"),
			(ProviderEvent::Stale, None) => warn!(provider = %provider, event = %event, "provider event"),
			_ => info!(provider = %provider, event = %event, keys = %keys, "provider event"),
		}
	}
}

/// One event captured by [`RecordingEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
	pub provider: String,
	pub event: ProviderEvent,
	pub error: Option<ProviderError>,
	pub details: Option<EventDetails>,
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
	events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingEventSink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<RecordedEvent> {
		self.events.lock().clone()
	}

	/// Returns the captured events and clears the buffer.
	pub fn take(&self) -> Vec<RecordedEvent> {
		std::mem::take(&mut *self.events.lock())
	}

	pub fn kinds(&self) -> Vec<ProviderEvent> {
		self.events.lock().iter().map(|e| e.event).collect()
	}
}

impl EventSink for RecordingEventSink {
	fn emit(
		&self,
		provider: &str,
		event: ProviderEvent,
		error: Option<&ProviderError>,
		details: Option<&EventDetails>,
	) {
		self.events.lock().push(RecordedEvent {
			provider: provider.to_string(),
			event,
			error: error.cloned(),
			details: details.cloned(),
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_recording_sink_keeps_order() {
		let sink = RecordingEventSink::new();
		sink.emit("p", ProviderEvent::Ready, None, None);

		let mut details = EventDetails::new();
		details.insert("flag".to_string(), Value::Boolean(true));
		sink.emit("p", ProviderEvent::ConfigurationChanged, None, Some(&details));

		let events = sink.events();
		assert_eq!(events.len(), 2);
		assert_eq!(events[0].event, ProviderEvent::Ready);
		assert_eq!(events[1].details.as_ref().unwrap()["flag"], Value::Boolean(true));
		assert_eq!(events[1].provider, "p");
	}

	#[test]
	fn test_recording_sink_take_clears() {
		let sink = RecordingEventSink::new();
		sink.emit(
			"p",
			ProviderEvent::Error,
			Some(&ProviderError::general("boom")),
			None,
		);

		let taken = sink.take();
		assert_eq!(taken.len(), 1);
		assert_eq!(taken[0].error, Some(ProviderError::general("boom")));
		assert!(sink.events().is_empty());
	}

	#[test]
	fn test_shared_sinks_accept_events() {
		let sinks: Vec<SharedEventSink> = vec![
			Arc::new(NoOpEventSink),
			Arc::new(TracingEventSink),
			Arc::new(RecordingEventSink::new()),
		];
		for sink in &sinks {
			sink.emit("p", ProviderEvent::Stale, None, None);
		}
	}

	#[test]
	fn test_event_names() {
		assert_eq!(ProviderEvent::ConfigurationChanged.to_string(), "configuration_changed");
		assert_eq!(
			serde_json::to_string(&ProviderEvent::Ready).unwrap(),
			r#""ready""#
		);
	}
}
