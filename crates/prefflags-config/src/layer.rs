// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration as read from one source.

use serde::{Deserialize, Serialize};

use crate::sections::{DefaultsConfigLayer, LoggingConfigLayer, StoreConfigLayer};

/// Every field is optional; layers merge so that the later one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefFlagsConfigLayer {
	#[serde(default)]
	pub store: Option<StoreConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub defaults: Option<DefaultsConfigLayer>,
}

impl PrefFlagsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if let Some(other_store) = other.store {
			self
				.store
				.get_or_insert_with(Default::default)
				.merge(other_store);
		}
		if let Some(other_logging) = other.logging {
			self
				.logging
				.get_or_insert_with(Default::default)
				.merge(other_logging);
		}
		if let Some(other_defaults) = other.defaults {
			self
				.defaults
				.get_or_insert_with(Default::default)
				.merge(other_defaults);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_deserialize_full() {
		let toml_str = r#"
[store]
backend = "file"
data_dir = "/srv/flags"

[logging]
level = "debug"

[defaults]
"feature.new_flow" = true
"#;
		let layer: PrefFlagsConfigLayer = toml::from_str(toml_str).unwrap();
		assert!(layer.store.is_some());
		assert_eq!(layer.logging.unwrap().level.as_deref(), Some("debug"));
		assert!(layer.defaults.unwrap().values.contains_key("feature.new_flow"));
	}

	#[test]
	fn test_deserialize_empty() {
		let layer: PrefFlagsConfigLayer = toml::from_str("").unwrap();
		assert!(layer.store.is_none());
		assert!(layer.logging.is_none());
		assert!(layer.defaults.is_none());
	}

	#[test]
	fn test_merge_keeps_unset_sections() {
		let mut base: PrefFlagsConfigLayer = toml::from_str("[logging]\nlevel = \"warn\"").unwrap();
		base.merge(toml::from_str("[store]\nnamespace = \"tenant\"").unwrap());

		assert_eq!(base.logging.unwrap().level.as_deref(), Some("warn"));
		assert_eq!(base.store.unwrap().namespace.as_deref(), Some("tenant"));
	}
}
