// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registered flag defaults.
//!
//! The `[defaults]` table holds flag values registered into the standard
//! store at startup. They are visible until a value is stored under the
//! same key and are never written to disk.
//!
//! ```toml
//! [defaults]
//! "feature.new_flow" = true
//! "checkout.limit" = 100
//! "launch" = 2024-06-01T09:00:00Z
//! "layout" = { columns = 3, tags = ["a", "b"] }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use prefflags_store::NativeValue;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultsConfigLayer {
	pub values: BTreeMap<String, toml::Value>,
}

impl DefaultsConfigLayer {
	/// Later layers win per key.
	pub fn merge(&mut self, other: Self) {
		self.values.extend(other.values);
	}

	pub fn finalize(self) -> Result<DefaultsConfig, ConfigError> {
		let values = self
			.values
			.into_iter()
			.map(|(key, value)| {
				let native = to_native(&key, &value)?;
				Ok((key, native))
			})
			.collect::<Result<_, ConfigError>>()?;
		Ok(DefaultsConfig { values })
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsConfig {
	pub values: BTreeMap<String, NativeValue>,
}

impl DefaultsConfig {
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

fn to_native(key: &str, value: &toml::Value) -> Result<NativeValue, ConfigError> {
	Ok(match value {
		toml::Value::String(s) => NativeValue::String(s.clone()),
		toml::Value::Integer(n) => NativeValue::from(*n),
		toml::Value::Float(n) => NativeValue::from(*n),
		toml::Value::Boolean(b) => NativeValue::Bool(*b),
		toml::Value::Datetime(dt) => NativeValue::Date(to_date(key, dt)?),
		toml::Value::Array(items) => NativeValue::Array(
			items
				.iter()
				.map(|item| to_native(key, item))
				.collect::<Result<_, _>>()?,
		),
		toml::Value::Table(table) => NativeValue::Dictionary(
			table
				.iter()
				.map(|(k, v)| Ok((k.clone(), to_native(key, v)?)))
				.collect::<Result<_, ConfigError>>()?,
		),
	})
}

/// Offset-less datetimes and bare dates are taken as UTC.
fn to_date(key: &str, dt: &toml::value::Datetime) -> Result<DateTime<Utc>, ConfigError> {
	let text = dt.to_string();

	if let Ok(date) = DateTime::parse_from_rfc3339(&text) {
		return Ok(date.with_timezone(&Utc));
	}
	if let Ok(naive) = NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f") {
		return Ok(Utc.from_utc_datetime(&naive));
	}
	if let Some(naive) = NaiveDate::parse_from_str(&text, "%Y-%m-%d")
		.ok()
		.and_then(|d| d.and_hms_opt(0, 0, 0))
	{
		return Ok(Utc.from_utc_datetime(&naive));
	}

	Err(ConfigError::invalid_value(
		format!("defaults.{key}"),
		format!("'{text}' is not a date"),
	))
}
