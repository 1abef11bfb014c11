// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store backend configuration section.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where flag values live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
	/// Volatile, gone when the process exits.
	Memory,
	/// One JSON file per namespace under the data directory.
	#[default]
	File,
}

impl fmt::Display for StoreBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StoreBackend::Memory => write!(f, "memory"),
			StoreBackend::File => write!(f, "file"),
		}
	}
}

impl FromStr for StoreBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"memory" => Ok(StoreBackend::Memory),
			"file" => Ok(StoreBackend::File),
			other => Err(format!("unknown store backend '{other}'")),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfigLayer {
	#[serde(default)]
	pub backend: Option<StoreBackend>,
	#[serde(default)]
	pub data_dir: Option<PathBuf>,
	#[serde(default)]
	pub namespace: Option<String>,
}

impl StoreConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.data_dir.is_some() {
			self.data_dir = other.data_dir;
		}
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
	}

	/// Resolves the data directory, defaulting to `$XDG_DATA_HOME/prefflags`.
	///
	/// Only the file backend needs one.
	pub fn finalize(self) -> Result<StoreConfig, ConfigError> {
		let backend = self.backend.unwrap_or_default();
		let data_dir = match self.data_dir {
			Some(dir) => dir,
			None => match default_data_dir() {
				Some(dir) => dir,
				None if backend == StoreBackend::Memory => PathBuf::new(),
				None => return Err(ConfigError::DataDirNotFound),
			},
		};

		Ok(StoreConfig {
			backend,
			data_dir,
			namespace: self.namespace.filter(|ns| !ns.is_empty()),
		})
	}
}

fn default_data_dir() -> Option<PathBuf> {
	dirs::data_dir().map(|dir| dir.join("prefflags"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
	pub backend: StoreBackend,
	pub data_dir: PathBuf,
	/// Namespace the provider's initial context selects.
	pub namespace: Option<String>,
}
