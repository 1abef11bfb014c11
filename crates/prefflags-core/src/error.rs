// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::convert::ConversionError;
use crate::evaluation::ErrorCode;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors surfaced by flag evaluation and the setter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
	#[error("flag not found: {key}")]
	FlagNotFound { key: String },

	#[error("parse error: {0}")]
	Parse(String),

	#[error("type mismatch")]
	TypeMismatch,

	#[error("provider not ready")]
	ProviderNotReady,

	#[error("general error: {0}")]
	General(String),
}

impl ProviderError {
	pub fn flag_not_found(key: impl Into<String>) -> Self {
		Self::FlagNotFound { key: key.into() }
	}

	pub fn general(message: impl Into<String>) -> Self {
		Self::General(message.into())
	}

	/// The error code a resolution details record carries for this error.
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::FlagNotFound { .. } => ErrorCode::FlagNotFound,
			Self::Parse(_) => ErrorCode::ParseError,
			Self::TypeMismatch => ErrorCode::TypeMismatch,
			Self::ProviderNotReady => ErrorCode::ProviderNotReady,
			Self::General(_) => ErrorCode::General,
		}
	}
}

impl From<ConversionError> for ProviderError {
	fn from(err: ConversionError) -> Self {
		Self::Parse(err.detail)
	}
}
