// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

/// Name of the process-wide default store. Never accepted as a namespace.
pub const STANDARD_NAMESPACE: &str = "standard";

/// Maximum namespace length in bytes.
pub const MAX_NAMESPACE_LEN: usize = 128;

/// Validates a namespace name.
///
/// Valid names:
/// - 1-128 characters
/// - First character ASCII alphanumeric
/// - Remaining characters ASCII alphanumeric, `.`, `-` or `_`
/// - Not the reserved standard store name
pub fn validate_namespace(name: &str) -> bool {
	if name.is_empty() || name.len() > MAX_NAMESPACE_LEN {
		return false;
	}

	if name == STANDARD_NAMESPACE {
		return false;
	}

	let mut chars = name.chars();

	match chars.next() {
		Some(c) if c.is_ascii_alphanumeric() => {}
		_ => return false,
	}

	chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}
