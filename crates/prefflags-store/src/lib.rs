// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local key-value preference stores for prefflags.
//!
//! A store holds [`NativeValue`]s under string keys. Stores come in families
//! ([`StoreProvider`]): one process-wide standard store plus any number of
//! named namespaces. Two families ship here:
//!
//! - [`MemoryStoreProvider`]: volatile, for tests and embedding
//! - [`FileStoreProvider`]: one JSON document per namespace under a data
//!   directory
//!
//! Each store layers persisted values over a volatile registration domain
//! ([`Store::register_defaults`]), and offers best-effort scalar accessors
//! that never fail: a missing or mismatched value reads as `false`, `0` or
//! `0.0`.

pub mod error;
pub mod file;
pub mod memory;
pub mod namespace;
pub mod native;
pub mod store;

pub use error::{Result, StoreError};
pub use file::{FileStore, FileStoreProvider};
pub use memory::{MemoryStore, MemoryStoreProvider};
pub use namespace::{validate_namespace, MAX_NAMESPACE_LEN, STANDARD_NAMESPACE};
pub use native::{NativeValue, Number};
pub use store::{SharedStore, SharedStoreProvider, Store, StoreProvider};
