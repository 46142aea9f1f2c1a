//! Key-value store boundary.
//!
//! This module defines the infrastructure-facing abstraction the registry
//! persists records into, without making any storage assumptions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryKvStore;
pub use r#trait::{KeyValueStore, StoreError, VersionedValue};
