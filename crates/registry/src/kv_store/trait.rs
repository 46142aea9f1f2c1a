use std::sync::Arc;

use thiserror::Error;

use ebol_core::ExpectedVersion;

/// A stored value together with its write version.
///
/// Versions start at 1 on first write and increase by 1 per overwrite;
/// version 0 means "key absent" in conditional-write expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub version: u64,
    pub bytes: Vec<u8>,
}

/// Key-value store operation error.
///
/// These are **infrastructure errors** (storage, concurrency) as opposed to
/// domain errors (validation, authorization).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conditional write failed: {0}")]
    Concurrency(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Ordered key-value substrate the registry persists records into.
///
/// The store is injected as an explicit dependency; durability, replication
/// and consistency are owned by the backing platform. Because the registry
/// issues read-modify-write sequences, `put` is an **atomic conditional
/// write**: implementations must check `expected` against the current
/// version and apply the write in one step, which keeps mutations
/// at-most-one-writer-per-key.
pub trait KeyValueStore: Send + Sync {
    /// Read one key. `None` when absent.
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError>;

    /// Conditional write. Returns the new version on success; fails with
    /// `Concurrency` when the current version does not match `expected`.
    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;

    /// Range scan in the store's native key ordering. Empty bounds mean an
    /// unbounded scan; the result is finite and the scan re-invocable.
    fn scan(&self, start: &str, end: &str) -> Result<Vec<(String, VersionedValue)>, StoreError>;
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        (**self).get(key)
    }

    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        (**self).put(key, bytes, expected)
    }

    fn scan(&self, start: &str, end: &str) -> Result<Vec<(String, VersionedValue)>, StoreError> {
        (**self).scan(start, end)
    }
}
