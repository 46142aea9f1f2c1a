use std::collections::BTreeMap;
use std::sync::RwLock;

use ebol_core::ExpectedVersion;

use super::r#trait::{KeyValueStore, StoreError, VersionedValue};

/// In-memory ordered key-value store.
///
/// Intended for tests/dev. Keys iterate in lexicographic order, matching
/// the native key ordering contract of the production substrate.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    inner: RwLock<BTreeMap<String, VersionedValue>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        let current = map.get(key).map(|v| v.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "key '{key}': expected {expected:?}, found {current}"
            )));
        }

        let next = current + 1;
        map.insert(
            key.to_string(),
            VersionedValue {
                version: next,
                bytes,
            },
        );
        Ok(next)
    }

    fn scan(&self, start: &str, end: &str) -> Result<Vec<(String, VersionedValue)>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;

        Ok(map
            .iter()
            .filter(|(key, _)| {
                (start.is_empty() || key.as_str() >= start)
                    && (end.is_empty() || key.as_str() < end)
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
