use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::key::{KeySpace, StoreKey};
use crate::traits::{KeyValueStore, ReadView};
use crate::txn::{WriteBatch, WriteOp};

/// In-memory, BTreeMap-based key-value store.
///
/// Intended for tests and embedding. All values are held in memory behind a
/// `RwLock`; a batch is applied under a single write guard, so readers never
/// observe half of it.
pub struct InMemoryStore {
    entries: RwLock<BTreeMap<StoreKey, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Copy of every stored entry, in key order.
    pub fn snapshot(&self) -> StoreResult<BTreeMap<StoreKey, Vec<u8>>> {
        let map = self.read_guard()?;
        Ok(map.clone())
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        let map = self.read_guard()?;
        Ok(map.values().map(|v| v.len() as u64).sum())
    }

    fn read_guard(
        &self,
    ) -> StoreResult<std::sync::RwLockReadGuard<'_, BTreeMap<StoreKey, Vec<u8>>>> {
        self.entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadView for InMemoryStore {
    fn get_raw(&self, key: &StoreKey) -> StoreResult<Option<Vec<u8>>> {
        let map = self.read_guard()?;
        Ok(map.get(key).cloned())
    }
}

impl KeyValueStore for InMemoryStore {
    fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut map = self
            .entries
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    map.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn keys(&self, space: KeySpace) -> StoreResult<Vec<StoreKey>> {
        let map = self.read_guard()?;
        Ok(map.keys().filter(|k| k.space() == space).cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.read_guard()?.len())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryStore")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use wellness_types::{Identity, PatientId, ServiceId};

    fn put(store: &InMemoryStore, key: StoreKey, value: &str) {
        let mut batch = WriteBatch::new();
        batch.put(key.clone(), codec::encode(&key, value).unwrap());
        store.apply(batch).unwrap();
    }

    fn bill(id: &str) -> StoreKey {
        StoreKey::Bill(ServiceId::new(id).unwrap())
    }

    // -----------------------------------------------------------------------
    // Core reads and writes
    // -----------------------------------------------------------------------

    #[test]
    fn write_and_read_back() {
        let store = InMemoryStore::new();
        let key = StoreKey::MedicalRecord(PatientId(1));
        put(&store, key.clone(), "Test medical record");

        let value: Option<String> = store.load(&key).unwrap();
        assert_eq!(value.as_deref(), Some("Test medical record"));
    }

    #[test]
    fn read_missing_returns_none() {
        let store = InMemoryStore::new();
        assert!(store.get_raw(&StoreKey::Genesis).unwrap().is_none());
        assert!(!store.contains(&StoreKey::Genesis).unwrap());
    }

    #[test]
    fn overwrite_replaces_value() {
        let store = InMemoryStore::new();
        let key = StoreKey::MedicalRecord(PatientId(1));
        put(&store, key.clone(), "A");
        put(&store, key.clone(), "B");
        assert_eq!(store.load::<String>(&key).unwrap().as_deref(), Some("B"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn delete_removes_value() {
        let store = InMemoryStore::new();
        put(&store, bill("s1"), "x");
        let mut batch = WriteBatch::new();
        batch.delete(bill("s1"));
        store.apply(batch).unwrap();
        assert!(store.is_empty().unwrap());
    }

    // -----------------------------------------------------------------------
    // Batches
    // -----------------------------------------------------------------------

    #[test]
    fn batch_ops_apply_in_order() {
        let store = InMemoryStore::new();
        let key = bill("s1");
        let mut batch = WriteBatch::new();
        batch.put(key.clone(), codec::encode(&key, "first").unwrap());
        batch.delete(key.clone());
        batch.put(key.clone(), codec::encode(&key, "last").unwrap());
        store.apply(batch).unwrap();
        assert_eq!(store.load::<String>(&key).unwrap().as_deref(), Some("last"));
    }

    // -----------------------------------------------------------------------
    // Keyspace queries
    // -----------------------------------------------------------------------

    #[test]
    fn keys_filters_by_space() {
        let store = InMemoryStore::new();
        put(&store, bill("b"), "1");
        put(&store, bill("a"), "2");
        put(&store, StoreKey::MedicalRecord(PatientId(5)), "r");
        put(&store, StoreKey::Admin(Identity::new("deployer").unwrap()), "");

        let bills = store.keys(KeySpace::Bill).unwrap();
        assert_eq!(bills, vec![bill("a"), bill("b")]);
        assert_eq!(store.keys(KeySpace::Admin).unwrap().len(), 1);
        assert!(store.keys(KeySpace::Policy).unwrap().is_empty());
    }

    #[test]
    fn snapshot_and_total_bytes() {
        let store = InMemoryStore::new();
        put(&store, bill("a"), "12345");
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.len(), 1);
        // bincode strings carry an 8-byte length prefix.
        assert_eq!(store.total_bytes().unwrap(), 8 + 5);
    }

    // -----------------------------------------------------------------------
    // Concurrent read safety
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryStore::new());
        let key = StoreKey::MedicalRecord(PatientId(1));
        put(&store, key.clone(), "shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let key = key.clone();
                thread::spawn(move || {
                    let value: Option<String> = store.load(&key).unwrap();
                    assert_eq!(value.as_deref(), Some("shared"));
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryStore::default();
        put(&store, bill("a"), "x");
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryStore"));
        assert!(debug.contains("entry_count"));
    }
}
