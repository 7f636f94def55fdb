use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::codec;
use crate::error::StoreResult;
use crate::key::StoreKey;
use crate::traits::{KeyValueStore, ReadView};

/// A single mutation inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put { key: StoreKey, value: Vec<u8> },
    Delete { key: StoreKey },
}

impl WriteOp {
    pub fn key(&self) -> &StoreKey {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }
}

/// Ordered list of mutations applied atomically by a backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: StoreKey, value: Vec<u8>) {
        self.ops.push(WriteOp::Put { key, value });
    }

    pub fn delete(&mut self, key: StoreKey) {
        self.ops.push(WriteOp::Delete { key });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Staged writes over a backend.
///
/// Reads consult the staged writes first and fall through to the backend.
/// Nothing reaches the backend until [`Transaction::commit`]; dropping the
/// transaction discards everything staged.
pub struct Transaction<'s, S: KeyValueStore> {
    store: &'s S,
    // `None` marks a staged delete.
    pending: BTreeMap<StoreKey, Option<Vec<u8>>>,
}

impl<'s, S: KeyValueStore> Transaction<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            pending: BTreeMap::new(),
        }
    }

    /// Stage an encoded value at `key`.
    pub fn put<T: Serialize + ?Sized>(&mut self, key: StoreKey, value: &T) -> StoreResult<()> {
        let bytes = codec::encode(&key, value)?;
        self.pending.insert(key, Some(bytes));
        Ok(())
    }

    /// Stage removal of `key`.
    pub fn delete(&mut self, key: StoreKey) {
        self.pending.insert(key, None);
    }

    /// Number of distinct keys with staged writes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Convert the staged writes into a batch without applying it.
    pub fn into_batch(self) -> WriteBatch {
        let mut batch = WriteBatch::new();
        for (key, value) in self.pending {
            match value {
                Some(bytes) => batch.put(key, bytes),
                None => batch.delete(key),
            }
        }
        batch
    }

    /// Apply the staged writes to the backend as one batch.
    ///
    /// Returns the number of operations applied.
    pub fn commit(self) -> StoreResult<usize> {
        let store = self.store;
        let batch = self.into_batch();
        let count = batch.len();
        if count > 0 {
            store.apply(batch)?;
        }
        debug!(ops = count, "transaction committed");
        Ok(count)
    }
}

impl<S: KeyValueStore> ReadView for Transaction<'_, S> {
    fn get_raw(&self, key: &StoreKey) -> StoreResult<Option<Vec<u8>>> {
        match self.pending.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.store.get_raw(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use wellness_types::{Identity, PatientId};

    fn record(n: u64) -> StoreKey {
        StoreKey::MedicalRecord(PatientId(n))
    }

    #[test]
    fn reads_see_staged_writes() {
        let store = InMemoryStore::new();
        let mut txn = Transaction::new(&store);
        txn.put(record(1), "staged").unwrap();

        let seen: Option<String> = txn.load(&record(1)).unwrap();
        assert_eq!(seen.as_deref(), Some("staged"));
        // Backend untouched until commit.
        assert!(!store.contains(&record(1)).unwrap());
    }

    #[test]
    fn commit_applies_all_writes() {
        let store = InMemoryStore::new();
        let mut txn = Transaction::new(&store);
        txn.put(record(1), "a").unwrap();
        txn.put(record(2), "b").unwrap();
        assert_eq!(txn.commit().unwrap(), 2);

        assert_eq!(store.load::<String>(&record(1)).unwrap().as_deref(), Some("a"));
        assert_eq!(store.load::<String>(&record(2)).unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn drop_discards_writes() {
        let store = InMemoryStore::new();
        {
            let mut txn = Transaction::new(&store);
            txn.put(record(1), "never").unwrap();
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn staged_delete_hides_backend_value() {
        let store = InMemoryStore::new();
        let mut seed = Transaction::new(&store);
        seed.put(record(1), "old").unwrap();
        seed.commit().unwrap();

        let mut txn = Transaction::new(&store);
        txn.delete(record(1));
        assert!(!txn.contains(&record(1)).unwrap());
        txn.commit().unwrap();
        assert!(!store.contains(&record(1)).unwrap());
    }

    #[test]
    fn last_staged_write_wins() {
        let store = InMemoryStore::new();
        let mut txn = Transaction::new(&store);
        txn.put(record(1), "first").unwrap();
        txn.put(record(1), "second").unwrap();
        assert_eq!(txn.pending_len(), 1);
        txn.commit().unwrap();
        assert_eq!(
            store.load::<String>(&record(1)).unwrap().as_deref(),
            Some("second")
        );
    }

    #[test]
    fn empty_commit_is_a_noop() {
        let store = InMemoryStore::new();
        let txn = Transaction::new(&store);
        assert_eq!(txn.commit().unwrap(), 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn into_batch_orders_by_key() {
        let store = InMemoryStore::new();
        let admin = StoreKey::Admin(Identity::new("deployer").unwrap());
        let mut txn = Transaction::new(&store);
        txn.put(record(9), "r").unwrap();
        txn.put(admin.clone(), &true).unwrap();
        let batch = txn.into_batch();
        let keys: Vec<&StoreKey> = batch.ops().iter().map(WriteOp::key).collect();
        assert_eq!(keys, vec![&admin, &record(9)]);
    }
}
