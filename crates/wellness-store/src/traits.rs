use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::StoreResult;
use crate::key::{KeySpace, StoreKey};
use crate::txn::WriteBatch;

/// Read access to stored values.
///
/// Implemented by every backend and by [`Transaction`](crate::Transaction),
/// so ledger code reads the same way whether or not it is staging writes.
pub trait ReadView {
    /// Read the raw bytes stored at `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn get_raw(&self, key: &StoreKey) -> StoreResult<Option<Vec<u8>>>;

    /// Read and decode the value stored at `key`.
    fn load<T: DeserializeOwned>(&self, key: &StoreKey) -> StoreResult<Option<T>>
    where
        Self: Sized,
    {
        self.get_raw(key)?
            .map(|bytes| codec::decode(key, &bytes))
            .transpose()
    }

    /// Check whether a value is stored at `key`.
    fn contains(&self, key: &StoreKey) -> StoreResult<bool> {
        Ok(self.get_raw(key)?.is_some())
    }
}

/// Key-value store backend.
///
/// All implementations must satisfy these invariants:
/// - A [`WriteBatch`] is applied atomically: readers observe either none or
///   all of its operations.
/// - Operations within a batch are applied in order; a later write to the
///   same key wins.
/// - The store never interprets values.
/// - All failures are propagated, never silently ignored.
pub trait KeyValueStore: ReadView + Send + Sync {
    /// Apply every operation in `batch` as one atomic step.
    fn apply(&self, batch: WriteBatch) -> StoreResult<()>;

    /// All keys in `space`, in key order.
    fn keys(&self, space: KeySpace) -> StoreResult<Vec<StoreKey>>;

    /// Number of keys currently stored.
    fn len(&self) -> StoreResult<usize>;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}
