//! Bincode encoding of stored values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;

/// Encode a value destined for `key`.
pub fn encode<T: Serialize + ?Sized>(key: &StoreKey, value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Decode the bytes stored at `key`.
pub fn decode<T: DeserializeOwned>(key: &StoreKey, bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
