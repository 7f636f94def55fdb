/// Errors from key-value store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A value could not be encoded for storage.
    #[error("failed to encode value for {key}: {reason}")]
    Encode { key: String, reason: String },

    /// A stored value could not be decoded into the requested type.
    #[error("corrupt value at {key}: {reason}")]
    Decode { key: String, reason: String },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
