use std::fmt;

use serde::{Deserialize, Serialize};
use wellness_store::StoreError;
use wellness_types::{Amount, Identity, PatientId, PolicyId, ServiceId, TypeError};

/// A keyed entity that a lookup can fail to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resource {
    MedicalRecord(PatientId),
    Policy(PolicyId),
    Bill(ServiceId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MedicalRecord(p) => write!(f, "medical record {p}"),
            Self::Policy(p) => write!(f, "policy {p}"),
            Self::Bill(s) => write!(f, "bill {s}"),
        }
    }
}

/// Errors produced by ledger entry points.
///
/// A call that returns any of these leaves the store exactly as it found it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: Identity,
        action: &'static str,
    },

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("amount mismatch for bill {service}: billed {billed}, offered {offered}")]
    AmountMismatch {
        service: ServiceId,
        billed: Amount,
        offered: Amount,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    InvalidArgument,
    AmountMismatch,
    Config,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not-found",
            Self::InvalidArgument => "invalid-argument",
            Self::AmountMismatch => "amount-mismatch",
            Self::Config => "config",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            Self::Config(_) => ErrorKind::Config,
            Self::Store(_) => ErrorKind::Storage,
        }
    }

    /// Create an invalid-argument error from any message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<TypeError> for LedgerError {
    fn from(err: TypeError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
