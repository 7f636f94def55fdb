use thiserror::Error;

/// Errors produced when constructing identity or identifier types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identity {value:?}: {reason}")]
    InvalidIdentity { value: String, reason: String },

    #[error("invalid {kind} {value:?}: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid role name {value:?}: {reason}")]
    InvalidRole { value: String, reason: String },

    #[error("invalid patient id: {0}")]
    InvalidPatientId(String),
}
