//! Foundation types for the Wellness Ledger.
//!
//! This crate provides the identity and identifier types shared by every
//! other Wellness crate. All of them validate on construction, so a value of
//! one of these types is always well-formed.
//!
//! # Key Types
//!
//! - [`Identity`]: Opaque, pre-authenticated caller token
//! - [`PatientId`]: Numeric key for medical records, visits and contacts
//! - [`PolicyId`]: Fixed-format insurance policy identifier
//! - [`ServiceId`]: Fixed-format billed-service identifier
//! - [`RoleName`]: Application-defined capability label (e.g. `"doctor"`)
//! - [`Amount`]: Unsigned monetary quantity

pub mod error;
pub mod identity;
pub mod ids;

pub use error::TypeError;
pub use identity::Identity;
pub use ids::{PatientId, PolicyId, RoleName, ServiceId};

/// Unsigned monetary quantity (bill amounts, coverage, premiums, claims).
pub type Amount = u128;
