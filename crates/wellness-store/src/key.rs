use std::fmt;

use serde::{Deserialize, Serialize};
use wellness_types::{Identity, PatientId, PolicyId, RoleName, ServiceId};

/// The partition of the keyspace a [`StoreKey`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeySpace {
    Admin,
    RoleGrant,
    MedicalRecord,
    Visits,
    EmergencyContact,
    Policy,
    Bill,
    Meta,
}

/// Typed key for every value the ledger stores.
///
/// Ordering follows declaration order of the variants, then the embedded
/// identifiers, so all keys of one [`KeySpace`] are contiguous.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StoreKey {
    /// Membership marker in the administrator set.
    Admin(Identity),
    /// Presence marker for a (identity, role) grant.
    RoleGrant(Identity, RoleName),
    /// Free-form medical record text for a patient.
    MedicalRecord(PatientId),
    /// Ordered visit log for a patient.
    Visits(PatientId),
    /// Emergency contact for a patient.
    EmergencyContact(PatientId),
    /// Insurance policy terms.
    Policy(PolicyId),
    /// Service bill.
    Bill(ServiceId),
    /// Ledger-wide logical sequence counter.
    Sequence,
    /// Set once genesis bootstrap has run.
    Genesis,
}

impl StoreKey {
    /// The keyspace partition this key lives in.
    pub fn space(&self) -> KeySpace {
        match self {
            Self::Admin(_) => KeySpace::Admin,
            Self::RoleGrant(..) => KeySpace::RoleGrant,
            Self::MedicalRecord(_) => KeySpace::MedicalRecord,
            Self::Visits(_) => KeySpace::Visits,
            Self::EmergencyContact(_) => KeySpace::EmergencyContact,
            Self::Policy(_) => KeySpace::Policy,
            Self::Bill(_) => KeySpace::Bill,
            Self::Sequence | Self::Genesis => KeySpace::Meta,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin(id) => write!(f, "admin/{id}"),
            Self::RoleGrant(id, role) => write!(f, "role/{id}/{role}"),
            Self::MedicalRecord(p) => write!(f, "record/{p}"),
            Self::Visits(p) => write!(f, "visits/{p}"),
            Self::EmergencyContact(p) => write!(f, "contact/{p}"),
            Self::Policy(p) => write!(f, "policy/{p}"),
            Self::Bill(s) => write!(f, "bill/{s}"),
            Self::Sequence => f.write_str("meta/sequence"),
            Self::Genesis => f.write_str("meta/genesis"),
        }
    }
}
