//! Keys for the record, policy, billing and role stores.
//!
//! Policy and service identifiers share one fixed format:
//! - 1 to [`MAX_ID_LEN`] characters
//! - only ASCII letters, digits, `-`, `_` and `.`
//!
//! Role names are 1 to [`MAX_ROLE_LEN`] printable ASCII characters with no
//! spaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest accepted policy or service identifier.
pub const MAX_ID_LEN: usize = 64;

/// Longest accepted role name.
pub const MAX_ROLE_LEN: usize = 32;

fn validate_fixed_id(kind: &'static str, value: &str) -> Result<(), TypeError> {
    let reject = |reason: String| TypeError::InvalidIdentifier {
        kind,
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Err(reject("must not be empty".into()));
    }
    if value.len() > MAX_ID_LEN {
        return Err(reject(format!("longer than {MAX_ID_LEN} characters")));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(reject(format!("contains forbidden character: {bad:?}")));
    }
    Ok(())
}

/// Patient key for medical records, visit logs and emergency contacts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PatientId(pub u64);

impl From<u64> for PatientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for PatientId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TypeError::InvalidPatientId(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Insurance policy identifier, e.g. `TEST-POLICY-1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyId(String);

impl PolicyId {
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_fixed_id("policy id", &id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Billed-service identifier, e.g. `TEST-SERVICE-1`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceId(String);

impl ServiceId {
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate_fixed_id("service id", &id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Application-defined capability label granted to identities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    pub fn new(role: impl Into<String>) -> Result<Self, TypeError> {
        let role = role.into();
        let reject = |reason: &str| TypeError::InvalidRole {
            value: role.clone(),
            reason: reason.to_string(),
        };
        if role.is_empty() {
            return Err(reject("must not be empty"));
        }
        if role.len() > MAX_ROLE_LEN {
            return Err(reject("too long"));
        }
        if !role.chars().all(|c| c.is_ascii_graphic()) {
            return Err(reject("must be printable ASCII without spaces"));
        }
        Ok(Self(role))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Shared conversions for the string-backed identifiers.

impl FromStr for PolicyId {
    type Err = TypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PolicyId {
    type Error = TypeError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PolicyId> for String {
    fn from(id: PolicyId) -> Self {
        id.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ServiceId {
    type Err = TypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ServiceId {
    type Error = TypeError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceId> for String {
    fn from(id: ServiceId) -> Self {
        id.0
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoleName {
    type Err = TypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RoleName {
    type Error = TypeError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(role: RoleName) -> Self {
        role.0
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
