use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest principal accepted as an identity.
pub const MAX_IDENTITY_LEN: usize = 128;

/// Opaque token for an authenticated caller.
///
/// The hosting environment authenticates callers and hands the ledger an
/// already-verified principal (for example a Stacks address such as
/// `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM`). The ledger never looks
/// inside it: identities are only compared and ordered.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity {
    principal: String,
}

impl Identity {
    /// Wrap a principal, validating its shape.
    ///
    /// A principal must be non-empty, at most [`MAX_IDENTITY_LEN`]
    /// characters, and free of whitespace and control characters.
    pub fn new(principal: impl Into<String>) -> Result<Self, TypeError> {
        let principal = principal.into();
        let reject = |reason: &str| TypeError::InvalidIdentity {
            value: principal.clone(),
            reason: reason.to_string(),
        };

        if principal.is_empty() {
            return Err(reject("must not be empty"));
        }
        if principal.chars().count() > MAX_IDENTITY_LEN {
            return Err(reject("too long"));
        }
        if principal
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(reject("must not contain whitespace or control characters"));
        }
        Ok(Self { principal })
    }

    /// The full principal string.
    pub fn as_str(&self) -> &str {
        &self.principal
    }

    /// Short form for logs: the first six and last four characters.
    pub fn short_id(&self) -> String {
        let chars: Vec<char> = self.principal.chars().collect();
        if chars.len() <= 12 {
            return self.principal.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}..{tail}")
    }
}

impl FromStr for Identity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.principal
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.short_id())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

    #[test]
    fn accepts_stacks_principal() {
        let id = Identity::new(DEPLOYER).unwrap();
        assert_eq!(id.as_str(), DEPLOYER);
        assert_eq!(id.to_string(), DEPLOYER);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            Identity::new(""),
            Err(TypeError::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn rejects_whitespace() {
        assert!(Identity::new("wallet 1").is_err());
        assert!(Identity::new("wallet\t1").is_err());
        assert!(Identity::new("wallet\n").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let long = "a".repeat(MAX_IDENTITY_LEN + 1);
        assert!(Identity::new(long).is_err());
        let max = "a".repeat(MAX_IDENTITY_LEN);
        assert!(Identity::new(max).is_ok());
    }

    #[test]
    fn equality_is_by_principal() {
        let a = Identity::new("wallet_1").unwrap();
        let b: Identity = "wallet_1".parse().unwrap();
        let c = Identity::new("wallet_2").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn short_id_format() {
        let id = Identity::new(DEPLOYER).unwrap();
        assert_eq!(id.short_id(), "ST1PQH..GZGM");

        let short = Identity::new("wallet_1").unwrap();
        assert_eq!(short.short_id(), "wallet_1");
    }

    #[test]
    fn debug_uses_short_id() {
        let id = Identity::new(DEPLOYER).unwrap();
        assert_eq!(format!("{id:?}"), "Identity(ST1PQH..GZGM)");
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = Identity::new("wallet_2").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"wallet_2\"");
        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_invalid_principal() {
        let parsed: Result<Identity, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn ordering_is_consistent() {
        let a = Identity::new("a").unwrap();
        let b = Identity::new("b").unwrap();
        assert!(a < b);
    }
}
