use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use wellness_types::{Amount, PatientId, PolicyId, RoleName, ServiceId};

use crate::error::{LedgerError, LedgerResult};

/// Configuration for a [`Ledger`](crate::Ledger) instance.
///
/// Every section has a default, so a TOML file only needs the keys it wants
/// to change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub limits: Limits,
    pub access: AccessConfig,
    pub genesis: GenesisConfig,
}

impl LedgerConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> LedgerResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML configuration file.
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), policy = ?config.access.write_policy, "configuration loaded");
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> LedgerResult<String> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Check that every limit is usable.
    pub fn validate(&self) -> LedgerResult<()> {
        let limits = [
            ("max_record_len", self.limits.max_record_len),
            ("max_diagnosis_len", self.limits.max_diagnosis_len),
            ("max_name_len", self.limits.max_name_len),
            ("max_phone_len", self.limits.max_phone_len),
            ("max_batch_size", self.limits.max_batch_size),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(LedgerError::Config(format!("limits.{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// Bounds on caller-supplied input.
///
/// Text lengths are counted in characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_record_len: usize,
    pub max_diagnosis_len: usize,
    pub max_name_len: usize,
    pub max_phone_len: usize,
    pub max_batch_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_record_len: 256,
            max_diagnosis_len: 256,
            max_name_len: 64,
            max_phone_len: 32,
            max_batch_size: 50,
        }
    }
}

impl Limits {
    /// Fail with `InvalidArgument` if `value` is longer than `max` characters.
    pub fn check_text(field: &str, value: &str, max: usize) -> LedgerResult<()> {
        let len = value.chars().count();
        if len > max {
            return Err(LedgerError::invalid(format!(
                "{field} is {len} characters; at most {max} allowed"
            )));
        }
        Ok(())
    }
}

/// Who may call the record and billing write entry points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Any caller may write records and bills.
    #[default]
    Open,
    /// Record writes need the clinical role, bill writes the billing role.
    /// Admins pass both checks.
    Restricted,
}

/// Role requirements for write entry points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub write_policy: WritePolicy,
    pub clinical_role: RoleName,
    pub billing_role: RoleName,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::Open,
            clinical_role: RoleName::new("doctor").expect("static role name is valid"),
            billing_role: RoleName::new("billing").expect("static role name is valid"),
        }
    }
}

/// State seeded by genesis alongside the deploying administrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub records: Vec<RecordSeed>,
    pub policies: Vec<PolicySeed>,
    pub bills: Vec<BillSeed>,
}

impl GenesisConfig {
    /// Seed nothing but the administrator.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            policies: Vec::new(),
            bills: Vec::new(),
        }
    }
}

impl Default for GenesisConfig {
    /// The sample fixtures every fresh environment starts with.
    fn default() -> Self {
        Self {
            records: vec![RecordSeed {
                patient_id: PatientId(1),
                text: "Test medical record".into(),
            }],
            policies: vec![PolicySeed {
                id: PolicyId::new("TEST-POLICY-1").expect("static policy id is valid"),
                coverage: 10_000,
                premium: 100,
                active: true,
            }],
            bills: vec![BillSeed {
                id: ServiceId::new("TEST-SERVICE-1").expect("static service id is valid"),
                amount: 1_000,
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSeed {
    pub patient_id: PatientId,
    pub text: String,
}

// Seed amounts are u64: TOML integers cannot hold the full Amount range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySeed {
    pub id: PolicyId,
    pub coverage: u64,
    pub premium: u64,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSeed {
    pub id: ServiceId,
    pub amount: u64,
}

impl PolicySeed {
    pub fn coverage(&self) -> Amount {
        Amount::from(self.coverage)
    }

    pub fn premium(&self) -> Amount {
        Amount::from(self.premium)
    }
}

impl BillSeed {
    pub fn amount(&self) -> Amount {
        Amount::from(self.amount)
    }
}
