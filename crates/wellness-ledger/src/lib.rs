//! The Wellness Ledger engine.
//!
//! A deterministic state machine for a health-benefits platform. It provides:
//! - Administrator set and role grants that gate who may mutate what
//! - Medical records, append-only visit logs and emergency contacts
//! - An admin-managed insurance policy catalog
//! - Exact 75% claim reimbursement over the full `Amount` range
//! - Per-service bills with single and batch settlement
//! - A closed [`Request`]/[`Response`] vocabulary and scripted replay
//!
//! Every mutating entry point runs inside a store transaction: a call that
//! returns an error leaves the store exactly as it found it.
//!
//! ```
//! use wellness_ledger::{Ledger, LedgerConfig};
//! use wellness_types::{Identity, PatientId};
//!
//! let deployer = Identity::new("deployer").unwrap();
//! let mut ledger = Ledger::genesis(deployer.clone(), LedgerConfig::default()).unwrap();
//! ledger.add_medical_record(&deployer, PatientId(2), "Patient has flu").unwrap();
//! assert_eq!(ledger.get_medical_record(PatientId(2)).unwrap(), "Patient has flu");
//! assert_eq!(ledger.submit_claim(&deployer, 500).unwrap(), 375);
//! ```

pub mod access;
pub mod billing;
pub mod claims;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod policies;
pub mod records;
pub mod replay;
pub mod request;

pub use billing::{BatchItem, BatchSettlement, Bill, SettlementStatus};
pub use claims::{reimbursement, REIMBURSEMENT_PERCENT};
pub use config::{AccessConfig, GenesisConfig, LedgerConfig, Limits, WritePolicy};
pub use error::{ErrorKind, LedgerError, LedgerResult, Resource};
pub use events::{EventJournal, EventKind, LedgerEvent};
pub use ledger::Ledger;
pub use policies::Policy;
pub use records::{EmergencyContact, Visit};
pub use replay::{CallOutcome, CallResult, ReplayEngine, ReplayResult, Script, ScriptCall};
pub use request::{Request, Response};
