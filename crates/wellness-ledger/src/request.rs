//! Closed request/response vocabulary for the ledger.
//!
//! Every entry point has exactly one [`Request`] variant, and
//! [`Ledger::execute`] dispatches them through an exhaustive `match`, so
//! adding an entry point without wiring it here fails to compile.

use std::fmt;

use serde::{Deserialize, Serialize};
use wellness_store::KeyValueStore;
use wellness_types::{Amount, Identity, PatientId, PolicyId, RoleName, ServiceId};

use crate::billing::{BatchSettlement, Bill};
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::policies::Policy;
use crate::records::{EmergencyContact, Visit};

/// A call against the ledger, minus the caller identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Request {
    AddAdmin {
        target: Identity,
    },
    IsAdmin {
        identity: Identity,
    },
    AuthorizeUser {
        target: Identity,
        role: RoleName,
    },
    RevokeUser {
        target: Identity,
        role: RoleName,
    },
    IsUserAuthorized {
        identity: Identity,
        role: RoleName,
    },
    AddMedicalRecord {
        patient_id: PatientId,
        text: String,
    },
    GetMedicalRecord {
        patient_id: PatientId,
    },
    AddPatientVisit {
        patient_id: PatientId,
        diagnosis: String,
    },
    GetPatientVisits {
        patient_id: PatientId,
    },
    AddEmergencyContact {
        patient_id: PatientId,
        name: String,
        phone: String,
    },
    GetEmergencyContact {
        patient_id: PatientId,
    },
    AddPolicy {
        policy_id: PolicyId,
        coverage: Amount,
        premium: Amount,
        active: bool,
    },
    GetPolicyDetails {
        policy_id: PolicyId,
    },
    SubmitClaim {
        amount: Amount,
    },
    AddBill {
        service_id: ServiceId,
        amount: Amount,
    },
    PayBill {
        service_id: ServiceId,
        amount: Amount,
    },
    BatchPayBills {
        service_ids: Vec<ServiceId>,
    },
    GetBill {
        service_id: ServiceId,
    },
}

impl Request {
    /// Entry point name, as used in logs and scripts.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::AddAdmin { .. } => "add-admin",
            Self::IsAdmin { .. } => "is-admin",
            Self::AuthorizeUser { .. } => "authorize-user",
            Self::RevokeUser { .. } => "revoke-user",
            Self::IsUserAuthorized { .. } => "is-user-authorized",
            Self::AddMedicalRecord { .. } => "add-medical-record",
            Self::GetMedicalRecord { .. } => "get-medical-record",
            Self::AddPatientVisit { .. } => "add-patient-visit",
            Self::GetPatientVisits { .. } => "get-patient-visits",
            Self::AddEmergencyContact { .. } => "add-emergency-contact",
            Self::GetEmergencyContact { .. } => "get-emergency-contact",
            Self::AddPolicy { .. } => "add-policy",
            Self::GetPolicyDetails { .. } => "get-policy-details",
            Self::SubmitClaim { .. } => "submit-claim",
            Self::AddBill { .. } => "add-bill",
            Self::PayBill { .. } => "pay-bill",
            Self::BatchPayBills { .. } => "batch-pay-bills",
            Self::GetBill { .. } => "get-bill",
        }
    }

    /// Returns `true` if the request can change ledger state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::AddAdmin { .. }
                | Self::AuthorizeUser { .. }
                | Self::RevokeUser { .. }
                | Self::AddMedicalRecord { .. }
                | Self::AddPatientVisit { .. }
                | Self::AddEmergencyContact { .. }
                | Self::AddPolicy { .. }
                | Self::AddBill { .. }
                | Self::PayBill { .. }
                | Self::BatchPayBills { .. }
        )
    }
}

/// Success value of an executed [`Request`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Response {
    Ok,
    Bool(bool),
    PatientId(PatientId),
    Text(String),
    Visits(Vec<Visit>),
    Contact(Option<EmergencyContact>),
    PolicyId(PolicyId),
    Policy(Policy),
    Amount(Amount),
    ServiceId(ServiceId),
    Bill(Bill),
    Batch(BatchSettlement),
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::PatientId(id) => write!(f, "patient {id}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Visits(visits) => {
                write!(f, "{} visit(s)", visits.len())?;
                for visit in visits {
                    write!(f, "\n  #{} {}", visit.recorded_at, visit.diagnosis)?;
                }
                Ok(())
            }
            Self::Contact(None) => f.write_str("none"),
            Self::Contact(Some(c)) => write!(f, "{} <{}>", c.name, c.phone),
            Self::PolicyId(id) => write!(f, "policy {id}"),
            Self::Policy(p) => write!(
                f,
                "coverage {} premium {} {}",
                p.coverage,
                p.premium,
                if p.active { "active" } else { "inactive" }
            ),
            Self::Amount(amount) => write!(f, "{amount}"),
            Self::ServiceId(id) => write!(f, "bill {id}"),
            Self::Bill(b) => write!(
                f,
                "amount {} {}",
                b.amount,
                if b.paid { "paid" } else { "unpaid" }
            ),
            Self::Batch(report) => {
                write!(f, "{} item(s)", report.items.len())?;
                for item in &report.items {
                    write!(f, "\n  {} {:?}", item.service, item.status)?;
                }
                Ok(())
            }
        }
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Execute one request on behalf of `caller`.
    pub fn execute(&mut self, caller: &Identity, request: Request) -> LedgerResult<Response> {
        let response = match request {
            Request::AddAdmin { target } => {
                self.add_admin(caller, &target)?;
                Response::Ok
            }
            Request::IsAdmin { identity } => Response::Bool(self.is_admin(&identity)?),
            Request::AuthorizeUser { target, role } => {
                self.authorize_user(caller, &target, &role)?;
                Response::Ok
            }
            Request::RevokeUser { target, role } => {
                self.revoke_user(caller, &target, &role)?;
                Response::Ok
            }
            Request::IsUserAuthorized { identity, role } => {
                Response::Bool(self.is_user_authorized(&identity, &role)?)
            }
            Request::AddMedicalRecord { patient_id, text } => {
                Response::PatientId(self.add_medical_record(caller, patient_id, &text)?)
            }
            Request::GetMedicalRecord { patient_id } => {
                Response::Text(self.get_medical_record(patient_id)?)
            }
            Request::AddPatientVisit {
                patient_id,
                diagnosis,
            } => {
                self.add_patient_visit(caller, patient_id, &diagnosis)?;
                Response::Ok
            }
            Request::GetPatientVisits { patient_id } => {
                Response::Visits(self.get_patient_visits(patient_id)?)
            }
            Request::AddEmergencyContact {
                patient_id,
                name,
                phone,
            } => {
                self.add_emergency_contact(caller, patient_id, &name, &phone)?;
                Response::Ok
            }
            Request::GetEmergencyContact { patient_id } => {
                Response::Contact(self.get_emergency_contact(patient_id)?)
            }
            Request::AddPolicy {
                policy_id,
                coverage,
                premium,
                active,
            } => {
                let terms = Policy {
                    coverage,
                    premium,
                    active,
                };
                Response::PolicyId(self.add_policy(caller, &policy_id, terms)?)
            }
            Request::GetPolicyDetails { policy_id } => {
                Response::Policy(self.get_policy_details(&policy_id)?)
            }
            Request::SubmitClaim { amount } => Response::Amount(self.submit_claim(caller, amount)?),
            Request::AddBill { service_id, amount } => {
                Response::ServiceId(self.add_bill(caller, &service_id, amount)?)
            }
            Request::PayBill { service_id, amount } => {
                Response::Bool(self.pay_bill(caller, &service_id, amount)?)
            }
            Request::BatchPayBills { service_ids } => {
                Response::Batch(self.batch_pay_bills(caller, &service_ids)?)
            }
            Request::GetBill { service_id } => Response::Bill(self.get_bill(&service_id)?),
        };
        Ok(response)
    }
}
