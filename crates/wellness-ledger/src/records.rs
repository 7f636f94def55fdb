//! Medical records, visit logs and emergency contacts, keyed by patient.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wellness_store::{KeyValueStore, ReadView, StoreKey};
use wellness_types::{Identity, PatientId};

use crate::config::Limits;
use crate::error::{LedgerError, LedgerResult, Resource};
use crate::events::EventKind;
use crate::ledger::{Ledger, WriteScope};

/// One entry in a patient's visit log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub diagnosis: String,
    /// Ledger-wide logical sequence number at which the visit was recorded.
    pub recorded_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Write (or overwrite) the medical record for `patient`.
    ///
    /// Returns `patient` so callers can confirm the write target.
    pub fn add_medical_record(
        &mut self,
        caller: &Identity,
        patient: PatientId,
        text: &str,
    ) -> LedgerResult<PatientId> {
        self.transact(caller, "add-medical-record", |call| {
            call.require_writer(WriteScope::Clinical, "write medical records")?;
            Limits::check_text("medical record", text, call.config.limits.max_record_len)?;
            call.txn.put(StoreKey::MedicalRecord(patient), text)?;
            call.emit(EventKind::RecordWritten { patient });
            Ok(patient)
        })
    }

    pub fn get_medical_record(&self, patient: PatientId) -> LedgerResult<String> {
        self.store
            .load(&StoreKey::MedicalRecord(patient))?
            .ok_or(LedgerError::NotFound(Resource::MedicalRecord(patient)))
    }

    /// Append a visit to the patient's log.
    pub fn add_patient_visit(
        &mut self,
        caller: &Identity,
        patient: PatientId,
        diagnosis: &str,
    ) -> LedgerResult<()> {
        self.transact(caller, "add-patient-visit", |call| {
            call.require_writer(WriteScope::Clinical, "record visits")?;
            Limits::check_text("diagnosis", diagnosis, call.config.limits.max_diagnosis_len)?;

            let key = StoreKey::Visits(patient);
            let mut visits: Vec<Visit> = call.txn.load(&key)?.unwrap_or_default();
            let recorded_at = call.next_sequence()?;
            visits.push(Visit {
                diagnosis: diagnosis.to_owned(),
                recorded_at,
            });
            debug!(%patient, recorded_at, total = visits.len(), "visit appended");
            call.txn.put(key, &visits)?;
            call.emit(EventKind::VisitRecorded {
                patient,
                recorded_at,
            });
            Ok(())
        })
    }

    /// The patient's visits in the order they were recorded. Empty if none.
    pub fn get_patient_visits(&self, patient: PatientId) -> LedgerResult<Vec<Visit>> {
        Ok(self
            .store
            .load(&StoreKey::Visits(patient))?
            .unwrap_or_default())
    }

    /// Set (or replace) the patient's emergency contact.
    pub fn add_emergency_contact(
        &mut self,
        caller: &Identity,
        patient: PatientId,
        name: &str,
        phone: &str,
    ) -> LedgerResult<()> {
        self.transact(caller, "add-emergency-contact", |call| {
            call.require_writer(WriteScope::Clinical, "set emergency contacts")?;
            let limits = &call.config.limits;
            Limits::check_text("contact name", name, limits.max_name_len)?;
            Limits::check_text("contact phone", phone, limits.max_phone_len)?;
            let contact = EmergencyContact {
                name: name.to_owned(),
                phone: phone.to_owned(),
            };
            call.txn.put(StoreKey::EmergencyContact(patient), &contact)?;
            call.emit(EventKind::ContactSet { patient });
            Ok(())
        })
    }

    /// `None` until a contact has been set.
    pub fn get_emergency_contact(
        &self,
        patient: PatientId,
    ) -> LedgerResult<Option<EmergencyContact>> {
        Ok(self.store.load(&StoreKey::EmergencyContact(patient))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, WritePolicy};
    use crate::error::ErrorKind;
    use proptest::prelude::*;
    use wellness_types::RoleName;

    fn who(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::genesis(who("deployer"), LedgerConfig::default()).unwrap()
    }

    fn restricted() -> Ledger {
        let mut config = LedgerConfig::default();
        config.access.write_policy = WritePolicy::Restricted;
        Ledger::genesis(who("deployer"), config).unwrap()
    }

    // ---------------------------------------------------------------
    // Medical records
    // ---------------------------------------------------------------

    #[test]
    fn genesis_record_is_readable() {
        let ledger = ledger();
        assert_eq!(
            ledger.get_medical_record(PatientId(1)).unwrap(),
            "Test medical record"
        );
    }

    #[test]
    fn add_echoes_patient_id() {
        let mut ledger = ledger();
        let id = ledger
            .add_medical_record(&who("wallet_1"), PatientId(2), "Patient has flu")
            .unwrap();
        assert_eq!(id, PatientId(2));
        assert_eq!(
            ledger.get_medical_record(PatientId(2)).unwrap(),
            "Patient has flu"
        );
    }

    #[test]
    fn re_adding_overwrites() {
        let mut ledger = ledger();
        let caller = who("wallet_1");
        ledger.add_medical_record(&caller, PatientId(5), "A").unwrap();
        ledger.add_medical_record(&caller, PatientId(5), "B").unwrap();
        assert_eq!(ledger.get_medical_record(PatientId(5)).unwrap(), "B");
    }

    #[test]
    fn missing_record_is_not_found() {
        let ledger = ledger();
        let err = ledger.get_medical_record(PatientId(42)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "medical record 42 not found");
    }

    #[test]
    fn oversized_record_rejected_without_write() {
        let mut ledger = ledger();
        let text = "x".repeat(257);
        let err = ledger
            .add_medical_record(&who("wallet_1"), PatientId(1), &text)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            ledger.get_medical_record(PatientId(1)).unwrap(),
            "Test medical record"
        );
    }

    #[test]
    fn record_at_exact_limit_accepted() {
        let mut ledger = ledger();
        let text = "x".repeat(256);
        assert!(ledger
            .add_medical_record(&who("wallet_1"), PatientId(3), &text)
            .is_ok());
    }

    // ---------------------------------------------------------------
    // Visits
    // ---------------------------------------------------------------

    #[test]
    fn visits_empty_by_default() {
        let ledger = ledger();
        assert!(ledger.get_patient_visits(PatientId(1)).unwrap().is_empty());
    }

    #[test]
    fn visits_append_in_order() {
        let mut ledger = ledger();
        let caller = who("wallet_1");
        ledger.add_patient_visit(&caller, PatientId(1), "A").unwrap();
        ledger.add_patient_visit(&caller, PatientId(1), "B").unwrap();

        let visits = ledger.get_patient_visits(PatientId(1)).unwrap();
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[0].diagnosis, "A");
        assert_eq!(visits[1].diagnosis, "B");
        assert!(visits[0].recorded_at < visits[1].recorded_at);
    }

    #[test]
    fn sequence_is_shared_across_patients() {
        let mut ledger = ledger();
        let caller = who("wallet_1");
        ledger.add_patient_visit(&caller, PatientId(1), "A").unwrap();
        ledger.add_patient_visit(&caller, PatientId(2), "B").unwrap();
        ledger.add_patient_visit(&caller, PatientId(1), "C").unwrap();

        let first = ledger.get_patient_visits(PatientId(1)).unwrap();
        let second = ledger.get_patient_visits(PatientId(2)).unwrap();
        assert_eq!(first[0].recorded_at, 1);
        assert_eq!(second[0].recorded_at, 2);
        assert_eq!(first[1].recorded_at, 3);
    }

    #[test]
    fn oversized_diagnosis_does_not_consume_sequence() {
        let mut ledger = ledger();
        let caller = who("wallet_1");
        assert!(ledger
            .add_patient_visit(&caller, PatientId(1), &"d".repeat(300))
            .is_err());
        ledger.add_patient_visit(&caller, PatientId(1), "ok").unwrap();
        let visits = ledger.get_patient_visits(PatientId(1)).unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].recorded_at, 1);
    }

    // ---------------------------------------------------------------
    // Emergency contacts
    // ---------------------------------------------------------------

    #[test]
    fn contact_absent_then_present() {
        let mut ledger = ledger();
        assert_eq!(ledger.get_emergency_contact(PatientId(1)).unwrap(), None);
        ledger
            .add_emergency_contact(&who("wallet_1"), PatientId(1), "John Doe", "123-456-7890")
            .unwrap();
        assert_eq!(
            ledger.get_emergency_contact(PatientId(1)).unwrap(),
            Some(EmergencyContact {
                name: "John Doe".into(),
                phone: "123-456-7890".into(),
            })
        );
    }

    #[test]
    fn contact_with_empty_fields_is_still_some() {
        let mut ledger = ledger();
        ledger
            .add_emergency_contact(&who("wallet_1"), PatientId(7), "", "")
            .unwrap();
        let contact = ledger.get_emergency_contact(PatientId(7)).unwrap();
        assert!(contact.is_some());
    }

    #[test]
    fn contact_overwrites() {
        let mut ledger = ledger();
        let caller = who("wallet_1");
        ledger
            .add_emergency_contact(&caller, PatientId(1), "A", "1")
            .unwrap();
        ledger
            .add_emergency_contact(&caller, PatientId(1), "B", "2")
            .unwrap();
        let contact = ledger.get_emergency_contact(PatientId(1)).unwrap().unwrap();
        assert_eq!(contact.name, "B");
        assert_eq!(contact.phone, "2");
    }

    #[test]
    fn oversized_phone_rejected() {
        let mut ledger = ledger();
        let err = ledger
            .add_emergency_contact(&who("wallet_1"), PatientId(1), "A", &"9".repeat(33))
            .unwrap_err();
        assert!(err.to_string().contains("contact phone"));
        assert_eq!(ledger.get_emergency_contact(PatientId(1)).unwrap(), None);
    }

    // ---------------------------------------------------------------
    // Restricted write policy
    // ---------------------------------------------------------------

    #[test]
    fn restricted_policy_requires_clinical_role() {
        let mut ledger = restricted();
        let doctor = who("wallet_1");
        let stranger = who("wallet_2");

        let err = ledger
            .add_medical_record(&doctor, PatientId(9), "notes")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        ledger
            .authorize_user(&who("deployer"), &doctor, &RoleName::new("doctor").unwrap())
            .unwrap();
        ledger.add_medical_record(&doctor, PatientId(9), "notes").unwrap();
        ledger.add_patient_visit(&doctor, PatientId(9), "cold").unwrap();

        assert!(ledger
            .add_patient_visit(&stranger, PatientId(9), "cold")
            .is_err());
        assert!(ledger
            .add_emergency_contact(&stranger, PatientId(9), "A", "1")
            .is_err());
    }

    #[test]
    fn restricted_policy_admits_admins() {
        let mut ledger = restricted();
        assert!(ledger
            .add_medical_record(&who("deployer"), PatientId(9), "notes")
            .is_ok());
    }

    proptest! {
        #[test]
        fn visits_preserve_insertion_order(diagnoses in prop::collection::vec("[a-z]{1,12}", 1..20)) {
            let mut ledger = ledger();
            let caller = who("wallet_1");
            for d in &diagnoses {
                ledger.add_patient_visit(&caller, PatientId(3), d).unwrap();
            }
            let visits = ledger.get_patient_visits(PatientId(3)).unwrap();
            let stored: Vec<&str> = visits.iter().map(|v| v.diagnosis.as_str()).collect();
            let expected: Vec<&str> = diagnoses.iter().map(String::as_str).collect();
            prop_assert_eq!(stored, expected);
            prop_assert!(visits.windows(2).all(|w| w[0].recorded_at < w[1].recorded_at));
        }
    }
}
