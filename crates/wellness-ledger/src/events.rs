use std::fmt;

use serde::{Deserialize, Serialize};
use wellness_types::{Amount, Identity, PatientId, PolicyId, RoleName, ServiceId};

/// What a committed call changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    AdminAdded { target: Identity },
    RoleGranted { target: Identity, role: RoleName },
    RoleRevoked { target: Identity, role: RoleName },
    RecordWritten { patient: PatientId },
    VisitRecorded { patient: PatientId, recorded_at: u64 },
    ContactSet { patient: PatientId },
    PolicyCreated { policy: PolicyId },
    BillAdded { service: ServiceId, amount: Amount },
    BillPaid { service: ServiceId, amount: Amount },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdminAdded { target } => write!(f, "AdminAdded({})", target.short_id()),
            Self::RoleGranted { target, role } => {
                write!(f, "RoleGranted({}, {role})", target.short_id())
            }
            Self::RoleRevoked { target, role } => {
                write!(f, "RoleRevoked({}, {role})", target.short_id())
            }
            Self::RecordWritten { patient } => write!(f, "RecordWritten({patient})"),
            Self::VisitRecorded {
                patient,
                recorded_at,
            } => write!(f, "VisitRecorded({patient}@{recorded_at})"),
            Self::ContactSet { patient } => write!(f, "ContactSet({patient})"),
            Self::PolicyCreated { policy } => write!(f, "PolicyCreated({policy})"),
            Self::BillAdded { service, amount } => write!(f, "BillAdded({service}, {amount})"),
            Self::BillPaid { service, amount } => write!(f, "BillPaid({service}, {amount})"),
        }
    }
}

/// A journaled event, stamped with its position and the calling identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the journal, starting at 1.
    pub seq: u64,
    pub caller: Identity,
    pub kind: EventKind,
}

/// Append-only record of events from committed calls.
#[derive(Clone, Debug)]
pub struct EventJournal {
    events: Vec<LedgerEvent>,
    next_seq: u64,
}

impl EventJournal {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_seq: 1,
        }
    }

    /// Append one event; returns its sequence number.
    pub fn record(&mut self, caller: Identity, kind: EventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(LedgerEvent { seq, caller, kind });
        seq
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Remove and return every buffered event. Sequence numbers keep
    /// counting from where they were.
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> Identity {
        Identity::new("deployer").unwrap()
    }

    #[test]
    fn sequence_starts_at_one() {
        let mut journal = EventJournal::new();
        let seq = journal.record(caller(), EventKind::RecordWritten { patient: PatientId(1) });
        assert_eq!(seq, 1);
        assert_eq!(journal.events()[0].seq, 1);
    }

    #[test]
    fn default_journal_also_starts_at_one() {
        let mut journal = EventJournal::default();
        assert_eq!(
            journal.record(caller(), EventKind::ContactSet { patient: PatientId(2) }),
            1
        );
        assert_eq!(
            journal.record(caller(), EventKind::ContactSet { patient: PatientId(2) }),
            2
        );
    }

    #[test]
    fn drain_keeps_numbering() {
        let mut journal = EventJournal::new();
        journal.record(caller(), EventKind::RecordWritten { patient: PatientId(1) });
        journal.record(caller(), EventKind::RecordWritten { patient: PatientId(2) });
        let drained = journal.drain();
        assert_eq!(drained.len(), 2);
        assert!(journal.is_empty());

        let seq = journal.record(caller(), EventKind::RecordWritten { patient: PatientId(3) });
        assert_eq!(seq, 3);
    }

    #[test]
    fn display_is_compact() {
        let kind = EventKind::BillPaid {
            service: ServiceId::new("TEST-SERVICE-1").unwrap(),
            amount: 1000,
        };
        assert_eq!(kind.to_string(), "BillPaid(TEST-SERVICE-1, 1000)");
        let kind = EventKind::VisitRecorded {
            patient: PatientId(4),
            recorded_at: 9,
        };
        assert_eq!(kind.to_string(), "VisitRecorded(4@9)");
    }
}
