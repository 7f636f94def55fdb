//! Insurance policy catalog.

use serde::{Deserialize, Serialize};
use wellness_store::{KeyValueStore, ReadView, StoreKey};
use wellness_types::{Amount, Identity, PolicyId};

use crate::error::{LedgerError, LedgerResult, Resource};
use crate::events::EventKind;
use crate::ledger::Ledger;

/// Coverage terms of an insurance policy. Immutable once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub coverage: Amount,
    pub premium: Amount,
    pub active: bool,
}

impl<S: KeyValueStore> Ledger<S> {
    pub fn get_policy_details(&self, policy: &PolicyId) -> LedgerResult<Policy> {
        self.store
            .load(&StoreKey::Policy(policy.clone()))?
            .ok_or_else(|| LedgerError::NotFound(Resource::Policy(policy.clone())))
    }

    /// Create a new policy. Admin only; an existing id is rejected.
    pub fn add_policy(
        &mut self,
        caller: &Identity,
        id: &PolicyId,
        terms: Policy,
    ) -> LedgerResult<PolicyId> {
        self.transact(caller, "add-policy", |call| {
            call.require_admin("create policies")?;
            let key = StoreKey::Policy(id.clone());
            if call.txn.contains(&key)? {
                return Err(LedgerError::invalid(format!(
                    "policy {id} already exists"
                )));
            }
            call.txn.put(key, &terms)?;
            call.emit(EventKind::PolicyCreated { policy: id.clone() });
            Ok(id.clone())
        })
    }
}
