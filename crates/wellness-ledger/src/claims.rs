//! Insurance claim reimbursement.

use tracing::debug;
use wellness_store::KeyValueStore;
use wellness_types::{Amount, Identity};

use crate::error::LedgerResult;
use crate::ledger::Ledger;

/// Share of a claimed amount that is reimbursed.
pub const REIMBURSEMENT_PERCENT: Amount = 75;

/// `floor(amount * 75 / 100)`, exact for every `Amount`.
///
/// The amount is split into whole hundreds and a remainder so the
/// multiplication never overflows.
pub fn reimbursement(amount: Amount) -> Amount {
    let hundreds = amount / 100;
    let rest = amount % 100;
    hundreds * REIMBURSEMENT_PERCENT + rest * REIMBURSEMENT_PERCENT / 100
}

impl<S: KeyValueStore> Ledger<S> {
    /// Compute the reimbursement for a claim of `amount`.
    ///
    /// Open to any caller. Reads and writes no state.
    pub fn submit_claim(&self, caller: &Identity, amount: Amount) -> LedgerResult<Amount> {
        let paid = reimbursement(amount);
        debug!(caller = %caller.short_id(), amount, reimbursement = paid, "claim computed");
        Ok(paid)
    }
}
