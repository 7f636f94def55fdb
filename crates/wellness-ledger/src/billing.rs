//! Per-service bills and their settlement.
//!
//! A bill moves from unpaid to paid exactly once; paid is terminal.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wellness_store::{KeyValueStore, ReadView, StoreKey};
use wellness_types::{Amount, Identity, ServiceId};

use crate::error::{LedgerError, LedgerResult, Resource};
use crate::events::EventKind;
use crate::ledger::{Ledger, WriteScope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub amount: Amount,
    pub paid: bool,
}

impl Bill {
    pub fn unpaid(amount: Amount) -> Self {
        Self {
            amount,
            paid: false,
        }
    }
}

/// Outcome of settling one item in a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementStatus {
    /// The bill was unpaid and is now paid.
    Settled,
    AlreadyPaid,
    /// No bill exists for this id; the rest of the batch still ran.
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub service: ServiceId,
    pub status: SettlementStatus,
}

/// Per-item report from [`Ledger::batch_pay_bills`], in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettlement {
    pub items: Vec<BatchItem>,
}

impl BatchSettlement {
    /// Ids this batch moved from unpaid to paid.
    pub fn settled(&self) -> Vec<ServiceId> {
        self.items
            .iter()
            .filter(|item| item.status == SettlementStatus::Settled)
            .map(|item| item.service.clone())
            .collect()
    }

    pub fn count(&self, status: SettlementStatus) -> usize {
        self.items.iter().filter(|item| item.status == status).count()
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Create (or replace) an unpaid bill for `service`.
    ///
    /// A paid bill cannot be replaced.
    pub fn add_bill(
        &mut self,
        caller: &Identity,
        service: &ServiceId,
        amount: Amount,
    ) -> LedgerResult<ServiceId> {
        self.transact(caller, "add-bill", |call| {
            call.require_writer(WriteScope::Billing, "add bills")?;
            let key = StoreKey::Bill(service.clone());
            if let Some(existing) = call.txn.load::<Bill>(&key)? {
                if existing.paid {
                    return Err(LedgerError::invalid(format!(
                        "bill {service} is already paid"
                    )));
                }
            }
            call.txn.put(key, &Bill::unpaid(amount))?;
            call.emit(EventKind::BillAdded {
                service: service.clone(),
                amount,
            });
            Ok(service.clone())
        })
    }

    /// Pay the bill for `service`. `amount` must equal the billed amount.
    ///
    /// Paying an already-paid bill with the right amount succeeds and
    /// changes nothing.
    pub fn pay_bill(
        &mut self,
        caller: &Identity,
        service: &ServiceId,
        amount: Amount,
    ) -> LedgerResult<bool> {
        self.transact(caller, "pay-bill", |call| {
            call.require_writer(WriteScope::Billing, "pay bills")?;
            let key = StoreKey::Bill(service.clone());
            let mut bill: Bill = call
                .txn
                .load(&key)?
                .ok_or_else(|| LedgerError::NotFound(Resource::Bill(service.clone())))?;
            if bill.amount != amount {
                return Err(LedgerError::AmountMismatch {
                    service: service.clone(),
                    billed: bill.amount,
                    offered: amount,
                });
            }
            if bill.paid {
                debug!(%service, "bill already paid");
                return Ok(true);
            }
            bill.paid = true;
            call.txn.put(key, &bill)?;
            call.emit(EventKind::BillPaid {
                service: service.clone(),
                amount,
            });
            Ok(true)
        })
    }

    /// Settle each bill in `services`, in order, at its billed amount.
    ///
    /// Unknown ids are reported per item instead of failing the batch. A
    /// batch longer than `limits.max_batch_size` is rejected as a whole.
    pub fn batch_pay_bills(
        &mut self,
        caller: &Identity,
        services: &[ServiceId],
    ) -> LedgerResult<BatchSettlement> {
        self.transact(caller, "batch-pay-bills", |call| {
            call.require_writer(WriteScope::Billing, "pay bills")?;
            let max = call.config.limits.max_batch_size;
            if services.len() > max {
                return Err(LedgerError::invalid(format!(
                    "batch of {} bills exceeds the limit of {max}",
                    services.len()
                )));
            }

            let mut report = BatchSettlement::default();
            for service in services {
                let key = StoreKey::Bill(service.clone());
                let status = match call.txn.load::<Bill>(&key)? {
                    None => {
                        warn!(%service, "batch item has no bill");
                        SettlementStatus::NotFound
                    }
                    Some(bill) if bill.paid => SettlementStatus::AlreadyPaid,
                    Some(mut bill) => {
                        bill.paid = true;
                        call.txn.put(key, &bill)?;
                        call.emit(EventKind::BillPaid {
                            service: service.clone(),
                            amount: bill.amount,
                        });
                        SettlementStatus::Settled
                    }
                };
                report.items.push(BatchItem {
                    service: service.clone(),
                    status,
                });
            }
            debug!(
                items = report.items.len(),
                settled = report.count(SettlementStatus::Settled),
                "batch processed"
            );
            Ok(report)
        })
    }

    pub fn get_bill(&self, service: &ServiceId) -> LedgerResult<Bill> {
        self.store
            .load(&StoreKey::Bill(service.clone()))?
            .ok_or_else(|| LedgerError::NotFound(Resource::Bill(service.clone())))
    }
}
