use tracing::{debug, info, warn};
use wellness_store::{InMemoryStore, KeyValueStore, ReadView, StoreKey, Transaction};
use wellness_types::Identity;

use crate::billing::Bill;
use crate::config::{Limits, LedgerConfig, WritePolicy};
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventJournal, EventKind, LedgerEvent};
use crate::policies::Policy;

/// The Wellness Ledger engine.
///
/// Owns its store, configuration and event journal. Mutating entry points
/// take `&mut self`, so calls are applied one at a time; each one runs in a
/// [`Transaction`] that is committed only if the call succeeds.
pub struct Ledger<S: KeyValueStore = InMemoryStore> {
    pub(crate) store: S,
    pub(crate) config: LedgerConfig,
    journal: EventJournal,
}

impl Ledger<InMemoryStore> {
    /// Bootstrap a fresh in-memory ledger with `deployer` as the first admin.
    pub fn genesis(deployer: Identity, config: LedgerConfig) -> LedgerResult<Self> {
        Self::with_store(InMemoryStore::new(), deployer, config)
    }
}

impl<S: KeyValueStore> Ledger<S> {
    /// Open a ledger over `store`, running genesis if the store has never
    /// been bootstrapped.
    ///
    /// On an already-bootstrapped store `deployer` is ignored and nothing is
    /// written.
    pub fn with_store(store: S, deployer: Identity, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        let mut ledger = Self {
            store,
            config,
            journal: EventJournal::new(),
        };
        if ledger.store.contains(&StoreKey::Genesis)? {
            debug!("store already bootstrapped; skipping genesis");
            return Ok(ledger);
        }
        ledger.bootstrap(&deployer)?;
        Ok(ledger)
    }

    fn bootstrap(&mut self, deployer: &Identity) -> LedgerResult<()> {
        let genesis = self.config.genesis.clone();
        self.transact(deployer, "genesis", |call| {
            call.txn.put(StoreKey::Admin(deployer.clone()), &true)?;
            call.emit(EventKind::AdminAdded {
                target: deployer.clone(),
            });

            for seed in &genesis.records {
                Limits::check_text(
                    "genesis record",
                    &seed.text,
                    call.config.limits.max_record_len,
                )?;
                call.txn
                    .put(StoreKey::MedicalRecord(seed.patient_id), &seed.text)?;
                call.emit(EventKind::RecordWritten {
                    patient: seed.patient_id,
                });
            }

            for seed in &genesis.policies {
                let key = StoreKey::Policy(seed.id.clone());
                if call.txn.contains(&key)? {
                    return Err(LedgerError::Config(format!(
                        "genesis policy {} listed twice",
                        seed.id
                    )));
                }
                let policy = Policy {
                    coverage: seed.coverage(),
                    premium: seed.premium(),
                    active: seed.active,
                };
                call.txn.put(key, &policy)?;
                call.emit(EventKind::PolicyCreated {
                    policy: seed.id.clone(),
                });
            }

            for seed in &genesis.bills {
                call.txn
                    .put(StoreKey::Bill(seed.id.clone()), &Bill::unpaid(seed.amount()))?;
                call.emit(EventKind::BillAdded {
                    service: seed.id.clone(),
                    amount: seed.amount(),
                });
            }

            call.txn.put(StoreKey::Genesis, &true)?;
            Ok(())
        })?;

        info!(
            deployer = %deployer,
            records = genesis.records.len(),
            policies = genesis.policies.len(),
            bills = genesis.bills.len(),
            "genesis complete"
        );
        Ok(())
    }

    /// Run one mutating call.
    ///
    /// `body` stages writes and events on the [`Call`]; they reach the store
    /// and the journal only if it returns `Ok`.
    pub(crate) fn transact<T>(
        &mut self,
        caller: &Identity,
        op: &'static str,
        body: impl FnOnce(&mut Call<'_, S>) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut call = Call {
            txn: Transaction::new(&self.store),
            config: &self.config,
            caller,
            events: Vec::new(),
        };

        let value = match body(&mut call) {
            Ok(value) => value,
            Err(err) => {
                debug!(op, caller = %caller.short_id(), error = %err, "call rejected");
                return Err(err);
            }
        };

        let Call { txn, events, .. } = call;
        let ops = txn.commit()?;
        for kind in events {
            self.journal.record(caller.clone(), kind);
        }
        debug!(op, caller = %caller.short_id(), ops, "call committed");
        Ok(value)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Events from every committed call, oldest first.
    pub fn events(&self) -> &[LedgerEvent] {
        self.journal.events()
    }

    /// Remove and return the buffered events.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }
}

impl<S: KeyValueStore> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("write_policy", &self.config.access.write_policy)
            .field("events", &self.journal.len())
            .finish()
    }
}

/// Which family of write entry points a caller is attempting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteScope {
    /// Medical records, visits and emergency contacts.
    Clinical,
    /// Bills and their settlement.
    Billing,
}

/// In-flight state of one mutating call.
pub(crate) struct Call<'a, S: KeyValueStore> {
    pub(crate) txn: Transaction<'a, S>,
    pub(crate) config: &'a LedgerConfig,
    pub(crate) caller: &'a Identity,
    events: Vec<EventKind>,
}

impl<S: KeyValueStore> Call<'_, S> {
    pub(crate) fn emit(&mut self, kind: EventKind) {
        self.events.push(kind);
    }

    pub(crate) fn caller_is_admin(&self) -> LedgerResult<bool> {
        Ok(self.txn.contains(&StoreKey::Admin(self.caller.clone()))?)
    }

    /// Fail with `Unauthorized` unless the caller is an administrator.
    pub(crate) fn require_admin(&self, action: &'static str) -> LedgerResult<()> {
        if self.caller_is_admin()? {
            return Ok(());
        }
        warn!(caller = %self.caller, action, "admin check failed");
        Err(LedgerError::Unauthorized {
            caller: self.caller.clone(),
            action,
        })
    }

    /// Enforce the configured write policy for `scope`.
    pub(crate) fn require_writer(&self, scope: WriteScope, action: &'static str) -> LedgerResult<()> {
        if self.config.access.write_policy == WritePolicy::Open || self.caller_is_admin()? {
            return Ok(());
        }
        let role = match scope {
            WriteScope::Clinical => &self.config.access.clinical_role,
            WriteScope::Billing => &self.config.access.billing_role,
        };
        let granted = self
            .txn
            .contains(&StoreKey::RoleGrant(self.caller.clone(), role.clone()))?;
        if granted {
            return Ok(());
        }
        warn!(caller = %self.caller, %role, action, "write policy denied call");
        Err(LedgerError::Unauthorized {
            caller: self.caller.clone(),
            action,
        })
    }

    /// Advance the ledger-wide logical sequence and return the new value.
    pub(crate) fn next_sequence(&mut self) -> LedgerResult<u64> {
        let current: u64 = self.txn.load(&StoreKey::Sequence)?.unwrap_or(0);
        let next = current
            .checked_add(1)
            .ok_or_else(|| LedgerError::invalid("sequence counter exhausted"))?;
        self.txn.put(StoreKey::Sequence, &next)?;
        Ok(next)
    }
}
