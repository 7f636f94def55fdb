//! Administrator set and per-identity role grants.

use tracing::debug;
use wellness_store::{KeyValueStore, ReadView, StoreKey};
use wellness_types::{Identity, RoleName};

use crate::error::LedgerResult;
use crate::events::EventKind;
use crate::ledger::Ledger;

impl<S: KeyValueStore> Ledger<S> {
    /// Make `target` an administrator. Admin only.
    ///
    /// Adding an existing admin succeeds without writing anything.
    pub fn add_admin(&mut self, caller: &Identity, target: &Identity) -> LedgerResult<()> {
        self.transact(caller, "add-admin", |call| {
            call.require_admin("add admins")?;
            let key = StoreKey::Admin(target.clone());
            if call.txn.contains(&key)? {
                debug!(target = %target, "already an admin");
                return Ok(());
            }
            call.txn.put(key, &true)?;
            call.emit(EventKind::AdminAdded {
                target: target.clone(),
            });
            Ok(())
        })
    }

    pub fn is_admin(&self, identity: &Identity) -> LedgerResult<bool> {
        Ok(self.store.contains(&StoreKey::Admin(identity.clone()))?)
    }

    /// Grant `role` to `target`. Admin only.
    pub fn authorize_user(
        &mut self,
        caller: &Identity,
        target: &Identity,
        role: &RoleName,
    ) -> LedgerResult<()> {
        self.transact(caller, "authorize-user", |call| {
            call.require_admin("grant roles")?;
            call.txn
                .put(StoreKey::RoleGrant(target.clone(), role.clone()), &true)?;
            call.emit(EventKind::RoleGranted {
                target: target.clone(),
                role: role.clone(),
            });
            Ok(())
        })
    }

    /// Remove `role` from `target`. Admin only; revoking an absent grant is a
    /// no-op.
    pub fn revoke_user(
        &mut self,
        caller: &Identity,
        target: &Identity,
        role: &RoleName,
    ) -> LedgerResult<()> {
        self.transact(caller, "revoke-user", |call| {
            call.require_admin("revoke roles")?;
            let key = StoreKey::RoleGrant(target.clone(), role.clone());
            if !call.txn.contains(&key)? {
                return Ok(());
            }
            call.txn.delete(key);
            call.emit(EventKind::RoleRevoked {
                target: target.clone(),
                role: role.clone(),
            });
            Ok(())
        })
    }

    pub fn is_user_authorized(&self, identity: &Identity, role: &RoleName) -> LedgerResult<bool> {
        Ok(self
            .store
            .contains(&StoreKey::RoleGrant(identity.clone(), role.clone()))?)
    }
}
