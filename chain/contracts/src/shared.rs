//! Shared vault handle
//!
//! One mutex around the whole engine: every call, payout included, runs to
//! completion before the next caller gets in. A payee that wants to call back
//! in does so through the `&mut Vault` the gate is handed, never through this
//! handle, so re-entry cannot deadlock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

use crate::errors::VaultResult;
use crate::events::ContractEvent;
use crate::gate::TransferGate;
use crate::security::{Call, Response};
use crate::vault::Vault;

/// Cloneable, thread-safe handle to a single [`Vault`].
#[derive(Debug, Clone)]
pub struct SharedVault {
    inner: Arc<Mutex<Vault>>,
}

impl SharedVault {
    pub fn new(vault: Vault) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    pub fn deposit(&self, caller: AccountId, value: Amount) -> VaultResult<ContractEvent> {
        self.lock().deposit(caller, value)
    }

    pub fn withdraw<G>(
        &self,
        caller: AccountId,
        amount: Amount,
        gate: &mut G,
    ) -> VaultResult<ContractEvent>
    where
        G: TransferGate + ?Sized,
    {
        self.lock().withdraw(caller, amount, gate)
    }

    pub fn dispatch<G>(&self, call: Call, gate: &mut G) -> VaultResult<Response>
    where
        G: TransferGate + ?Sized,
    {
        self.lock().dispatch(call, gate)
    }

    pub fn vault_of(&self, account: &AccountId) -> Amount {
        self.lock().vault_of(account)
    }

    pub fn get_config(&self) -> (Amount, Amount) {
        self.lock().get_config()
    }

    /// Run `f` against a consistent view of the vault.
    pub fn read<R>(&self, f: impl FnOnce(&Vault) -> R) -> R {
        f(&self.lock())
    }

    // Withdrawals catch gate panics and roll back before returning, so a
    // poisoned lock never guards a half-applied operation.
    fn lock(&self) -> MutexGuard<'_, Vault> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
