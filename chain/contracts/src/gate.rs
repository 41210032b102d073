//! Value transfer gate — the outbound boundary
//!
//! The vault calls the gate only after the ledger already reflects the
//! withdrawal. The gate gets the paying vault back as `&mut Vault`, the same
//! way a payee on a shared execution host can call straight back into the
//! contract that is paying it.

use std::collections::{HashMap, HashSet};
use tracing::debug;
use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

use crate::vault::Vault;

/// Moves custodied value out to an account's external wallet.
pub trait TransferGate {
    /// Pay `amount` to `to`. Returns `true` only if the value actually moved.
    fn transfer(&mut self, vault: &mut Vault, to: &AccountId, amount: &Amount) -> bool;
}

impl<F> TransferGate for F
where
    F: FnMut(&mut Vault, &AccountId, &Amount) -> bool,
{
    fn transfer(&mut self, vault: &mut Vault, to: &AccountId, amount: &Amount) -> bool {
        self(vault, to, amount)
    }
}

/// In-process gate that credits external wallets held in memory.
///
/// Recipients marked with [`InMemoryGate::refuse`] reject incoming value,
/// which makes the transfer fail.
#[derive(Debug, Default)]
pub struct InMemoryGate {
    wallets: HashMap<AccountId, Amount>,
    refusing: HashSet<AccountId>,
    transfers: u64,
}

impl InMemoryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future transfer to `account` fail.
    pub fn refuse(&mut self, account: AccountId) {
        self.refusing.insert(account);
    }

    /// Accept transfers to `account` again.
    pub fn accept(&mut self, account: &AccountId) {
        self.refusing.remove(account);
    }

    /// Total value paid out to `account` so far.
    pub fn wallet_of(&self, account: &AccountId) -> Amount {
        self.wallets.get(account).cloned().unwrap_or_default()
    }

    /// Number of successful transfers.
    pub fn transfer_count(&self) -> u64 {
        self.transfers
    }
}

impl TransferGate for InMemoryGate {
    fn transfer(&mut self, _vault: &mut Vault, to: &AccountId, amount: &Amount) -> bool {
        if self.refusing.contains(to) {
            debug!(to = %to, amount = %amount, "Recipient refused transfer");
            return false;
        }
        let wallet = self.wallets.entry(*to).or_default();
        *wallet = &*wallet + amount;
        self.transfers += 1;
        true
    }
}
