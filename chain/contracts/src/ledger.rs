//! Ledger store — per-account balances, aggregate total, operation counters
//!
//! Pure state plus a rollback journal. Every credit/debit moves the account
//! record and the aggregate total together, so `total_custodied == Σ balances`
//! holds whenever no mutation is in progress.
//!
//! While at least one [`Checkpoint`] is open, each mutation records the prior
//! values it overwrote. [`Ledger::rollback`] replays those records backwards,
//! which also undoes mutations made by nested operations opened after the
//! checkpoint.

use std::collections::HashMap;
use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

use crate::errors::{VaultError, VaultResult};

/// Prior values overwritten by a single mutation.
#[derive(Debug, Clone)]
struct UndoEntry {
    account: AccountId,
    /// `None` if the account had no record before the mutation
    prior_balance: Option<Amount>,
    prior_total: Amount,
    prior_deposit_count: u64,
    prior_withdrawal_count: u64,
}

/// Position in the journal to roll back to.
#[derive(Debug)]
#[must_use = "a checkpoint must be committed or rolled back"]
pub struct Checkpoint {
    journal_len: usize,
    depth: usize,
}

/// Balances after a successful credit or debit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub new_balance: Amount,
    pub total_custodied: Amount,
}

#[derive(Debug, Default)]
pub struct Ledger {
    balances: HashMap<AccountId, Amount>,
    total_custodied: Amount,
    deposit_count: u64,
    withdrawal_count: u64,
    journal: Vec<UndoEntry>,
    open_checkpoints: usize,
}

impl Ledger {
    /// Empty ledger: no records, zero total, zero counters.
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Balance of `account`, zero if it has never deposited.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    pub fn total_custodied(&self) -> &Amount {
        &self.total_custodied
    }

    pub fn deposit_count(&self) -> u64 {
        self.deposit_count
    }

    pub fn withdrawal_count(&self) -> u64 {
        self.withdrawal_count
    }

    /// Number of account records, including those drained to zero.
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.balances.iter()
    }

    /// Recompute `Σ balances` from the records.
    pub fn sum_of_balances(&self) -> Amount {
        self.balances.values().sum()
    }

    // ───────────────────────── Mutations ─────────────────────────

    /// Add `amount` to `account` and to the total; bump the deposit counter.
    ///
    /// Callers validate the amount against policy first.
    pub fn credit(&mut self, account: AccountId, amount: &Amount) -> Posting {
        self.record(account);

        let balance = self.balances.entry(account).or_default();
        *balance = &*balance + amount;
        let new_balance = balance.clone();

        self.total_custodied = &self.total_custodied + amount;
        self.deposit_count = self.deposit_count.saturating_add(1);

        Posting {
            new_balance,
            total_custodied: self.total_custodied.clone(),
        }
    }

    /// Subtract `amount` from `account` and from the total; bump the
    /// withdrawal counter. Nothing changes if the balance is too small.
    pub fn debit(&mut self, account: AccountId, amount: &Amount) -> VaultResult<Posting> {
        let balance = self.balance_of(&account);
        let new_balance =
            balance
                .checked_sub(amount)
                .ok_or_else(|| VaultError::InsufficientVault {
                    balance: balance.clone(),
                    attempted: amount.clone(),
                })?;
        // Unreachable while total == Σ balances.
        let new_total =
            self.total_custodied
                .checked_sub(amount)
                .ok_or_else(|| VaultError::InsufficientVault {
                    balance: self.total_custodied.clone(),
                    attempted: amount.clone(),
                })?;

        self.record(account);
        self.balances.insert(account, new_balance.clone());
        self.total_custodied = new_total;
        self.withdrawal_count = self.withdrawal_count.saturating_add(1);

        Ok(Posting {
            new_balance,
            total_custodied: self.total_custodied.clone(),
        })
    }

    // ───────────────────────── Journal ─────────────────────────

    /// Open a checkpoint. Mutations from here on are journaled.
    pub fn checkpoint(&mut self) -> Checkpoint {
        self.open_checkpoints += 1;
        Checkpoint {
            journal_len: self.journal.len(),
            depth: self.open_checkpoints,
        }
    }

    /// `true` while any checkpoint is open.
    pub fn in_checkpoint(&self) -> bool {
        self.open_checkpoints > 0
    }

    /// Keep every mutation made since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.close(checkpoint.depth);
    }

    /// Undo every mutation made since `checkpoint`, newest first.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.journal.len() > checkpoint.journal_len {
            let Some(entry) = self.journal.pop() else {
                break;
            };
            match entry.prior_balance {
                Some(prior) => {
                    self.balances.insert(entry.account, prior);
                }
                None => {
                    self.balances.remove(&entry.account);
                }
            }
            self.total_custodied = entry.prior_total;
            self.deposit_count = entry.prior_deposit_count;
            self.withdrawal_count = entry.prior_withdrawal_count;
        }
        self.close(checkpoint.depth);
    }

    /// Journal depth, for tests.
    #[cfg(test)]
    fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Closing a checkpoint also closes any nested one left open above it.
    fn close(&mut self, depth: usize) {
        self.open_checkpoints = depth.saturating_sub(1);
        if self.open_checkpoints == 0 {
            self.journal.clear();
        }
    }

    fn record(&mut self, account: AccountId) {
        if self.open_checkpoints == 0 {
            return;
        }
        self.journal.push(UndoEntry {
            account,
            prior_balance: self.balances.get(&account).cloned(),
            prior_total: self.total_custodied.clone(),
            prior_deposit_count: self.deposit_count,
            prior_withdrawal_count: self.withdrawal_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(v: u64) -> Amount {
        Amount::from(v)
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert_eq!(ledger.balance_of(&AccountId::new()), Amount::zero());
        assert!(ledger.total_custodied().is_zero());
        assert_eq!(ledger.deposit_count(), 0);
        assert_eq!(ledger.withdrawal_count(), 0);
        assert_eq!(ledger.account_count(), 0);
    }

    #[test]
    fn test_credit_accumulates() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();

        ledger.credit(acc, &amt(30));
        let posting = ledger.credit(acc, &amt(20));

        assert_eq!(posting.new_balance, amt(50));
        assert_eq!(posting.total_custodied, amt(50));
        assert_eq!(ledger.deposit_count(), 2);
    }

    #[test]
    fn test_debit_to_zero_keeps_record() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(10));

        let posting = ledger.debit(acc, &amt(10)).unwrap();
        assert_eq!(posting.new_balance, Amount::zero());
        assert_eq!(ledger.account_count(), 1);
        assert_eq!(ledger.withdrawal_count(), 1);
    }

    #[test]
    fn test_debit_insufficient_leaves_state() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(3));

        let err = ledger.debit(acc, &amt(4)).unwrap_err();
        assert_eq!(
            err,
            VaultError::InsufficientVault {
                balance: amt(3),
                attempted: amt(4)
            }
        );
        assert_eq!(ledger.balance_of(&acc), amt(3));
        assert_eq!(ledger.withdrawal_count(), 0);
    }

    #[test]
    fn test_no_journal_without_checkpoint() {
        let mut ledger = Ledger::new();
        ledger.credit(AccountId::new(), &amt(1));
        assert_eq!(ledger.journal_len(), 0);
    }

    #[test]
    fn test_rollback_restores_prior_state() {
        let mut ledger = Ledger::new();
        let alice = AccountId::new();
        let bob = AccountId::new();
        ledger.credit(alice, &amt(40));

        let cp = ledger.checkpoint();
        ledger.debit(alice, &amt(15)).unwrap();
        ledger.credit(bob, &amt(7));
        ledger.rollback(cp);

        assert_eq!(ledger.balance_of(&alice), amt(40));
        assert_eq!(ledger.total_custodied(), &amt(40));
        assert_eq!(ledger.account_count(), 1, "bob's new record is removed");
        assert_eq!(ledger.deposit_count(), 1);
        assert_eq!(ledger.withdrawal_count(), 0);
        assert_eq!(ledger.journal_len(), 0);
    }

    #[test]
    fn test_in_checkpoint_tracks_outermost() {
        let mut ledger = Ledger::new();
        assert!(!ledger.in_checkpoint());

        let outer = ledger.checkpoint();
        let inner = ledger.checkpoint();
        ledger.commit(inner);
        assert!(ledger.in_checkpoint());

        ledger.commit(outer);
        assert!(!ledger.in_checkpoint());
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(10));

        let cp = ledger.checkpoint();
        ledger.debit(acc, &amt(4)).unwrap();
        ledger.commit(cp);

        assert_eq!(ledger.balance_of(&acc), amt(6));
        assert_eq!(ledger.journal_len(), 0);
    }

    #[test]
    fn test_outer_rollback_undoes_committed_inner() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(10));

        let outer = ledger.checkpoint();
        ledger.debit(acc, &amt(2)).unwrap();

        let inner = ledger.checkpoint();
        ledger.debit(acc, &amt(3)).unwrap();
        ledger.commit(inner);
        assert_eq!(ledger.journal_len(), 2, "journal survives inner commit");

        ledger.rollback(outer);
        assert_eq!(ledger.balance_of(&acc), amt(10));
        assert_eq!(ledger.total_custodied(), &amt(10));
        assert_eq!(ledger.withdrawal_count(), 0);
    }

    #[test]
    fn test_inner_rollback_keeps_outer_changes() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(10));

        let outer = ledger.checkpoint();
        ledger.debit(acc, &amt(2)).unwrap();

        let inner = ledger.checkpoint();
        ledger.debit(acc, &amt(3)).unwrap();
        ledger.rollback(inner);

        assert_eq!(ledger.balance_of(&acc), amt(8));
        ledger.commit(outer);
        assert_eq!(ledger.balance_of(&acc), amt(8));
        assert_eq!(ledger.withdrawal_count(), 1);
    }

    #[test]
    fn test_outer_close_discards_abandoned_inner() {
        let mut ledger = Ledger::new();
        let acc = AccountId::new();
        ledger.credit(acc, &amt(10));

        let outer = ledger.checkpoint();
        ledger.debit(acc, &amt(1)).unwrap();
        let abandoned = ledger.checkpoint();
        ledger.debit(acc, &amt(1)).unwrap();
        std::mem::forget(abandoned);

        ledger.rollback(outer);
        assert_eq!(ledger.balance_of(&acc), amt(10));
        assert_eq!(ledger.journal_len(), 0);

        ledger.credit(acc, &amt(1));
        assert_eq!(ledger.journal_len(), 0, "no checkpoint left open");
    }

    #[test]
    fn test_sum_of_balances_matches_total() {
        let mut ledger = Ledger::new();
        for v in [5u64, 11, 23] {
            ledger.credit(AccountId::new(), &amt(v));
        }
        assert_eq!(&ledger.sum_of_balances(), ledger.total_custodied());
    }
}
