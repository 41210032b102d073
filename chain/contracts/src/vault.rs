//! Vault — the ledger engine
//!
//! Owns the [`Policy`] and the [`Ledger`] and is the only thing that mutates
//! them. Every state-changing operation runs in three phases:
//!
//! 1. checks: validate against policy and current balances, touch nothing
//! 2. effects: update the ledger to its post-operation value
//! 3. interactions: withdrawals only, pay out through the [`TransferGate`]
//!
//! A failed payout rolls the ledger and the event log back to where they were
//! before the withdrawal started, including anything a re-entering payee did
//! in between. Events emitted while a payout is in flight are staged and only
//! reach the log once the outermost withdrawal commits, so a payee cannot
//! drain an event that is later rolled back.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, warn};
use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

use crate::errors::{VaultError, VaultResult};
use crate::events::{ContractEvent, Deposited, Withdrawn};
use crate::gate::TransferGate;
use crate::ledger::Ledger;
use crate::policy::Policy;
use crate::security::{self, Call, Operation, Response, Screening};

/// Single-asset custody vault.
#[derive(Debug)]
pub struct Vault {
    policy: Policy,
    ledger: Ledger,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
    /// Events from operations nested inside an unfinished payout
    staged: Vec<ContractEvent>,
}

impl Vault {
    /// Create an empty vault governed by an already validated policy.
    pub fn new(policy: Policy) -> Self {
        info!(
            global_cap = %policy.global_cap(),
            withdrawal_ceiling = %policy.withdrawal_ceiling(),
            "Vault initialized"
        );
        Self {
            policy,
            ledger: Ledger::new(),
            events: Vec::new(),
            staged: Vec::new(),
        }
    }

    /// Validate the two limits and create an empty vault.
    ///
    /// Fails with `InvalidConstructorParams` if either limit is zero or the
    /// ceiling is above the cap; no vault exists in that case.
    pub fn construct(global_cap: Amount, withdrawal_ceiling: Amount) -> VaultResult<Self> {
        Ok(Self::new(Policy::new(global_cap, withdrawal_ceiling)?))
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Credit `value`, already received with the call, to `caller`.
    ///
    /// Checks, in order: `value > 0`, then `total + value <= cap`.
    pub fn deposit(&mut self, caller: AccountId, value: Amount) -> VaultResult<ContractEvent> {
        if value.is_zero() {
            return Err(self.reject("deposit", &caller, VaultError::ZeroAmount));
        }

        let attempted = self.ledger.total_custodied() + &value;
        if &attempted > self.policy.global_cap() {
            let err = VaultError::CapExceeded {
                attempted,
                cap: self.policy.global_cap().clone(),
            };
            return Err(self.reject("deposit", &caller, err));
        }

        let posting = self.ledger.credit(caller, &value);

        info!(
            account = %caller,
            amount = %value,
            new_balance = %posting.new_balance,
            total_custodied = %posting.total_custodied,
            "Deposit committed"
        );

        Ok(self.emit(ContractEvent::Deposited(Deposited {
            account: caller,
            amount: value,
            new_balance: posting.new_balance,
            total_custodied: posting.total_custodied,
        })))
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Debit `amount` from `caller` and pay it to the caller's own external
    /// account through `gate`.
    ///
    /// Checks, in order: `amount > 0`, `amount <= ceiling`,
    /// `balance >= amount`. The ledger is debited before the gate runs; if
    /// the gate reports failure (or panics) the whole withdrawal is undone
    /// and `NativeTransferFailed` is returned.
    pub fn withdraw<G>(
        &mut self,
        caller: AccountId,
        amount: Amount,
        gate: &mut G,
    ) -> VaultResult<ContractEvent>
    where
        G: TransferGate + ?Sized,
    {
        if amount.is_zero() {
            return Err(self.reject("withdraw", &caller, VaultError::ZeroAmount));
        }

        if &amount > self.policy.withdrawal_ceiling() {
            let err = VaultError::ThresholdExceeded {
                attempted: amount,
                threshold: self.policy.withdrawal_ceiling().clone(),
            };
            return Err(self.reject("withdraw", &caller, err));
        }

        let balance = self.ledger.balance_of(&caller);
        if balance < amount {
            let err = VaultError::InsufficientVault {
                balance,
                attempted: amount,
            };
            return Err(self.reject("withdraw", &caller, err));
        }

        let checkpoint = self.ledger.checkpoint();
        let staged_mark = self.staged.len();

        if let Err(err) = self.ledger.debit(caller, &amount) {
            self.ledger.rollback(checkpoint);
            return Err(self.reject("withdraw", &caller, err));
        }

        let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
            gate.transfer(self, &caller, &amount)
        }))
        .unwrap_or(false);

        if !delivered {
            self.ledger.rollback(checkpoint);
            self.staged.truncate(staged_mark);
            error!(
                account = %caller,
                amount = %amount,
                "Outbound transfer failed; withdrawal rolled back"
            );
            return Err(VaultError::NativeTransferFailed);
        }

        self.ledger.commit(checkpoint);
        if !self.ledger.in_checkpoint() {
            self.events.append(&mut self.staged);
        }

        // Read back after the payout: a re-entering payee may have moved it.
        let new_balance = self.ledger.balance_of(&caller);
        let total_custodied = self.ledger.total_custodied().clone();

        info!(
            account = %caller,
            amount = %amount,
            new_balance = %new_balance,
            total_custodied = %total_custodied,
            "Withdrawal committed"
        );

        Ok(self.emit(ContractEvent::Withdrawn(Withdrawn {
            account: caller,
            amount,
            new_balance,
            total_custodied,
        })))
    }

    // ───────────────────────── Host Entry Points ─────────────────────────

    /// Route a host call through the inflow guard to the matching operation.
    pub fn dispatch<G>(&mut self, call: Call, gate: &mut G) -> VaultResult<Response>
    where
        G: TransferGate + ?Sized,
    {
        if security::screen(&call)? == Screening::Ignore {
            return Ok(Response::Ignored);
        }

        let Call {
            caller,
            value,
            operation,
        } = call;

        match operation {
            Operation::Deposit => self.deposit(caller, value).map(Response::Event),
            Operation::Withdraw { amount } => {
                self.withdraw(caller, amount, gate).map(Response::Event)
            }
            Operation::VaultOf { account } => Ok(Response::Balance(self.vault_of(&account))),
            Operation::GetConfig => {
                let (global_cap, withdrawal_ceiling) = self.get_config();
                Ok(Response::Config {
                    global_cap,
                    withdrawal_ceiling,
                })
            }
            Operation::Transfer => Err(VaultError::DirectEthNotAllowed),
            Operation::Unknown { .. } => Ok(Response::Ignored),
        }
    }

    /// Value pushed at the vault with no call attached. Always rejected.
    pub fn receive(&mut self, sender: AccountId, value: Amount) -> VaultResult<()> {
        let call = Call::new(sender, Operation::Transfer).with_value(value);
        security::screen(&call).map(|_| ())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Balance held for `account`; zero if it never deposited.
    pub fn vault_of(&self, account: &AccountId) -> Amount {
        self.ledger.balance_of(account)
    }

    /// `(global_cap, withdrawal_ceiling)`
    pub fn get_config(&self) -> (Amount, Amount) {
        self.policy.as_pair()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn total_custodied(&self) -> &Amount {
        self.ledger.total_custodied()
    }

    pub fn deposit_count(&self) -> u64 {
        self.ledger.deposit_count()
    }

    pub fn withdrawal_count(&self) -> u64 {
        self.ledger.withdrawal_count()
    }

    pub fn account_count(&self) -> usize {
        self.ledger.account_count()
    }

    /// All account records, zero balances included.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Amount)> {
        self.ledger.accounts()
    }

    /// `true` if the recorded total equals the sum of account balances.
    pub fn is_balanced(&self) -> bool {
        &self.ledger.sum_of_balances() == self.ledger.total_custodied()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all committed events. Events from a payout still in flight are
    /// not visible until it commits.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ContractEvent) -> ContractEvent {
        if self.ledger.in_checkpoint() {
            self.staged.push(event.clone());
        } else {
            self.events.push(event.clone());
        }
        event
    }

    fn reject(&self, operation: &'static str, caller: &AccountId, err: VaultError) -> VaultError {
        warn!(
            operation,
            account = %caller,
            code = err.code(),
            reason = %err,
            "Operation rejected"
        );
        err
    }
}
