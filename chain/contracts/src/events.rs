//! Audit events
//!
//! Events are immutable records emitted exactly once per successful
//! operation, after the state mutation they describe.

use serde::{Deserialize, Serialize};
use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

/// Deposit committed to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub account: AccountId,
    pub amount: Amount,
    pub new_balance: Amount,
    pub total_custodied: Amount,
}

/// Withdrawal committed and paid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub account: AccountId,
    pub amount: Amount,
    pub new_balance: Amount,
    pub total_custodied: Amount,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    Deposited(Deposited),
    Withdrawn(Withdrawn),
}

impl ContractEvent {
    /// Account the event concerns.
    pub fn account(&self) -> &AccountId {
        match self {
            ContractEvent::Deposited(e) => &e.account,
            ContractEvent::Withdrawn(e) => &e.account,
        }
    }
}
