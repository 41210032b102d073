//! Host call model and the unsolicited-inflow guard
//!
//! The aggregate total is a ledger field, not a reading of what the vault
//! actually holds, so value that arrives anywhere other than `deposit` would
//! make it wrong forever. The guard screens every inbound [`Call`] before the
//! engine sees it:
//!
//! | operation              | value = 0 | value > 0             |
//! |------------------------|-----------|-----------------------|
//! | `Transfer` (bare)      | rejected  | rejected              |
//! | `Deposit`              | dispatch  | dispatch              |
//! | other known operations | dispatch  | rejected              |
//! | `Unknown`              | ignored   | rejected              |
//!
//! Rejections are `DirectEthNotAllowed`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vault_types::ids::AccountId;
use vault_types::numeric::Amount;

use crate::errors::{VaultError, VaultResult};
use crate::events::ContractEvent;

/// Entry point a call targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Value sent with no call data
    Transfer,
    Deposit,
    Withdraw { amount: Amount },
    VaultOf { account: AccountId },
    GetConfig,
    /// Call data that names no known operation
    Unknown { selector: Vec<u8> },
}

impl Operation {
    /// Only `deposit` may carry value.
    pub fn is_payable(&self) -> bool {
        matches!(self, Operation::Deposit)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Operation::Transfer => "transfer",
            Operation::Deposit => "deposit",
            Operation::Withdraw { .. } => "withdraw",
            Operation::VaultOf { .. } => "vault_of",
            Operation::GetConfig => "get_config",
            Operation::Unknown { .. } => "unknown",
        }
    }
}

/// An inbound invocation: who is calling, what value rides along, and which
/// operation it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub caller: AccountId,
    pub value: Amount,
    pub operation: Operation,
}

impl Call {
    /// A call that carries no value.
    pub fn new(caller: AccountId, operation: Operation) -> Self {
        Self {
            caller,
            value: Amount::zero(),
            operation,
        }
    }

    /// Attach `value` to the call.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }
}

/// Result of a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Event(ContractEvent),
    Balance(Amount),
    Config {
        global_cap: Amount,
        withdrawal_ceiling: Amount,
    },
    /// Zero-value call to an unknown operation
    Ignored,
}

/// Outcome of screening a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
    Dispatch,
    Ignore,
}

/// Decide whether `call` may reach the engine.
pub fn screen(call: &Call) -> VaultResult<Screening> {
    let carries_value = !call.value.is_zero();

    match &call.operation {
        Operation::Transfer => {
            warn!(
                caller = %call.caller,
                value = %call.value,
                "Rejected direct transfer into vault"
            );
            Err(VaultError::DirectEthNotAllowed)
        }
        Operation::Unknown { selector } if !carries_value => {
            debug!(
                caller = %call.caller,
                selector_len = selector.len(),
                "Ignoring zero-value call to unknown operation"
            );
            Ok(Screening::Ignore)
        }
        op if carries_value && !op.is_payable() => {
            warn!(
                caller = %call.caller,
                value = %call.value,
                operation = op.label(),
                "Rejected value attached to non-payable operation"
            );
            Err(VaultError::DirectEthNotAllowed)
        }
        _ => Ok(Screening::Dispatch),
    }
}
