//! Policy — the immutable global cap and per-withdrawal ceiling
//!
//! Validated exactly once, in [`Policy::new`]. There is no setter: a policy
//! that exists is a valid policy for the lifetime of the vault that owns it.

use serde::{Deserialize, Serialize};
use tracing::warn;
use vault_types::numeric::Amount;

use crate::errors::{PolicyError, VaultError, VaultResult};

/// Raw, unvalidated policy parameters as they appear in a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyParams {
    pub global_cap: Amount,
    pub withdrawal_ceiling: Amount,
}

/// Validated vault policy.
///
/// Invariants: `global_cap > 0`, `withdrawal_ceiling > 0`,
/// `withdrawal_ceiling <= global_cap`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyParams", into = "PolicyParams")]
pub struct Policy {
    global_cap: Amount,
    withdrawal_ceiling: Amount,
}

impl Policy {
    /// Validate and freeze the two limits.
    pub fn new(global_cap: Amount, withdrawal_ceiling: Amount) -> VaultResult<Self> {
        if global_cap.is_zero() || withdrawal_ceiling.is_zero() || withdrawal_ceiling > global_cap
        {
            warn!(
                global_cap = %global_cap,
                withdrawal_ceiling = %withdrawal_ceiling,
                "Rejected policy parameters"
            );
            return Err(VaultError::InvalidConstructorParams);
        }
        Ok(Self {
            global_cap,
            withdrawal_ceiling,
        })
    }

    /// Parse a JSON document such as
    /// `{"global_cap": "1000000", "withdrawal_ceiling": 5000}` and validate it.
    pub fn from_json(document: &str) -> Result<Self, PolicyError> {
        let params: PolicyParams = serde_json::from_str(document)?;
        Ok(Self::try_from(params)?)
    }

    /// Maximum aggregate custodied value.
    pub fn global_cap(&self) -> &Amount {
        &self.global_cap
    }

    /// Maximum value movable by a single withdrawal.
    pub fn withdrawal_ceiling(&self) -> &Amount {
        &self.withdrawal_ceiling
    }

    /// `(global_cap, withdrawal_ceiling)`
    pub fn as_pair(&self) -> (Amount, Amount) {
        (self.global_cap.clone(), self.withdrawal_ceiling.clone())
    }
}

impl TryFrom<PolicyParams> for Policy {
    type Error = VaultError;

    fn try_from(params: PolicyParams) -> Result<Self, Self::Error> {
        Policy::new(params.global_cap, params.withdrawal_ceiling)
    }
}

impl From<Policy> for PolicyParams {
    fn from(policy: Policy) -> Self {
        Self {
            global_cap: policy.global_cap,
            withdrawal_ceiling: policy.withdrawal_ceiling,
        }
    }
}
