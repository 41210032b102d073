//! Contract-specific error types
//!
//! Every rejection is terminal for the operation that raised it and carries
//! the data a caller needs to understand it without re-deriving state.

use thiserror::Error;
use vault_types::numeric::Amount;

/// Result alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Vault rejection taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("Global cap exceeded: attempted total {attempted}, cap {cap}")]
    CapExceeded { attempted: Amount, cap: Amount },

    #[error("Withdrawal ceiling exceeded: attempted {attempted}, threshold {threshold}")]
    ThresholdExceeded { attempted: Amount, threshold: Amount },

    #[error("Insufficient vault balance: balance {balance}, attempted {attempted}")]
    InsufficientVault { balance: Amount, attempted: Amount },

    #[error("Direct value transfers are not allowed; use deposit")]
    DirectEthNotAllowed,

    #[error("Native asset transfer failed")]
    NativeTransferFailed,

    #[error("Invalid constructor parameters")]
    InvalidConstructorParams,
}

impl VaultError {
    /// Stable, machine-readable kind name.
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::ZeroAmount => "ZeroAmount",
            VaultError::CapExceeded { .. } => "CapExceeded",
            VaultError::ThresholdExceeded { .. } => "ThresholdExceeded",
            VaultError::InsufficientVault { .. } => "InsufficientVault",
            VaultError::DirectEthNotAllowed => "DirectETHNotAllowed",
            VaultError::NativeTransferFailed => "NativeTransferFailed",
            VaultError::InvalidConstructorParams => "InvalidConstructorParams",
        }
    }
}

/// Errors loading a policy from a configuration document
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Malformed policy document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Policy rejected: {0}")]
    Invalid(#[from] VaultError),
}
