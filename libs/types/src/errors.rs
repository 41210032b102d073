//! Error types for the shared primitives

use thiserror::Error;

/// Failure to parse an [`Amount`](crate::numeric::Amount) from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("Empty amount string")]
    Empty,

    #[error("Invalid amount: {input}")]
    InvalidDigits { input: String },
}

/// Failure to parse an [`AccountId`](crate::ids::AccountId) from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid account id: {input}")]
pub struct AccountIdParseError {
    pub input: String,
}
