//! Types library for the custody vault
//!
//! Shared primitives used by the ledger engine and its callers.
//!
//! # Modules
//! - `ids`: Account identity (`AccountId`)
//! - `numeric`: Unbounded non-negative amounts (`Amount`)
//! - `errors`: Parse errors for the primitives above

pub mod errors;
pub mod ids;
pub mod numeric;

