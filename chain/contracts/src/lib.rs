//! Capped custody vault
//!
//! Single-asset custodial ledger: many depositors, one aggregate total, a hard
//! cap on that total and a hard ceiling on any single withdrawal.
//!
//! # Modules
//! - `errors`: Rejection taxonomy (`VaultError`)
//! - `events`: Audit records emitted after each committed operation
//! - `policy`: Immutable cap / ceiling pair, validated once
//! - `ledger`: Balances, aggregate total, counters and the rollback journal
//! - `gate`: Outbound value transfer boundary
//! - `security`: Host call model and the unsolicited-inflow guard
//! - `vault`: The engine (`deposit`, `withdraw`, queries)
//! - `shared`: Mutex-serialized handle for concurrent callers

pub mod errors;
pub mod events;
pub mod gate;
pub mod ledger;
pub mod policy;
pub mod security;
pub mod shared;
pub mod vault;

pub use errors::{VaultError, VaultResult};
pub use events::{ContractEvent, Deposited, Withdrawn};
pub use gate::{InMemoryGate, TransferGate};
pub use policy::Policy;
pub use security::{Call, Operation, Response};
pub use shared::SharedVault;
pub use vault::Vault;
