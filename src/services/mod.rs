//! # Services Module
//!
//! External collaborators the voting client talks to: the ledger itself,
//! payer funding, and program deployment checks.

pub mod ledger;
pub mod funding;
pub mod deployment;

pub use ledger::{Ledger, RpcLedger};
