//! Ledger module - purchase lots, sale events, and their inputs.

mod ledger_model;
mod ledger_traits;

pub use ledger_model::*;
pub use ledger_traits::LedgerRepositoryTrait;
