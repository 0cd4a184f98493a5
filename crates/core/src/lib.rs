//! Portfolio Analyzer Core - FIFO cost basis and valuation engine.
//!
//! This crate prices sales and held positions from per-(user, ticker) lot
//! ledgers. It is storage-agnostic and defines traits for the ledger store,
//! ticker data and exchange rates that callers implement.

pub mod constants;
pub mod cost_basis;
pub mod errors;
pub mod events;
pub mod fx;
pub mod ledger;
pub mod portfolio;
pub mod sales;
pub mod settings;

// Re-export the engine's entry points
pub use cost_basis::{CostBasisCalculator, ReinvestmentPolicy};
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
