//! Recording sales against a user's FIFO lot ledger.

mod sales_service;

pub use sales_service::{SalesService, SalesServiceTrait};

#[cfg(test)]
mod sales_service_tests;
