//! FIFO cost basis: lot consumption and the prices derived from it.

mod cost_basis_calculator;
mod cost_basis_errors;
pub mod fifo_consumer;

pub use cost_basis_calculator::{
    CostBasisCalculator, HeldPosition, ReinvestmentPolicy, SaleAcquisitionCost,
};
pub use cost_basis_errors::CostBasisError;
pub use fifo_consumer::{Consumption, FifoConsumer, LotSlice};
