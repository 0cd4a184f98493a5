//! Portfolio valuation: held positions priced against current ticker data.

mod valuation_calculator;
mod valuation_model;

pub use valuation_calculator::ValuationAggregator;
pub use valuation_model::{PortfolioSnapshot, TickerInfo, ValuationRecord};
