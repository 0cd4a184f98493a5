//! Portfolio listing: valuation of held positions, snapshots and events.

mod portfolio_service;
mod portfolio_traits;
pub mod valuation;

pub use portfolio_service::{PortfolioService, PortfolioServiceTrait};
pub use portfolio_traits::TickerInfoProviderTrait;
pub use valuation::*;
