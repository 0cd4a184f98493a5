use async_trait::async_trait;
use std::collections::HashMap;

use crate::errors::Result;
use crate::portfolio::valuation::TickerInfo;

/// Source of current ticker data. Prices and dividends are in the ticker's
/// own currency.
#[async_trait]
pub trait TickerInfoProviderTrait: Send + Sync {
    /// Data for each requested ticker that the provider knows, keyed by ticker.
    async fn ticker_infos(&self, tickers: &[String]) -> Result<HashMap<String, TickerInfo>>;
}
