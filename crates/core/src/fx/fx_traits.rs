use async_trait::async_trait;

use super::fx_model::RateTable;
use crate::errors::Result;

/// Source of conversion rates. The engine never fetches rates itself.
#[async_trait]
pub trait RateProviderTrait: Send + Sync {
    /// Rates from every known currency into `target_currency`.
    async fn rates_to(&self, target_currency: &str) -> Result<RateTable>;
}
