use super::ledger_model::{Lot, SaleEvent};
use crate::errors::Result;
use async_trait::async_trait;

/// Storage collaborator for buys and sales, scoped per user.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// All lots of `ticker` for the user, in any currency and any order.
    async fn find_lots(&self, user_id: &str, ticker: &str) -> Result<Vec<Lot>>;
    async fn find_sales(&self, user_id: &str, ticker: &str) -> Result<Vec<SaleEvent>>;
    /// Tickers the user has ever bought.
    async fn list_tickers(&self, user_id: &str) -> Result<Vec<String>>;
    async fn create_sale(&self, user_id: &str, sale: SaleEvent) -> Result<SaleEvent>;
}
