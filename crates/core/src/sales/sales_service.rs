use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::cost_basis::CostBasisCalculator;
use crate::errors::Result;
use crate::fx::{
    needs_conversion, normalize_amount, CurrencyNormalizer, RateProviderTrait, RateTable,
};
use crate::ledger::{LedgerRepositoryTrait, LotLedger, NewSale, SaleEvent};
use crate::settings::EngineSettings;

#[async_trait]
pub trait SalesServiceTrait: Send + Sync {
    /// Prices `new_sale` against the user's ledger and persists it.
    async fn create_sale(&self, user_id: &str, new_sale: NewSale) -> Result<SaleEvent>;
}

type SaleLockKey = (String, String);

pub struct SalesService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    rate_provider: Arc<dyn RateProviderTrait>,
    calculator: CostBasisCalculator,
    /// One lock per (user, ticker) so concurrent sales never price against
    /// the same prior sales.
    sale_locks: DashMap<SaleLockKey, Arc<Mutex<()>>>,
}

impl SalesService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        rate_provider: Arc<dyn RateProviderTrait>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            ledger_repository,
            rate_provider,
            calculator: CostBasisCalculator::from_settings(settings),
            sale_locks: DashMap::new(),
        }
    }

    fn sale_lock(&self, key: &SaleLockKey) -> Arc<Mutex<()>> {
        self.sale_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the entry once no other sale holds or waits on it. The shard
    /// stays locked during the check, so no clone can appear in between.
    fn release_sale_lock(&self, key: &SaleLockKey) {
        self.sale_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of (user, ticker) keys with a sale in flight.
    pub fn active_sale_locks(&self) -> usize {
        self.sale_locks.len()
    }

    /// Loads the ledger and converts it into `currency`, fetching rates only
    /// when some record is in another currency.
    async fn load_ledger(
        &self,
        user_id: &str,
        ticker: &str,
        currency: &str,
    ) -> Result<LotLedger> {
        let lots = self.ledger_repository.find_lots(user_id, ticker).await?;
        let sales = self.ledger_repository.find_sales(user_id, ticker).await?;
        let ledger = LotLedger::from_parts(ticker, lots, sales);

        let rate_table = if needs_conversion(ledger.currencies(), currency) {
            self.rate_provider.rates_to(currency).await?
        } else {
            RateTable::new()
        };

        Ok(CurrencyNormalizer::new(&rate_table, currency).normalize_ledger(&ledger)?)
    }

    /// Prices and persists the sale. Callers hold the ticker's sale lock.
    async fn record_sale(
        &self,
        user_id: &str,
        new_sale: &NewSale,
        ticker: String,
        proceeds: Decimal,
        fee: Decimal,
        currency: String,
    ) -> Result<SaleEvent> {
        let ledger = self.load_ledger(user_id, &ticker, &currency).await?;
        let cost = self
            .calculator
            .acquisition_cost_for_sale(ledger.lots(), ledger.sales(), new_sale.units)?;

        let sale = SaleEvent {
            id: Uuid::new_v4().to_string(),
            ticker,
            units: new_sale.units,
            proceeds,
            fee,
            currency,
            date: new_sale.date,
            acquisition_value: cost.mean_cost,
            accumulated_fees: cost.accumulated_fees,
        };
        debug!(
            "Recording sale of {} {} at mean cost {}",
            sale.units, sale.ticker, sale.acquisition_value
        );

        self.ledger_repository.create_sale(user_id, sale).await
    }
}

#[async_trait]
impl SalesServiceTrait for SalesService {
    async fn create_sale(&self, user_id: &str, new_sale: NewSale) -> Result<SaleEvent> {
        new_sale.validate()?;

        let ticker = new_sale.ticker.trim().to_string();
        let (proceeds, currency) = normalize_amount(new_sale.amount, &new_sale.currency);
        let (fee, _) = normalize_amount(new_sale.fees, &new_sale.currency);
        let currency = currency.to_string();

        let key = (user_id.to_string(), ticker.clone());
        let lock = self.sale_lock(&key);
        let result = {
            let _guard = lock.lock().await;
            self.record_sale(user_id, &new_sale, ticker, proceeds, fee, currency)
                .await
        };
        drop(lock);
        self.release_sale_lock(&key);
        result
    }
}
