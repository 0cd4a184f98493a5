use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use std::sync::Arc;

use crate::cost_basis::{CostBasisCalculator, HeldPosition};
use crate::errors::{Error, Result};
use crate::events::{build_event_calendar, EventCalendar};
use crate::fx::{
    is_supported_currency, needs_conversion, normalize_currency_code, CurrencyNormalizer, FxError,
    RateProviderTrait, RateTable,
};
use crate::ledger::{LedgerRepositoryTrait, LotLedger};
use crate::portfolio::portfolio_traits::TickerInfoProviderTrait;
use crate::portfolio::valuation::{
    PortfolioSnapshot, TickerInfo, ValuationAggregator, ValuationRecord,
};
use crate::settings::EngineSettings;

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// Valuation of every held position, in `currency` or the base currency.
    async fn list_holdings(
        &self,
        user_id: &str,
        currency: Option<&str>,
    ) -> Result<Vec<ValuationRecord>>;

    async fn snapshot(
        &self,
        user_id: &str,
        currency: Option<&str>,
        date: NaiveDate,
    ) -> Result<PortfolioSnapshot>;

    /// Upcoming events of held positions, expected amounts in `currency`.
    async fn event_calendar(&self, user_id: &str, currency: Option<&str>)
        -> Result<EventCalendar>;
}

/// A held position with its ticker data, both in the listing currency.
struct PricedPosition {
    position: HeldPosition,
    info: TickerInfo,
}

pub struct PortfolioService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    ticker_info_provider: Arc<dyn TickerInfoProviderTrait>,
    rate_provider: Arc<dyn RateProviderTrait>,
    calculator: CostBasisCalculator,
    aggregator: ValuationAggregator,
    base_currency: String,
}

impl PortfolioService {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        ticker_info_provider: Arc<dyn TickerInfoProviderTrait>,
        rate_provider: Arc<dyn RateProviderTrait>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            ledger_repository,
            ticker_info_provider,
            rate_provider,
            calculator: CostBasisCalculator::from_settings(settings),
            aggregator: ValuationAggregator::with_epsilon(settings.consumption_epsilon),
            base_currency: settings.base_currency_code().to_string(),
        }
    }

    fn resolve_currency(&self, currency: Option<&str>) -> Result<String> {
        let code = currency
            .map(normalize_currency_code)
            .unwrap_or(self.base_currency.as_str());
        if !is_supported_currency(code) {
            return Err(FxError::UnsupportedCurrency(code.to_string()).into());
        }
        Ok(code.to_string())
    }

    /// Loads every ledger of the user, keeps the positions that still hold
    /// units, and converts them and their ticker data into `currency`. Rates
    /// are fetched only when some record or ticker is in another currency.
    async fn priced_positions(
        &self,
        user_id: &str,
        currency: &str,
    ) -> Result<Vec<PricedPosition>> {
        let tickers = self.ledger_repository.list_tickers(user_id).await?;

        let mut ledgers = Vec::new();
        for ticker in &tickers {
            let lots = self.ledger_repository.find_lots(user_id, ticker).await?;
            let sales = self.ledger_repository.find_sales(user_id, ticker).await?;
            let ledger = LotLedger::from_parts(ticker, lots, sales);

            let holding = self.calculator.holding(&ledger)?;
            if holding.held_units <= self.calculator.epsilon() {
                debug!("Skipping {}: position fully sold", ticker);
                continue;
            }
            ledgers.push(ledger);
        }
        if ledgers.is_empty() {
            debug!("User {} has no held positions", user_id);
            return Ok(Vec::new());
        }

        let held: Vec<String> = ledgers
            .iter()
            .map(|ledger| ledger.ticker().to_string())
            .collect();
        let mut infos = self.ticker_info_provider.ticker_infos(&held).await?;

        let record_currencies = ledgers.iter().flat_map(|ledger| ledger.currencies());
        let info_currencies = infos.values().map(|info| info.currency.as_str());
        let rate_table = if needs_conversion(record_currencies.chain(info_currencies), currency) {
            self.rate_provider.rates_to(currency).await?
        } else {
            RateTable::new()
        };
        let normalizer = CurrencyNormalizer::new(&rate_table, currency);

        ledgers
            .iter()
            .map(|ledger| -> Result<PricedPosition> {
                let info = infos.remove(ledger.ticker()).ok_or_else(|| {
                    warn!("No ticker data for held position {}", ledger.ticker());
                    Error::MarketData(format!("No ticker data for {}", ledger.ticker()))
                })?;
                let position = self
                    .calculator
                    .held_position(&normalizer.normalize_ledger(ledger)?)?;
                let info = normalize_ticker_info(&normalizer, info)?;
                Ok(PricedPosition { position, info })
            })
            .collect()
    }
}

/// Converts price and dividend amounts. Yields are ratios and stay as they are.
fn normalize_ticker_info(
    normalizer: &CurrencyNormalizer<'_>,
    info: TickerInfo,
) -> Result<TickerInfo> {
    let source = info.currency.clone();
    Ok(TickerInfo {
        price: normalizer.normalize(info.price, &source)?,
        yearly_dividend_value: normalizer.normalize(info.yearly_dividend_value, &source)?,
        next_dividend_value: normalizer.normalize(info.next_dividend_value, &source)?,
        currency: normalizer.target_currency().to_string(),
        ..info
    })
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn list_holdings(
        &self,
        user_id: &str,
        currency: Option<&str>,
    ) -> Result<Vec<ValuationRecord>> {
        let currency = self.resolve_currency(currency)?;
        let positions = self.priced_positions(user_id, &currency).await?;

        Ok(positions
            .iter()
            .filter_map(|priced| {
                self.aggregator
                    .value_position(&priced.position, &priced.info, &currency)
            })
            .collect())
    }

    async fn snapshot(
        &self,
        user_id: &str,
        currency: Option<&str>,
        date: NaiveDate,
    ) -> Result<PortfolioSnapshot> {
        let currency = self.resolve_currency(currency)?;
        let records = self.list_holdings(user_id, Some(&currency)).await?;
        Ok(self.aggregator.snapshot(&records, &currency, date))
    }

    async fn event_calendar(
        &self,
        user_id: &str,
        currency: Option<&str>,
    ) -> Result<EventCalendar> {
        let currency = self.resolve_currency(currency)?;
        let positions = self.priced_positions(user_id, &currency).await?;

        debug!("Building event calendar for {} positions", positions.len());

        Ok(build_event_calendar(positions.iter().map(|priced| {
            (priced.position.holding.held_units, &priced.info)
        })))
    }
}
