use super::*;
use crate::cost_basis::CostBasisError;
use crate::errors::{Error, Result};
use crate::fx::{FxError, RateProviderTrait, RateTable};
use crate::ledger::{LedgerRepositoryTrait, Lot, NewSale, SaleEvent};
use crate::settings::EngineSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// --- Mock LedgerRepository ---
#[derive(Default)]
struct MockLedgerRepository {
    lots: Mutex<HashMap<(String, String), Vec<Lot>>>,
    sales: Mutex<HashMap<(String, String), Vec<SaleEvent>>>,
}

impl MockLedgerRepository {
    fn add_lot(&self, user_id: &str, lot: Lot) {
        self.lots
            .lock()
            .unwrap()
            .entry((user_id.to_string(), lot.ticker.clone()))
            .or_default()
            .push(lot);
    }

    fn stored_sales(&self, user_id: &str, ticker: &str) -> Vec<SaleEvent> {
        self.sales
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), ticker.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerRepositoryTrait for MockLedgerRepository {
    async fn find_lots(&self, user_id: &str, ticker: &str) -> Result<Vec<Lot>> {
        Ok(self
            .lots
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), ticker.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn find_sales(&self, user_id: &str, ticker: &str) -> Result<Vec<SaleEvent>> {
        Ok(self.stored_sales(user_id, ticker))
    }

    async fn list_tickers(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .lots
            .lock()
            .unwrap()
            .keys()
            .filter(|(user, _)| user == user_id)
            .map(|(_, ticker)| ticker.clone())
            .collect())
    }

    async fn create_sale(&self, user_id: &str, sale: SaleEvent) -> Result<SaleEvent> {
        self.sales
            .lock()
            .unwrap()
            .entry((user_id.to_string(), sale.ticker.clone()))
            .or_default()
            .push(sale.clone());
        Ok(sale)
    }
}

// --- Mock RateProvider ---
#[derive(Default)]
struct MockRateProvider {
    rates: RateTable,
    calls: AtomicUsize,
}

impl MockRateProvider {
    fn with_rate(from: &str, to: &str, rate: Decimal) -> Self {
        let mut rates = RateTable::new();
        rates.insert(from, to, rate).unwrap();
        MockRateProvider {
            rates,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProviderTrait for MockRateProvider {
    async fn rates_to(&self, _target_currency: &str) -> Result<RateTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rates.clone())
    }
}

const USER: &str = "user@example.com";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn lot(
    id: &str,
    units: Decimal,
    gross: Decimal,
    fee: Decimal,
    currency: &str,
    on: NaiveDate,
) -> Lot {
    Lot {
        id: id.to_string(),
        ticker: "JNJ".to_string(),
        units,
        gross_amount: gross,
        fee,
        tax: Decimal::ZERO,
        currency: currency.to_string(),
        is_reinvestment: false,
        acquired_at: on,
    }
}

fn new_sale(units: Decimal, amount: Decimal, currency: &str) -> NewSale {
    NewSale {
        ticker: "JNJ".to_string(),
        units,
        amount,
        fees: dec!(3),
        currency: currency.to_string(),
        date: date(2022, 2, 1),
    }
}

fn setup(
    rates: MockRateProvider,
) -> (Arc<MockLedgerRepository>, Arc<MockRateProvider>, SalesService) {
    let repository = Arc::new(MockLedgerRepository::default());
    repository.add_lot(
        USER,
        lot("jan", dec!(100), dec!(1000), dec!(5), "USD", date(2021, 1, 1)),
    );
    repository.add_lot(
        USER,
        lot("jun", dec!(100), dec!(1200), dec!(7), "USD", date(2021, 6, 1)),
    );
    let rates = Arc::new(rates);
    let service = SalesService::new(
        repository.clone(),
        rates.clone(),
        &EngineSettings::default(),
    );
    (repository, rates, service)
}

#[tokio::test]
async fn test_create_sale_persists_fifo_cost() {
    let (repository, rates, service) = setup(MockRateProvider::default());

    let sale = service
        .create_sale(USER, new_sale(dec!(120), dec!(1800), "USD"))
        .await
        .unwrap();

    assert!(!sale.id.is_empty());
    assert_eq!(sale.acquisition_value.round_dp(2), dec!(10.33));
    assert_eq!(sale.accumulated_fees, dec!(5));
    assert_eq!(sale.proceeds, dec!(1800));
    assert_eq!(sale.fee, dec!(3));
    assert_eq!(repository.stored_sales(USER, "JNJ"), vec![sale]);
    assert_eq!(rates.calls(), 0);
}

#[tokio::test]
async fn test_later_sale_prices_against_remaining_lots() {
    let (_repository, _rates, service) = setup(MockRateProvider::default());

    service
        .create_sale(USER, new_sale(dec!(120), dec!(1800), "USD"))
        .await
        .unwrap();
    let second = service
        .create_sale(USER, new_sale(dec!(80), dec!(1200), "$"))
        .await
        .unwrap();

    assert_eq!(second.acquisition_value, dec!(12));
    assert_eq!(second.accumulated_fees, dec!(7));
    assert_eq!(second.currency, "USD");
}

#[tokio::test]
async fn test_oversell_is_rejected_and_nothing_is_stored() {
    let (repository, _rates, service) = setup(MockRateProvider::default());

    let result = service
        .create_sale(USER, new_sale(dec!(201), dec!(3000), "USD"))
        .await;

    assert!(matches!(
        result,
        Err(Error::CostBasis(CostBasisError::InsufficientUnits { .. }))
    ));
    assert!(repository.stored_sales(USER, "JNJ").is_empty());
    assert_eq!(service.active_sale_locks(), 0);
}

#[tokio::test]
async fn test_invalid_sale_is_rejected_before_loading() {
    let (repository, _rates, service) = setup(MockRateProvider::default());

    let result = service
        .create_sale(USER, new_sale(Decimal::ZERO, dec!(10), "USD"))
        .await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(repository.stored_sales(USER, "JNJ").is_empty());
}

#[tokio::test]
async fn test_ledger_in_other_currency_is_converted() {
    let (repository, rates, service) =
        setup(MockRateProvider::with_rate("EUR", "USD", dec!(1.1)));
    repository.add_lot(
        USER,
        lot("eur", dec!(100), dec!(1000), dec!(10), "EUR", date(2020, 6, 1)),
    );

    let sale = service
        .create_sale(USER, new_sale(dec!(100), dec!(1500), "USD"))
        .await
        .unwrap();

    assert_eq!(sale.acquisition_value, dec!(11));
    assert_eq!(sale.accumulated_fees, dec!(11));
    assert_eq!(rates.calls(), 1);
}

#[tokio::test]
async fn test_missing_rate_is_reported() {
    let (repository, _rates, service) = setup(MockRateProvider::default());
    repository.add_lot(
        USER,
        lot("gbp", dec!(10), dec!(100), Decimal::ZERO, "GBP", date(2020, 6, 1)),
    );

    let result = service
        .create_sale(USER, new_sale(dec!(10), dec!(150), "USD"))
        .await;

    assert!(matches!(
        result,
        Err(Error::Fx(FxError::RateUnavailable { .. }))
    ));
}

#[tokio::test]
async fn test_pence_sale_is_recorded_in_pounds() {
    let (_repository, _rates, service) =
        setup(MockRateProvider::with_rate("USD", "GBP", dec!(0.8)));

    let sale = service
        .create_sale(USER, new_sale(dec!(10), dec!(1500), "GBp"))
        .await
        .unwrap();

    assert_eq!(sale.currency, "GBP");
    assert_eq!(sale.proceeds, dec!(15));
    assert_eq!(sale.fee, dec!(0.03));
    assert_eq!(sale.acquisition_value, dec!(8));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_sales_never_oversell() {
    let (repository, _rates, service) = setup(MockRateProvider::default());
    let service = Arc::new(service);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_sale(USER, new_sale(dec!(60), dec!(900), "USD"))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 3);
    let sold: Decimal = repository
        .stored_sales(USER, "JNJ")
        .iter()
        .map(|sale| sale.units)
        .sum();
    assert_eq!(sold, dec!(180));
    assert_eq!(service.active_sale_locks(), 0);
}

#[tokio::test]
async fn test_sale_locks_are_released_per_ticker() {
    let (repository, _rates, service) = setup(MockRateProvider::default());
    repository.add_lot(
        USER,
        Lot {
            ticker: "KO".to_string(),
            ..lot("ko", dec!(50), dec!(2500), dec!(2), "USD", date(2021, 2, 1))
        },
    );

    service
        .create_sale(USER, new_sale(dec!(10), dec!(150), "USD"))
        .await
        .unwrap();
    assert_eq!(service.active_sale_locks(), 0);

    let mut sale = new_sale(dec!(5), dec!(300), "USD");
    sale.ticker = "KO".to_string();
    service.create_sale(USER, sale).await.unwrap();
    service
        .create_sale("someone-else", new_sale(dec!(1), dec!(15), "USD"))
        .await
        .unwrap_err();

    assert_eq!(service.active_sale_locks(), 0);
}
