//! Portfolio valuation domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current market data for a ticker, as supplied by the ticker data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TickerInfo {
    pub ticker: String,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    /// Dividends paid per unit over a year.
    #[serde(default)]
    pub yearly_dividend_value: Decimal,
    #[serde(default)]
    pub yearly_dividend_yield: Decimal,
    /// Per-unit amount of the next announced dividend.
    #[serde(default)]
    pub next_dividend_value: Decimal,
    #[serde(default)]
    pub next_dividend_yield: Decimal,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub is_etf: bool,
    pub ex_dividend_date: Option<NaiveDate>,
    pub dividend_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub earning_dates: Vec<NaiveDate>,
}

/// Valuation of one held position. All amounts are in `currency`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub country: String,
    pub currency: String,
    pub units: Decimal,
    pub units_without_reinvestment: Decimal,
    pub price: Decimal,
    /// Mean cost per held unit with reinvestment lots at their recorded cost.
    pub average_cost: Decimal,
    /// Mean cost per held unit with reinvestment lots counted as free.
    pub average_cost_reinvestment_free: Decimal,
    pub cost_basis: Decimal,
    pub cost_basis_without_reinvestment: Decimal,
    /// Portion of the cost basis paid with reinvested dividends.
    pub reinvested_cost: Decimal,
    pub market_value: Decimal,
    pub value_without_reinvestment: Decimal,
    pub unrealized_gain: Decimal,
    pub unrealized_gain_percent: Decimal,
    /// Yearly dividend over the reinvestment-free average cost.
    pub yield_on_cost: Decimal,
    /// Yearly dividend over the at-cost average.
    pub yield_on_cost_at_cost: Decimal,
    pub yield_on_value: Decimal,
    pub last_buy_date: Option<NaiveDate>,
}

/// Portfolio-wide totals over a set of valuation records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub currency: String,
    pub total_value: Decimal,
    pub total_value_without_reinvestment: Decimal,
    pub total_cost_basis: Decimal,
    /// `(total_value / total_cost_basis - 1) * 100`, zero without cost basis.
    pub rate: Decimal,
    pub rate_without_reinvestment: Decimal,
    pub positions: usize,
}
