use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::fx::is_supported_currency;

/// An immutable purchase record.
///
/// Consumption by later sales is derived on demand by the FIFO consumer; the
/// stored lot is never mutated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub ticker: String,
    pub units: Decimal,
    /// Amount paid for the units, excluding fee and tax, in `currency`.
    pub gross_amount: Decimal,
    pub fee: Decimal,
    pub tax: Decimal,
    pub currency: String,
    /// The lot was bought with a reinvested dividend rather than new cash.
    pub is_reinvestment: bool,
    pub acquired_at: NaiveDate,
}

impl Lot {
    /// Gross amount plus fee and tax.
    pub fn total_cost(&self) -> Decimal {
        self.gross_amount + self.fee + self.tax
    }

    /// Per-unit price excluding fee and tax.
    pub fn unit_gross_price(&self) -> Decimal {
        if self.units.is_zero() {
            return Decimal::ZERO;
        }
        self.gross_amount / self.units
    }

    /// Per-unit cost including fee and tax, uniform across the lot.
    pub fn unit_total_cost(&self) -> Decimal {
        if self.units.is_zero() {
            return Decimal::ZERO;
        }
        self.total_cost() / self.units
    }

    /// Copy of this lot with a zero gross amount. Fee and tax are retained.
    pub fn as_zero_cost(&self) -> Lot {
        Lot {
            gross_amount: Decimal::ZERO,
            ..self.clone()
        }
    }
}

/// A completed disposal, frozen at the time it was recorded.
///
/// `acquisition_value` and `accumulated_fees` are not recomputed when earlier
/// buys are edited or deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleEvent {
    pub id: String,
    pub ticker: String,
    pub units: Decimal,
    pub proceeds: Decimal,
    pub fee: Decimal,
    pub currency: String,
    pub date: NaiveDate,
    /// Mean FIFO acquisition price per unit sold.
    pub acquisition_value: Decimal,
    /// Flat fees of the lots this sale fully liquidated.
    pub accumulated_fees: Decimal,
}

impl SaleEvent {
    /// Acquisition cost of the units sold, excluding fees.
    pub fn cost_basis(&self) -> Decimal {
        self.units * self.acquisition_value
    }

    /// Proceeds net of the sale fee, the acquisition cost and the liquidated lots' fees.
    pub fn realized_gain(&self) -> Decimal {
        self.proceeds - self.fee - self.cost_basis() - self.accumulated_fees
    }
}

/// Purchase lots and sale events of one (user, ticker).
///
/// Lots are kept ordered by `acquired_at` and sales by `date`; ties keep
/// insertion order.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotLedger {
    ticker: String,
    lots: Vec<Lot>,
    sales: Vec<SaleEvent>,
}

impl LotLedger {
    pub fn new(ticker: impl Into<String>) -> Self {
        LotLedger {
            ticker: ticker.into(),
            lots: Vec::new(),
            sales: Vec::new(),
        }
    }

    /// Builds a ledger from unordered records, as loaded from storage.
    pub fn from_parts(ticker: impl Into<String>, lots: Vec<Lot>, sales: Vec<SaleEvent>) -> Self {
        let mut ledger = LotLedger::new(ticker);
        for lot in lots {
            ledger.add_lot(lot);
        }
        for sale in sales {
            ledger.add_sale(sale);
        }
        ledger
    }

    /// Inserts after every lot acquired on or before the same date.
    pub fn add_lot(&mut self, lot: Lot) {
        let position = self
            .lots
            .partition_point(|existing| existing.acquired_at <= lot.acquired_at);
        self.lots.insert(position, lot);
    }

    pub fn add_sale(&mut self, sale: SaleEvent) {
        let position = self
            .sales
            .partition_point(|existing| existing.date <= sale.date);
        self.sales.insert(position, sale);
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Lots, oldest first.
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn sales(&self) -> &[SaleEvent] {
        &self.sales
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty() && self.sales.is_empty()
    }

    pub fn total_units(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.units).sum()
    }

    pub fn sold_units(&self) -> Decimal {
        sold_units(&self.sales)
    }

    pub fn reinvestment_units(&self) -> Decimal {
        self.lots
            .iter()
            .filter(|lot| lot.is_reinvestment)
            .map(|lot| lot.units)
            .sum()
    }

    /// Currency codes of every lot and sale, as recorded.
    pub fn currencies(&self) -> impl Iterator<Item = &str> + '_ {
        self.lots
            .iter()
            .map(|lot| lot.currency.as_str())
            .chain(self.sales.iter().map(|sale| sale.currency.as_str()))
    }

    pub fn last_buy_date(&self) -> Option<NaiveDate> {
        self.lots.last().map(|lot| lot.acquired_at)
    }
}

/// Total units disposed of by a set of sales.
pub fn sold_units(sales: &[SaleEvent]) -> Decimal {
    sales.iter().map(|sale| sale.units).sum()
}

/// Derived position summary for one ticker. Never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub ticker: String,
    pub total_units: Decimal,
    pub sold_units: Decimal,
    pub held_units: Decimal,
    pub reinvestment_units: Decimal,
    /// Acquisition date of the oldest lot that still has units after netting prior sales.
    pub earliest_remaining_buy_date: Option<NaiveDate>,
    pub last_buy_date: Option<NaiveDate>,
}

/// Input for recording a purchase.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBuy {
    pub ticker: String,
    pub units: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub taxes: Decimal,
    pub currency: String,
    #[serde(default, alias = "isDividendReinvestment")]
    pub is_reinvestment: bool,
    pub date: NaiveDate,
}

impl NewBuy {
    /// Validates the new buy data
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_ticker(&self.ticker)?;
        require_positive("units", self.units)?;
        require_non_negative("amount", self.amount)?;
        require_non_negative("fee", self.fee)?;
        require_non_negative("taxes", self.taxes)?;
        require_currency(&self.currency)
    }

    pub fn into_lot(self, id: impl Into<String>) -> Lot {
        Lot {
            id: id.into(),
            ticker: self.ticker.trim().to_string(),
            units: self.units,
            gross_amount: self.amount,
            fee: self.fee,
            tax: self.taxes,
            currency: self.currency,
            is_reinvestment: self.is_reinvestment,
            acquired_at: self.date,
        }
    }
}

/// Input for recording a sale. Acquisition figures are derived, not supplied.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub ticker: String,
    pub units: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub fees: Decimal,
    pub currency: String,
    pub date: NaiveDate,
}

impl NewSale {
    /// Validates the new sale data
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_ticker(&self.ticker)?;
        require_positive("units", self.units)?;
        require_non_negative("amount", self.amount)?;
        require_non_negative("fees", self.fees)?;
        require_currency(&self.currency)
    }
}

fn require_ticker(ticker: &str) -> std::result::Result<(), ValidationError> {
    if ticker.trim().is_empty() {
        return Err(ValidationError::MissingField("ticker".to_string()));
    }
    Ok(())
}

fn require_positive(field: &str, value: Decimal) -> std::result::Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "{} must be greater than zero, got {}",
            field, value
        )));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> std::result::Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "{} cannot be negative, got {}",
            field, value
        )));
    }
    Ok(())
}

fn require_currency(currency: &str) -> std::result::Result<(), ValidationError> {
    if currency.trim().is_empty() {
        return Err(ValidationError::MissingField("currency".to_string()));
    }
    if !is_supported_currency(currency) {
        return Err(ValidationError::InvalidInput(format!(
            "Currency '{}' is not supported",
            currency
        )));
    }
    Ok(())
}
