use rust_decimal::Decimal;

use super::currency::{denormalization_multiplier, normalize_amount, normalize_currency_code};
use super::fx_errors::FxError;
use super::fx_model::RateTable;
use crate::ledger::{Lot, LotLedger, SaleEvent};

/// Converts `amount` from `source` into `target` using `rate_table`.
///
/// Identical codes return the amount without a lookup. Minor units such as
/// `GBp` are scaled to their major currency before the lookup and back after
/// it, so pence and pounds convert without a rate. Any other missing pair is
/// reported, never defaulted.
pub fn normalize(
    amount: Decimal,
    source: &str,
    target: &str,
    rate_table: &RateTable,
) -> Result<Decimal, FxError> {
    if source.trim() == target.trim() {
        return Ok(amount);
    }

    let (major_amount, major_source) = normalize_amount(amount, source);
    let major_target = normalize_currency_code(target);

    let converted = if major_source == major_target {
        major_amount
    } else {
        let rate = rate_table
            .get(major_source, major_target)
            .ok_or_else(|| FxError::RateUnavailable {
                from: major_source.to_string(),
                to: major_target.to_string(),
            })?;
        major_amount * rate
    };

    Ok(converted * denormalization_multiplier(target))
}

/// Rewrites ledger records into a single target currency.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyNormalizer<'a> {
    rate_table: &'a RateTable,
    target_currency: &'a str,
}

impl<'a> CurrencyNormalizer<'a> {
    pub fn new(rate_table: &'a RateTable, target_currency: &'a str) -> Self {
        CurrencyNormalizer {
            rate_table,
            target_currency,
        }
    }

    pub fn target_currency(&self) -> &str {
        self.target_currency
    }

    pub fn normalize(&self, amount: Decimal, source: &str) -> Result<Decimal, FxError> {
        normalize(amount, source, self.target_currency, self.rate_table)
    }

    /// Converts gross amount, fee and tax. Units are untouched.
    pub fn normalize_lot(&self, lot: &Lot) -> Result<Lot, FxError> {
        let source = lot.currency.as_str();
        Ok(Lot {
            gross_amount: self.normalize(lot.gross_amount, source)?,
            fee: self.normalize(lot.fee, source)?,
            tax: self.normalize(lot.tax, source)?,
            currency: self.target_currency.to_string(),
            ..lot.clone()
        })
    }

    /// Converts proceeds, fee and the frozen acquisition figures.
    pub fn normalize_sale(&self, sale: &SaleEvent) -> Result<SaleEvent, FxError> {
        let source = sale.currency.as_str();
        Ok(SaleEvent {
            proceeds: self.normalize(sale.proceeds, source)?,
            fee: self.normalize(sale.fee, source)?,
            acquisition_value: self.normalize(sale.acquisition_value, source)?,
            accumulated_fees: self.normalize(sale.accumulated_fees, source)?,
            currency: self.target_currency.to_string(),
            ..sale.clone()
        })
    }

    /// Single-currency copy of `ledger`. Fails on the first record whose rate
    /// is missing.
    pub fn normalize_ledger(&self, ledger: &LotLedger) -> Result<LotLedger, FxError> {
        let lots = ledger
            .lots()
            .iter()
            .map(|lot| self.normalize_lot(lot))
            .collect::<Result<Vec<_>, _>>()?;
        let sales = ledger
            .sales()
            .iter()
            .map(|sale| self.normalize_sale(sale))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LotLedger::from_parts(ledger.ticker(), lots, sales))
    }
}
