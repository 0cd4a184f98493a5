use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use crate::constants::{CONSUMPTION_EPSILON, DECIMAL_PRECISION};
use crate::cost_basis::HeldPosition;
use crate::portfolio::valuation::{PortfolioSnapshot, TickerInfo, ValuationRecord};

/// Combines held positions with current ticker data.
///
/// Inputs are expected in one currency: the position's averages and the
/// ticker's price and dividends must already be normalized to `currency`.
#[derive(Debug, Clone)]
pub struct ValuationAggregator {
    epsilon: Decimal,
}

impl Default for ValuationAggregator {
    fn default() -> Self {
        Self::with_epsilon(CONSUMPTION_EPSILON)
    }
}

impl ValuationAggregator {
    pub fn with_epsilon(epsilon: Decimal) -> Self {
        ValuationAggregator { epsilon }
    }

    /// Values one position. Returns `None` when no units are held.
    pub fn value_position(
        &self,
        position: &HeldPosition,
        info: &TickerInfo,
        currency: &str,
    ) -> Option<ValuationRecord> {
        let holding = &position.holding;
        let units = holding.held_units;
        if units <= self.epsilon {
            debug!("Skipping {}: no units held", holding.ticker);
            return None;
        }

        let average_cost = position.average_cost;
        let average_cost_free = position.average_cost_reinvestment_free;
        let cost_basis = units * average_cost;
        let cost_basis_without_reinvestment = units * average_cost_free;
        let market_value = units * info.price;
        let unrealized_gain = market_value - cost_basis;
        let units_without_reinvestment = (units - holding.reinvestment_units).max(Decimal::ZERO);

        Some(ValuationRecord {
            ticker: holding.ticker.clone(),
            name: info.name.clone(),
            sector: info.sector.clone(),
            country: info.country.clone(),
            currency: currency.to_string(),
            units,
            units_without_reinvestment,
            price: info.price,
            average_cost,
            average_cost_reinvestment_free: average_cost_free,
            cost_basis,
            cost_basis_without_reinvestment,
            reinvested_cost: cost_basis - cost_basis_without_reinvestment,
            market_value,
            value_without_reinvestment: units_without_reinvestment * info.price,
            unrealized_gain,
            unrealized_gain_percent: ratio(unrealized_gain, cost_basis) * Decimal::ONE_HUNDRED,
            yield_on_cost: ratio(info.yearly_dividend_value, average_cost_free),
            yield_on_cost_at_cost: ratio(info.yearly_dividend_value, average_cost),
            yield_on_value: ratio(info.yearly_dividend_value, info.price),
            last_buy_date: holding.last_buy_date,
        })
    }

    /// Totals over `records`, which must all be in `currency`.
    pub fn snapshot(
        &self,
        records: &[ValuationRecord],
        currency: &str,
        date: NaiveDate,
    ) -> PortfolioSnapshot {
        let total_value: Decimal = records.iter().map(|r| r.market_value).sum();
        let total_value_without_reinvestment: Decimal =
            records.iter().map(|r| r.value_without_reinvestment).sum();
        let total_cost_basis: Decimal = records.iter().map(|r| r.cost_basis).sum();

        PortfolioSnapshot {
            date,
            currency: currency.to_string(),
            total_value,
            total_value_without_reinvestment,
            total_cost_basis,
            rate: growth_rate(total_value, total_cost_basis),
            rate_without_reinvestment: growth_rate(
                total_value_without_reinvestment,
                total_cost_basis,
            ),
            positions: records.len(),
        }
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator / denominator
}

fn growth_rate(value: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        return Decimal::ZERO;
    }
    ((value / cost - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
}
