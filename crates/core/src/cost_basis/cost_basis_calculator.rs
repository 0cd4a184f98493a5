use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cost_basis_errors::CostBasisError;
use super::fifo_consumer::FifoConsumer;
use crate::constants::CONSUMPTION_EPSILON;
use crate::ledger::{sold_units, Holding, Lot, LotLedger, SaleEvent};
use crate::settings::EngineSettings;

/// How reinvestment lots enter the held-cost average.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReinvestmentPolicy {
    /// Reinvestment lots count at their recorded cost.
    #[default]
    AtCost,
    /// Reinvestment lots count with a zero gross amount. Fee and tax are kept.
    AsFree,
}

/// Acquisition figures attributed to a sale.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleAcquisitionCost {
    pub units: Decimal,
    /// Mean FIFO gross price per unit sold.
    pub mean_cost: Decimal,
    /// Flat fees of the lots this sale exhausts.
    pub accumulated_fees: Decimal,
}

/// Holding summary plus both held-cost averages.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeldPosition {
    pub holding: Holding,
    pub average_cost: Decimal,
    pub average_cost_reinvestment_free: Decimal,
}

/// Prices sales and held units against a ledger using FIFO lot consumption.
///
/// The calculator is pure: every method reads its inputs and nothing else, so
/// the "record a sale" and "list portfolio" paths always agree.
#[derive(Debug, Clone)]
pub struct CostBasisCalculator {
    epsilon: Decimal,
}

impl Default for CostBasisCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostBasisCalculator {
    pub fn new() -> Self {
        Self::with_epsilon(CONSUMPTION_EPSILON)
    }

    pub fn with_epsilon(epsilon: Decimal) -> Self {
        CostBasisCalculator { epsilon }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::with_epsilon(settings.consumption_epsilon)
    }

    pub fn epsilon(&self) -> Decimal {
        self.epsilon
    }

    /// Acquisition cost of selling `sale_units` after `prior_sales`.
    ///
    /// The mean cost is the unit-weighted gross price of the lots the sale
    /// consumes. A lot's flat fee is accumulated only when this sale exhausts
    /// the lot. Lots and sales must already be in one currency.
    ///
    /// Callers must serialize sale creation per (user, ticker): two sales
    /// priced against the same prior sales would both consume the same lots.
    pub fn acquisition_cost_for_sale(
        &self,
        lots: &[Lot],
        prior_sales: &[SaleEvent],
        sale_units: Decimal,
    ) -> Result<SaleAcquisitionCost, CostBasisError> {
        let consumer = FifoConsumer::with_epsilon(lots, sold_units(prior_sales), self.epsilon)?;
        let consumption = consumer.consume(sale_units).map_err(|err| {
            warn!("Rejected sale of {} units: {}", sale_units, err);
            err
        })?;

        let mut weighted_sum = Decimal::ZERO;
        let mut accumulated_fees = Decimal::ZERO;
        for slice in &consumption.slices {
            weighted_sum += slice.units * slice.lot.unit_gross_price();
            if slice.exhausts_lot {
                accumulated_fees += slice.lot.fee;
            }
        }

        Ok(SaleAcquisitionCost {
            units: sale_units,
            mean_cost: weighted_sum / sale_units,
            accumulated_fees,
        })
    }

    /// Mean cost per held unit, fee and tax included.
    ///
    /// Returns zero when nothing is held.
    pub fn average_held_cost(
        &self,
        lots: &[Lot],
        prior_sales: &[SaleEvent],
        policy: ReinvestmentPolicy,
    ) -> Result<Decimal, CostBasisError> {
        let priced: Vec<Lot> = lots.iter().map(|lot| priced_lot(lot, policy)).collect();
        let already_sold = sold_units(prior_sales);

        if already_sold.is_zero() {
            let total_units: Decimal = priced.iter().map(|lot| lot.units).sum();
            if total_units.is_zero() {
                debug!("No units held, average cost is zero");
                return Ok(Decimal::ZERO);
            }
            let total_cost: Decimal = priced.iter().map(Lot::total_cost).sum();
            return Ok(total_cost / total_units);
        }

        let consumer = FifoConsumer::with_epsilon(&priced, already_sold, self.epsilon)?;
        let mut held_units = Decimal::ZERO;
        let mut held_cost = Decimal::ZERO;
        for (lot, remaining) in consumer.remaining_lots() {
            held_units += remaining;
            held_cost += remaining * lot.unit_total_cost();
        }

        if held_units <= self.epsilon {
            debug!("Position fully sold, average cost is zero");
            return Ok(Decimal::ZERO);
        }
        Ok(held_cost / held_units)
    }

    /// Unit totals and key dates of a ledger.
    pub fn holding(&self, ledger: &LotLedger) -> Result<Holding, CostBasisError> {
        let sold = ledger.sold_units();
        let consumer = FifoConsumer::with_epsilon(ledger.lots(), sold, self.epsilon)?;
        let earliest_remaining_buy_date = consumer
            .remaining_lots()
            .map(|(lot, _)| lot.acquired_at)
            .next();

        let total_units = ledger.total_units();
        Ok(Holding {
            ticker: ledger.ticker().to_string(),
            total_units,
            sold_units: sold,
            held_units: total_units - sold,
            reinvestment_units: ledger.reinvestment_units(),
            earliest_remaining_buy_date,
            last_buy_date: ledger.last_buy_date(),
        })
    }

    /// Holding summary with the average cost under both reinvestment policies.
    pub fn held_position(&self, ledger: &LotLedger) -> Result<HeldPosition, CostBasisError> {
        let holding = self.holding(ledger)?;
        let average_cost =
            self.average_held_cost(ledger.lots(), ledger.sales(), ReinvestmentPolicy::AtCost)?;
        let average_cost_reinvestment_free =
            self.average_held_cost(ledger.lots(), ledger.sales(), ReinvestmentPolicy::AsFree)?;

        Ok(HeldPosition {
            holding,
            average_cost,
            average_cost_reinvestment_free,
        })
    }
}

fn priced_lot(lot: &Lot, policy: ReinvestmentPolicy) -> Lot {
    match policy {
        ReinvestmentPolicy::AsFree if lot.is_reinvestment => lot.as_zero_cost(),
        _ => lot.clone(),
    }
}
