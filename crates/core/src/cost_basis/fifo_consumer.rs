//! First-in-first-out lot consumption.
//!
//! Consumption is a two-phase sweep over lots ordered by acquisition date:
//!
//! 1. Netting: units disposed of by prior sales are removed from the oldest
//!    lots first. Lots are zeroed in order and the lot where the remainder
//!    lands keeps a partial capacity.
//! 2. Consumption: a new quantity is taken from the first lot with capacity
//!    left, lot by lot, stopping at the first lot it only partially uses.
//!
//! Remaining capacity is derived on every call and never written back to the
//! lots.

use log::warn;
use rust_decimal::Decimal;

use super::cost_basis_errors::CostBasisError;
use crate::constants::CONSUMPTION_EPSILON;
use crate::ledger::Lot;

/// Units taken from one lot by a consumption.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSlice<'a> {
    pub lot: &'a Lot,
    pub units: Decimal,
    /// No capacity is left in the lot after this slice.
    pub exhausts_lot: bool,
}

/// The lots touched by consuming `units`, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Consumption<'a> {
    pub units: Decimal,
    pub slices: Vec<LotSlice<'a>>,
}

impl<'a> Consumption<'a> {
    pub fn exhausted_lots(&self) -> impl Iterator<Item = &'a Lot> + '_ {
        self.slices
            .iter()
            .filter(|slice| slice.exhausts_lot)
            .map(|slice| slice.lot)
    }
}

/// Remaining capacity of a set of lots after netting prior sales.
#[derive(Debug, Clone)]
pub struct FifoConsumer<'a> {
    lots: Vec<&'a Lot>,
    remaining: Vec<Decimal>,
    epsilon: Decimal,
}

impl<'a> FifoConsumer<'a> {
    /// Nets `already_sold` units against `lots` using [`CONSUMPTION_EPSILON`].
    pub fn new(lots: &'a [Lot], already_sold: Decimal) -> Result<Self, CostBasisError> {
        Self::with_epsilon(lots, already_sold, CONSUMPTION_EPSILON)
    }

    /// Lots may be passed in any order; they are ordered by `acquired_at`,
    /// keeping the given order for lots acquired on the same day.
    pub fn with_epsilon(
        lots: &'a [Lot],
        already_sold: Decimal,
        epsilon: Decimal,
    ) -> Result<Self, CostBasisError> {
        if already_sold < Decimal::ZERO {
            return Err(CostBasisError::InvalidQuantity(format!(
                "Already sold units cannot be negative, got {}",
                already_sold
            )));
        }

        let mut ordered: Vec<&'a Lot> = lots.iter().collect();
        ordered.sort_by_key(|lot| lot.acquired_at);

        let bought: Decimal = ordered.iter().map(|lot| lot.units).sum();
        if already_sold > bought + epsilon {
            warn!(
                "Ledger has {} units sold against {} units bought",
                already_sold, bought
            );
            return Err(CostBasisError::InconsistentLedger {
                sold: already_sold,
                bought,
            });
        }

        let remaining = net_prior_sales(&ordered, already_sold, epsilon);
        Ok(FifoConsumer {
            lots: ordered,
            remaining,
            epsilon,
        })
    }

    /// Lots in consumption order.
    pub fn lots(&self) -> &[&'a Lot] {
        &self.lots
    }

    /// Capacity left in each lot, aligned with [`FifoConsumer::lots`].
    pub fn remaining(&self) -> &[Decimal] {
        &self.remaining
    }

    pub fn available_units(&self) -> Decimal {
        self.remaining.iter().copied().sum()
    }

    /// Lots that still have capacity, with that capacity.
    pub fn remaining_lots(&self) -> impl Iterator<Item = (&'a Lot, Decimal)> + '_ {
        self.lots
            .iter()
            .zip(self.remaining.iter())
            .filter(|(_, remaining)| !remaining.is_zero())
            .map(|(lot, remaining)| (*lot, *remaining))
    }

    /// Determines which lots a disposal of `units` would touch.
    ///
    /// Fails with [`CostBasisError::InsufficientUnits`] before anything is
    /// derived when `units` exceeds the available capacity, by any amount. The
    /// epsilon only decides whether a lot's leftover counts as exhausted. The
    /// consumer itself is never modified, so a rejected call leaves no trace.
    pub fn consume(&self, units: Decimal) -> Result<Consumption<'a>, CostBasisError> {
        if units <= Decimal::ZERO {
            return Err(CostBasisError::InvalidQuantity(format!(
                "Units to consume must be positive, got {}",
                units
            )));
        }

        let available = self.available_units();
        if units > available {
            return Err(CostBasisError::InsufficientUnits {
                requested: units,
                available,
            });
        }

        let mut left = units;
        let mut slices = Vec::new();
        let capacities = self.lots.iter().copied().zip(self.remaining.iter().copied());
        for (lot, remaining) in capacities {
            if left.is_zero() {
                break;
            }
            if remaining.is_zero() {
                continue;
            }

            let taken = left.min(remaining);
            let exhausts_lot = remaining - taken <= self.epsilon;
            slices.push(LotSlice {
                lot,
                units: taken,
                exhausts_lot,
            });
            left -= taken;

            if !exhausts_lot {
                break;
            }
        }

        Ok(Consumption { units, slices })
    }
}

fn net_prior_sales(lots: &[&Lot], already_sold: Decimal, epsilon: Decimal) -> Vec<Decimal> {
    let mut remaining: Vec<Decimal> = lots.iter().map(|lot| lot.units).collect();
    let mut to_net = already_sold;

    for capacity in remaining.iter_mut() {
        if to_net <= epsilon {
            break;
        }
        if *capacity <= to_net + epsilon {
            to_net = (to_net - *capacity).max(Decimal::ZERO);
            *capacity = Decimal::ZERO;
        } else {
            *capacity -= to_net;
            break;
        }
    }

    remaining
}
