use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while consuming lots or pricing a position.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostBasisError {
    /// The sale asks for more units than the position holds. The sale must be rejected.
    #[error("Insufficient units: requested {requested}, only {available} held")]
    InsufficientUnits {
        requested: Decimal,
        available: Decimal,
    },

    /// Recorded sales already exceed recorded buys.
    #[error("Inconsistent ledger: {sold} units sold but only {bought} bought")]
    InconsistentLedger { sold: Decimal, bought: Decimal },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}
