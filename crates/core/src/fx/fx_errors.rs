use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// No entry in the rate table for the pair. Never defaulted to 1.0.
    #[error("Exchange rate not available for {from} -> {to}")]
    RateUnavailable { from: String, to: String },

    #[error("Invalid exchange rate {rate} for {from} -> {to}: rates must be positive")]
    InvalidRate {
        from: String,
        to: String,
        rate: Decimal,
    },

    #[error("Currency '{0}' is not supported")]
    UnsupportedCurrency(String),
}
