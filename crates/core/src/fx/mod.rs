//! FX (Foreign Exchange) module - currency codes, rate tables, and normalization.

pub mod currency;
pub mod currency_normalizer;
mod fx_errors;
mod fx_model;
mod fx_traits;

pub use currency::{
    currency_alias, denormalization_multiplier, is_supported_currency, needs_conversion,
    normalize_amount, normalize_currency_code, CurrencyAlias,
};
pub use currency_normalizer::{normalize, CurrencyNormalizer};
pub use fx_errors::FxError;
pub use fx_model::{ExchangeRate, RateTable};
pub use fx_traits::RateProviderTrait;
