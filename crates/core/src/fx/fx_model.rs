use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::currency::normalize_currency_code;
use super::fx_errors::FxError;

/// One directed conversion rate: `1 from_currency = rate to_currency`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from_currency: String,
    pub to_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
}

impl ExchangeRate {
    pub fn new(from_currency: &str, to_currency: &str, rate: Decimal) -> Self {
        ExchangeRate {
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            rate,
        }
    }
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(6);
    serializer.serialize_str(&rounded.to_string())
}

/// Caller-supplied rates shaped as `source -> target -> multiplicative rate`.
///
/// Lookups are direct only: the table never inverts or chains pairs, so a
/// missing entry is always reported as [`FxError::RateUnavailable`].
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<String, HashMap<String, Decimal>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from the nested shape the rates collaborator produces.
    pub fn from_nested(nested: HashMap<String, HashMap<String, Decimal>>) -> Result<Self, FxError> {
        let mut table = RateTable::new();
        for (from, targets) in nested {
            for (to, rate) in targets {
                table.insert(&from, &to, rate)?;
            }
        }
        Ok(table)
    }

    pub fn from_exchange_rates(rates: Vec<ExchangeRate>) -> Result<Self, FxError> {
        let mut table = RateTable::new();
        for rate in rates {
            table.insert(&rate.from_currency, &rate.to_currency, rate.rate)?;
        }
        Ok(table)
    }

    /// Adds or replaces a rate. Currency codes are stored in normalized form.
    pub fn insert(&mut self, from: &str, to: &str, rate: Decimal) -> Result<(), FxError> {
        let from = normalize_currency_code(from);
        let to = normalize_currency_code(to);

        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                from: from.to_string(),
                to: to.to_string(),
                rate,
            });
        }
        if from == to {
            debug!("Ignoring identity rate {} -> {}", from, to);
            return Ok(());
        }

        self.rates
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), rate);
        Ok(())
    }

    /// Direct rate lookup on normalized codes.
    pub fn get(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates
            .get(normalize_currency_code(from))
            .and_then(|targets| targets.get(normalize_currency_code(to)))
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.values().all(HashMap::is_empty)
    }
}
