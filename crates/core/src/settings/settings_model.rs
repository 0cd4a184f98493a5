use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{CONSUMPTION_EPSILON, DEFAULT_BASE_CURRENCY};
use crate::errors::{Error, Result};
use crate::fx::{is_supported_currency, normalize_currency_code};

/// Tunables for the cost basis engine and the services built on it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Currency used when a listing does not ask for one.
    pub base_currency: String,
    /// Unit remainders at or below this are treated as fully consumed.
    pub consumption_epsilon: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            consumption_epsilon: CONSUMPTION_EPSILON,
        }
    }
}

impl EngineSettings {
    /// Parses and validates settings. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.consumption_epsilon < Decimal::ZERO {
            return Err(Error::InvalidConfigValue(format!(
                "consumptionEpsilon cannot be negative, got {}",
                self.consumption_epsilon
            )));
        }
        if !is_supported_currency(&self.base_currency) {
            return Err(Error::InvalidConfigValue(format!(
                "baseCurrency '{}' is not supported",
                self.base_currency
            )));
        }
        Ok(())
    }

    /// Base currency as an ISO code.
    pub fn base_currency_code(&self) -> &str {
        normalize_currency_code(&self.base_currency)
    }
}
