//! Financial event types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An event announced for a ticker the user holds.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "eventType",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum FinancialEvent {
    /// Last day to hold the ticker to receive the next dividend.
    ExDividend {
        ticker: String,
        /// Per-unit amount of the dividend.
        dividend_value: Decimal,
        dividend_yield: Decimal,
        /// Held units times the per-unit amount.
        expected_amount: Decimal,
    },

    /// The next dividend is paid out.
    DividendPayment {
        ticker: String,
        dividend_value: Decimal,
        dividend_yield: Decimal,
        expected_amount: Decimal,
    },

    /// Earnings release.
    Earning { ticker: String },
}

impl FinancialEvent {
    pub fn ticker(&self) -> &str {
        match self {
            FinancialEvent::ExDividend { ticker, .. }
            | FinancialEvent::DividendPayment { ticker, .. }
            | FinancialEvent::Earning { ticker } => ticker,
        }
    }

    /// Expected cash for dividend events, zero for earnings.
    pub fn expected_amount(&self) -> Decimal {
        match self {
            FinancialEvent::ExDividend {
                expected_amount, ..
            }
            | FinancialEvent::DividendPayment {
                expected_amount, ..
            } => *expected_amount,
            FinancialEvent::Earning { .. } => Decimal::ZERO,
        }
    }
}

/// Events keyed by date, earliest first.
pub type EventCalendar = BTreeMap<NaiveDate, Vec<FinancialEvent>>;
