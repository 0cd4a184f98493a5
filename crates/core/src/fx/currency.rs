use rust_decimal::Decimal;

use crate::constants::SUPPORTED_CURRENCIES;

/// A non-ISO code recorded by clients or quote sources, and the ISO currency
/// it stands for. One unit of the alias is `factor` units of `iso_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyAlias {
    pub iso_code: &'static str,
    pub factor: Decimal,
}

static DOLLAR_SIGN: CurrencyAlias = CurrencyAlias {
    iso_code: "USD",
    factor: Decimal::ONE,
};
static EURO_SIGN: CurrencyAlias = CurrencyAlias {
    iso_code: "EUR",
    factor: Decimal::ONE,
};
static POUND_SIGN: CurrencyAlias = CurrencyAlias {
    iso_code: "GBP",
    factor: Decimal::ONE,
};
// London listings quote in pence
static PENCE: CurrencyAlias = CurrencyAlias {
    iso_code: "GBP",
    factor: Decimal::from_parts(1, 0, 0, false, 2),
};

/// The alias entry for `code`, or `None` for ISO codes.
pub fn currency_alias(code: &str) -> Option<&'static CurrencyAlias> {
    match code.trim() {
        "$" => Some(&DOLLAR_SIGN),
        "€" => Some(&EURO_SIGN),
        "£" => Some(&POUND_SIGN),
        "GBp" | "GBX" => Some(&PENCE),
        _ => None,
    }
}

/// ISO code used for rate lookups. The amount is not touched.
pub fn normalize_currency_code(currency: &str) -> &str {
    currency_alias(currency).map_or(currency.trim(), |alias| alias.iso_code)
}

/// Expresses `amount` in the ISO currency behind `currency`.
pub fn normalize_amount(amount: Decimal, currency: &str) -> (Decimal, &str) {
    match currency_alias(currency) {
        Some(alias) => (amount * alias.factor, alias.iso_code),
        None => (amount, currency.trim()),
    }
}

/// Multiplier taking an ISO amount back into `currency` when it is a minor unit.
pub fn denormalization_multiplier(currency: &str) -> Decimal {
    currency_alias(currency)
        .filter(|alias| !alias.factor.is_zero())
        .map_or(Decimal::ONE, |alias| Decimal::ONE / alias.factor)
}

/// Whether buys and sales may be recorded in this currency.
pub fn is_supported_currency(currency: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&normalize_currency_code(currency))
}

/// Whether any of `currencies` maps to an ISO code other than `target`.
pub fn needs_conversion<'a, I>(currencies: I, target: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let target = normalize_currency_code(target);
    currencies
        .into_iter()
        .any(|code| normalize_currency_code(code) != target)
}
