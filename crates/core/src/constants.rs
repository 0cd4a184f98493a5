use rust_decimal::Decimal;

/// Unit remainders at or below this are treated as fully consumed (0.0001 units).
pub const CONSUMPTION_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Default currency for portfolio listings when the user has no preference
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Currencies a buy or sale may be recorded in
pub const SUPPORTED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;
