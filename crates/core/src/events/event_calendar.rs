use rust_decimal::Decimal;

use super::events_model::{EventCalendar, FinancialEvent};
use crate::portfolio::valuation::TickerInfo;

/// Lays out the dividend and earning dates of held positions.
///
/// Each item pairs held units with the ticker's current data. Positions with
/// no units are ignored. Events on the same date keep the input order.
pub fn build_event_calendar<'a, I>(positions: I) -> EventCalendar
where
    I: IntoIterator<Item = (Decimal, &'a TickerInfo)>,
{
    let mut calendar = EventCalendar::new();

    for (units, info) in positions {
        if units <= Decimal::ZERO {
            continue;
        }
        let expected_amount = units * info.next_dividend_value;

        if let Some(date) = info.ex_dividend_date {
            calendar
                .entry(date)
                .or_default()
                .push(FinancialEvent::ExDividend {
                    ticker: info.ticker.clone(),
                    dividend_value: info.next_dividend_value,
                    dividend_yield: info.next_dividend_yield,
                    expected_amount,
                });
        }

        if let Some(date) = info.dividend_payment_date {
            calendar
                .entry(date)
                .or_default()
                .push(FinancialEvent::DividendPayment {
                    ticker: info.ticker.clone(),
                    dividend_value: info.next_dividend_value,
                    dividend_yield: info.next_dividend_yield,
                    expected_amount,
                });
        }

        for date in &info.earning_dates {
            calendar
                .entry(*date)
                .or_default()
                .push(FinancialEvent::Earning {
                    ticker: info.ticker.clone(),
                });
        }
    }

    calendar
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn dividend_payer(ticker: &str) -> TickerInfo {
        TickerInfo {
            ticker: ticker.to_string(),
            price: dec!(60),
            currency: "USD".to_string(),
            next_dividend_value: dec!(0.485),
            next_dividend_yield: dec!(0.8),
            ex_dividend_date: Some(date(3, 14)),
            dividend_payment_date: Some(date(4, 1)),
            earning_dates: vec![date(2, 13), date(4, 23)],
            ..TickerInfo::default()
        }
    }

    #[test]
    fn test_calendar_is_ordered_by_date() {
        let ko = dividend_payer("KO");
        let calendar = build_event_calendar([(dec!(100), &ko)]);

        let dates: Vec<NaiveDate> = calendar.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date(2, 13), date(3, 14), date(4, 1), date(4, 23)]
        );
        assert_eq!(
            calendar[&date(3, 14)],
            vec![FinancialEvent::ExDividend {
                ticker: "KO".to_string(),
                dividend_value: dec!(0.485),
                dividend_yield: dec!(0.8),
                expected_amount: dec!(48.5),
            }]
        );
        assert_eq!(calendar[&date(2, 13)][0].expected_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_events_on_same_date_are_grouped() {
        let ko = dividend_payer("KO");
        let pep = dividend_payer("PEP");
        let calendar = build_event_calendar([(dec!(10), &ko), (dec!(20), &pep)]);

        let tickers: Vec<&str> = calendar[&date(4, 1)]
            .iter()
            .map(FinancialEvent::ticker)
            .collect();
        assert_eq!(tickers, vec!["KO", "PEP"]);
        assert_eq!(calendar[&date(4, 1)][1].expected_amount(), dec!(9.7));
    }

    #[test]
    fn test_positions_without_units_are_ignored() {
        let ko = dividend_payer("KO");
        let calendar = build_event_calendar([(Decimal::ZERO, &ko)]);

        assert!(calendar.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = FinancialEvent::Earning {
            ticker: "MSFT".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "earning");
        assert_eq!(json["ticker"], "MSFT");
    }
}
