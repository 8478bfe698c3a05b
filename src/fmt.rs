use chrono::{Local, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount as dollars with thousands separators: $1,234.56
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs().round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero));
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Render a stored timestamp in local time.
pub fn local_datetime(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(Decimal::new(123456, 2)), "$1,234.56");
        assert_eq!(money(Decimal::new(-50000, 2)), "-$500.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
        assert_eq!(money(Decimal::new(100000099, 2)), "$1,000,000.99");
        assert_eq!(money(Decimal::new(421, 1)), "$42.10");
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(Decimal::new(12345, 3)), "$12.35");
        assert_eq!(money(Decimal::new(7, 0)), "$7.00");
    }

    #[test]
    fn test_local_datetime_round_trips_local_midnight() {
        let date = crate::dates::parse_date("2025-09-05").unwrap();
        let ts = crate::dates::start_of_day(date).unwrap();
        assert_eq!(local_datetime(ts), "2025-09-05 00:00");
    }
}
