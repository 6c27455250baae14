//! Decimal amounts to and from a currency's smallest unit.
//!
//! Payment providers bill in integer minor units (cents for USD). Conversion
//! rounds half away from zero so fractional cents never truncate downwards.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("amount does not fit in the currency's minor units")]
    Overflow,
}

/// Look up an ISO 4217 currency by code, case-insensitively.
pub fn currency(code: &str) -> Result<&'static Currency, MoneyError> {
    Currency::find(&code.to_ascii_uppercase())
        .ok_or_else(|| MoneyError::UnknownCurrency(code.to_owned()))
}

/// Convert a decimal amount into minor units, rounding to the nearest unit.
pub fn to_minor_units(amount: Decimal, code: &str) -> Result<i64, MoneyError> {
    let currency = currency(code)?;

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or(MoneyError::Overflow)?;

    amount
        .checked_mul(scale)
        .ok_or(MoneyError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::Overflow)
}

/// Convert minor units back into a decimal amount.
pub fn from_minor_units(amount: i64, code: &str) -> Result<Decimal, MoneyError> {
    let currency = currency(code)?;

    Ok(*Money::from_minor(amount, currency).amount())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap_or_default()
    }

    #[test]
    fn converts_checkout_total_to_cents() -> TestResult {
        assert_eq!(to_minor_units(dec("28.50"), "usd")?, 2850);
        assert_eq!(to_minor_units(dec("0"), "USD")?, 0);

        Ok(())
    }

    #[test]
    fn rounds_half_cents_away_from_zero() -> TestResult {
        assert_eq!(to_minor_units(dec("10.005"), "usd")?, 1001);
        assert_eq!(to_minor_units(dec("10.004"), "usd")?, 1000);
        assert_eq!(to_minor_units(dec("19.999"), "usd")?, 2000);

        Ok(())
    }

    #[test]
    fn respects_zero_exponent_currencies() -> TestResult {
        assert_eq!(to_minor_units(dec("1500.5"), "jpy")?, 1501);

        Ok(())
    }

    #[test]
    fn round_trips_two_decimal_amounts() -> TestResult {
        for cents in (0_i64..=25_000).step_by(7) {
            let amount = Decimal::new(cents, 2);
            let minor = to_minor_units(amount, "usd")?;

            assert_eq!(minor, cents, "minor units for {amount}");
            assert_eq!(from_minor_units(minor, "usd")?, amount, "round trip of {amount}");
        }

        Ok(())
    }

    #[test]
    fn rejects_unknown_currency() {
        let result = to_minor_units(dec("1.00"), "zzz");

        assert_eq!(result, Err(MoneyError::UnknownCurrency("zzz".to_string())));
    }

    #[test]
    fn rejects_amounts_beyond_i64() {
        let result = to_minor_units(Decimal::MAX, "usd");

        assert_eq!(result, Err(MoneyError::Overflow));
    }
}
