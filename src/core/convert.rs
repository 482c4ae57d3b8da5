//! Fixed-point conversion of a canonical amount with a resolved rate.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::core::amount;
use crate::core::error::RateError;
use crate::core::rate::Rate;

const RESULT_DECIMALS: u32 = 2;

/// Converts `amount_text` with `rate`, rounding half to even to two decimals.
pub fn convert(amount_text: &str, rate: &Rate) -> Result<String, RateError> {
    let amount = Decimal::from_str(amount_text)
        .map_err(|e| RateError::InvalidAmount(format!("'{amount_text}' is not a number: {e}")))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RateError::InvalidAmount(format!(
            "amount must be >= 0, got {amount_text}"
        )));
    }
    if !amount::is_canonical(amount_text) {
        return Err(RateError::InvalidAmount(format!(
            "'{amount_text}' is not a canonical decimal amount"
        )));
    }
    if rate.value.is_sign_negative() {
        return Err(RateError::InvalidAmount(format!(
            "rate must be >= 0, got {}",
            rate.value
        )));
    }

    let product = amount.checked_mul(rate.value).ok_or_else(|| {
        RateError::InvalidAmount(format!("{amount_text} x {} overflows", rate.value))
    })?;

    let mut rounded =
        product.round_dp_with_strategy(RESULT_DECIMALS, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(RESULT_DECIMALS);
    Ok(rounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;

    fn rate(value: &str) -> Rate {
        Rate {
            from: Currency::Usd,
            to: Currency::Brl,
            value: Decimal::from_str(value).unwrap(),
        }
    }

    #[test]
    fn test_convert_uses_decimal_arithmetic() {
        assert_eq!(convert("100", &rate("5.1234")).unwrap(), "512.34");
        assert_eq!(convert("0.1", &rate("0.2")).unwrap(), "0.02");
        assert_eq!(convert("3", &rate("1")).unwrap(), "3.00");
        assert_eq!(convert("0", &rate("5.4")).unwrap(), "0.00");
    }

    #[test]
    fn test_convert_rounds_half_to_even() {
        // exact .5 at the third decimal goes to the even cent
        assert_eq!(convert("1", &rate("0.125")).unwrap(), "0.12");
        assert_eq!(convert("1", &rate("0.135")).unwrap(), "0.14");
        assert_eq!(convert("10", &rate("0.2345")).unwrap(), "2.34");
        assert_eq!(convert("10", &rate("0.2355")).unwrap(), "2.36");
        // not a midpoint: regular rounding
        assert_eq!(convert("1", &rate("0.1251")).unwrap(), "0.13");
    }

    #[test]
    fn test_convert_rejects_negative_amount() {
        let err = convert("-1", &rate("5")).unwrap_err();
        assert!(matches!(err, RateError::InvalidAmount(_)));
        assert!(err.to_string().contains("amount must be >= 0"));

        assert!(convert("-0.01", &rate("5")).is_err());
    }

    #[test]
    fn test_convert_rejects_non_canonical_amount() {
        for text in ["", "abc", "1,5", "123.", "+1", " 1"] {
            let result = convert(text, &rate("5"));
            assert!(
                matches!(result, Err(RateError::InvalidAmount(_))),
                "expected InvalidAmount for {text:?}"
            );
        }
    }

    #[test]
    fn test_convert_large_amount() {
        assert_eq!(
            convert("999999999999.999999", &rate("157")).unwrap(),
            "157000000000000.00"
        );
    }
}
