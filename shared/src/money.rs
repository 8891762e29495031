//! Money conversion utilities using rust_decimal for precision
//!
//! Amounts arrive as JSON floats, strings, integers or integer cents.
//! They are converted to `Decimal` and rounded to 2 decimal places
//! (half-up) before they are stored or sent anywhere.

use rust_decimal::prelude::*;
use serde_json::Value;
use thiserror::Error;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("not a valid amount: {0}")]
    InvalidAmount(String),
}

/// Round to cents, midpoint away from zero, always carrying 2 decimal places
///
/// The fixed scale makes `17` serialize as `"17.00"`.
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DECIMAL_PLACES);
    rounded
}

/// Parse decimal text, accepting plain and scientific notation
pub fn parse_decimal(s: &str) -> Result<Decimal, MoneyError> {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| MoneyError::InvalidAmount(s.to_string()))
}

/// Read a JSON value as an exact decimal, without rounding
///
/// Floats go through their shortest round-trip text (`10.005` stays
/// `10.005` instead of `10.00499999999999989...`). `null` and empty
/// strings mean "absent".
pub fn decimal_from_json(value: &Value) -> Result<Option<Decimal>, MoneyError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(Decimal::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Some(Decimal::from(u)))
            } else {
                parse_decimal(&n.to_string()).map(Some)
            }
        }
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_decimal(s).map(Some),
        other => Err(MoneyError::InvalidAmount(other.to_string())),
    }
}

/// Read a JSON value as a currency amount rounded to cents
pub fn money_from_json(value: &Value) -> Result<Option<Decimal>, MoneyError> {
    Ok(decimal_from_json(value)?.map(round_money))
}

/// Convert integer cents to a currency amount
pub fn cents_to_amount(cents: Decimal) -> Decimal {
    round_money(cents / Decimal::ONE_HUNDRED)
}

/// Format as Canadian dollars: `CA$17.00`
pub fn format_cad(amount: Decimal) -> String {
    format!("CA${}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn money(v: Value) -> String {
        money_from_json(&v).unwrap().unwrap().to_string()
    }

    #[test]
    fn test_float_rounds_half_up() {
        assert_eq!(money(json!(10.005)), "10.01");
        assert_eq!(money(json!(10.004)), "10.00");
        assert_eq!(money(json!(2.675)), "2.68");
        assert_eq!(money(json!(-2.345)), "-2.35");
    }

    #[test]
    fn test_string_and_integer_inputs() {
        assert_eq!(money(json!("10.005")), "10.01");
        assert_eq!(money(json!(" 8.5 ")), "8.50");
        assert_eq!(money(json!(17)), "17.00");
        assert_eq!(money(json!(17.0)), "17.00");
        assert_eq!(money(json!("1.5e1")), "15.00");
    }

    #[test]
    fn test_float_sum_is_exact() {
        let a = decimal_from_json(&json!(0.1)).unwrap().unwrap();
        let b = decimal_from_json(&json!(0.2)).unwrap().unwrap();
        assert_eq!((a + b).to_string(), "0.3");
    }

    #[test]
    fn test_absent_values() {
        assert_eq!(money_from_json(&Value::Null).unwrap(), None);
        assert_eq!(money_from_json(&json!("")).unwrap(), None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(money_from_json(&json!("twelve")).is_err());
        assert!(money_from_json(&json!(true)).is_err());
        assert!(money_from_json(&json!([1])).is_err());
    }

    #[test]
    fn test_cents_to_amount() {
        assert_eq!(cents_to_amount(Decimal::from(1700)).to_string(), "17.00");
        assert_eq!(cents_to_amount(Decimal::from(85)).to_string(), "0.85");
        assert_eq!(cents_to_amount(Decimal::from(5)).to_string(), "0.05");
    }

    #[test]
    fn test_format_cad() {
        assert_eq!(format_cad(Decimal::from(17)), "CA$17.00");
        assert_eq!(format_cad(Decimal::new(8505, 3)), "CA$8.51");
    }
}
