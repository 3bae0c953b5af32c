//! Token amount helpers
//!
//! Amounts are raw `u128` counts of the smallest unit. These helpers convert
//! between raw amounts and human-readable decimal strings ("1.5" with 18
//! decimals is `1_500_000_000_000_000_000`).

use thiserror::Error;

/// Amount parsing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountError {
    #[error("Empty amount")]
    Empty,
    #[error("Invalid amount: {0}")]
    InvalidDigits(String),
    #[error("Too many fractional digits: {got} (max {max})")]
    TooPrecise { got: usize, max: u8 },
    #[error("Amount overflows u128")]
    Overflow,
}

/// 10^decimals, or `None` if it does not fit in u128
fn unit(decimals: u8) -> Option<u128> {
    10u128.checked_pow(decimals as u32)
}

/// Format a raw amount as a decimal string with trailing zeros trimmed
pub fn format_units(amount: u128, decimals: u8) -> String {
    let Some(unit) = unit(decimals) else {
        return amount.to_string();
    };
    if decimals == 0 {
        return amount.to_string();
    }

    let whole = amount / unit;
    let frac = amount % unit;
    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a decimal string ("100", "0.5") into a raw amount
pub fn parse_units(input: &str, decimals: u8) -> Result<u128, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::InvalidDigits(input.to_string()));
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            got: frac.len(),
            max: decimals,
        });
    }

    let unit = unit(decimals).ok_or(AmountError::Overflow)?;
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };

    let frac_value: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded.parse().map_err(|_| AmountError::Overflow)?
    };

    whole
        .checked_mul(unit)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or(AmountError::Overflow)
}

/// Serde adapter encoding u128 amounts as decimal strings
///
/// JSON clients commonly lose precision past 2^53.
pub mod as_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(100 * ONE, 18), "100");
        assert_eq!(format_units(ONE + ONE / 2, 18), "1.5");
        assert_eq!(format_units(1, 18), "0.000000000000000001");
        assert_eq!(format_units(0, 18), "0");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("100", 18).unwrap(), 100 * ONE);
        assert_eq!(parse_units("1.5", 18).unwrap(), ONE + ONE / 2);
        assert_eq!(parse_units(".5", 18).unwrap(), ONE / 2);
        assert_eq!(parse_units("500", 0).unwrap(), 500);
    }

    #[test]
    fn test_parse_units_errors() {
        assert_eq!(parse_units("", 18), Err(AmountError::Empty));
        assert!(matches!(
            parse_units("1.2.3", 18),
            Err(AmountError::InvalidDigits(_))
        ));
        assert!(matches!(
            parse_units("-1", 18),
            Err(AmountError::InvalidDigits(_))
        ));
        assert_eq!(
            parse_units("0.5", 0),
            Err(AmountError::TooPrecise { got: 1, max: 0 })
        );
        assert_eq!(
            parse_units("999999999999999999999999", 18),
            Err(AmountError::Overflow)
        );
    }
}
