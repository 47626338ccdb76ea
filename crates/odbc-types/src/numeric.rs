//! Fixed-point numeric rendering and parsing.
//!
//! Rendering is exact: the 128-bit magnitude is formatted as decimal digits
//! and the point is placed by the target scale, so no floating-point rounding
//! can creep in.

use crate::error::{Classification, ConversionError};
use crate::value::NumericStruct;

/// Largest number of decimal digits a 128-bit magnitude can always hold.
pub const MAX_NUMERIC_PRECISION: u8 = 38;

fn split_digits(magnitude: u128, scale: i8) -> (String, String) {
    let digits = magnitude.to_string();
    match scale {
        s if s > 0 => {
            let s = usize::from(s.unsigned_abs());
            let padded = if digits.len() <= s {
                format!("{}{digits}", "0".repeat(s + 1 - digits.len()))
            } else {
                digits
            };
            let (int, frac) = padded.split_at(padded.len() - s);
            (int.to_string(), frac.to_string())
        }
        0 => (digits, String::new()),
        s => {
            if magnitude == 0 {
                ("0".to_string(), String::new())
            } else {
                let zeros = usize::from(s.unsigned_abs());
                (format!("{digits}{}", "0".repeat(zeros)), String::new())
            }
        }
    }
}

/// Render `value` as decimal text for a target of `precision` and `scale`.
///
/// The struct's own precision and scale are ignored; the target's apply.
/// An integer part with more digits than `precision` is
/// [`ConversionError::NumericValueOutOfRange`]. When integer and fractional
/// digits together exceed `precision`, fractional digits are dropped and the
/// outcome is [`Classification::FractionalTruncation`].
pub fn numeric_to_text(
    value: &NumericStruct,
    precision: u8,
    scale: i8,
) -> Result<(String, Classification), ConversionError> {
    let magnitude = value.magnitude();
    let (int_part, mut frac_part) = split_digits(magnitude, scale);

    let int_digits = if int_part == "0" { 0 } else { int_part.len() };
    let precision = usize::from(precision);
    if int_digits > precision {
        return Err(ConversionError::NumericValueOutOfRange);
    }

    let mut classification = Classification::Success;
    if int_digits + frac_part.len() > precision {
        frac_part.truncate(precision - int_digits);
        classification = Classification::FractionalTruncation;
    }

    let mut text = String::with_capacity(int_part.len() + frac_part.len() + 2);
    if !value.positive && magnitude != 0 {
        text.push('-');
    }
    text.push_str(&int_part);
    if !frac_part.is_empty() {
        text.push('.');
        text.push_str(&frac_part);
    }
    Ok((text, classification))
}

fn all_zero(digits: &str) -> bool {
    digits.bytes().all(|b| b == b'0')
}

/// Parse decimal text into a numeric of the given `precision` and `scale`.
///
/// Leading/trailing whitespace and a leading sign are accepted. Fractional
/// digits beyond `scale` are dropped with
/// [`Classification::FractionalTruncation`] when any of them is non-zero.
pub fn numeric_from_text(
    text: &str,
    precision: u8,
    scale: i8,
) -> Result<(NumericStruct, Classification), ConversionError> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part) {
        return Err(ConversionError::InvalidCharacterValue);
    }

    let mut classification = Classification::Success;
    let mut unscaled = int_part.trim_start_matches('0').to_string();
    if scale >= 0 {
        let s = usize::from(scale.unsigned_abs());
        let (kept, dropped) = frac_part.split_at(frac_part.len().min(s));
        if !all_zero(dropped) {
            classification = Classification::FractionalTruncation;
        }
        unscaled.push_str(kept);
        unscaled.push_str(&"0".repeat(s - kept.len()));
    } else {
        let zeros = usize::from(scale.unsigned_abs());
        let cut = unscaled.len().saturating_sub(zeros);
        if !all_zero(&unscaled[cut..]) || !all_zero(frac_part) {
            classification = Classification::FractionalTruncation;
        }
        unscaled.truncate(cut);
    }

    let significant = unscaled.trim_start_matches('0');
    if significant.len() > usize::from(precision) {
        return Err(ConversionError::NumericValueOutOfRange);
    }
    let magnitude = if significant.is_empty() {
        0
    } else {
        significant
            .parse::<u128>()
            .map_err(|_| ConversionError::NumericValueOutOfRange)?
    };

    let value = NumericStruct::from_magnitude(precision, scale, !(negative && magnitude != 0), magnitude);
    Ok((value, classification))
}

#[cfg(feature = "decimal")]
mod decimal {
    use rust_decimal::Decimal;

    use super::MAX_NUMERIC_PRECISION;
    use crate::error::ConversionError;
    use crate::value::NumericStruct;

    impl TryFrom<&NumericStruct> for Decimal {
        type Error = ConversionError;

        fn try_from(value: &NumericStruct) -> Result<Self, Self::Error> {
            let magnitude =
                i128::try_from(value.magnitude()).map_err(|_| ConversionError::NumericValueOutOfRange)?;
            let signed = if value.positive { magnitude } else { -magnitude };
            let out_of_range = |_| ConversionError::NumericValueOutOfRange;
            if value.scale >= 0 {
                Decimal::try_from_i128_with_scale(signed, u32::from(value.scale.unsigned_abs()))
                    .map_err(out_of_range)
            } else {
                let factor = 10i128
                    .checked_pow(u32::from(value.scale.unsigned_abs()))
                    .and_then(|f| signed.checked_mul(f))
                    .ok_or(ConversionError::NumericValueOutOfRange)?;
                Decimal::try_from_i128_with_scale(factor, 0).map_err(out_of_range)
            }
        }
    }

    impl From<Decimal> for NumericStruct {
        fn from(value: Decimal) -> Self {
            let mantissa = value.mantissa();
            let magnitude = mantissa.unsigned_abs();
            let digits = u8::try_from(magnitude.to_string().len()).unwrap_or(MAX_NUMERIC_PRECISION);
            // Decimal scale never exceeds 28.
            let scale = i8::try_from(value.scale()).unwrap_or(i8::MAX);
            NumericStruct::from_magnitude(
                digits.max(1).min(MAX_NUMERIC_PRECISION),
                scale,
                mantissa >= 0,
                magnitude,
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn num(positive: bool, magnitude: u128) -> NumericStruct {
        NumericStruct::from_magnitude(0, 0, positive, magnitude)
    }

    #[test]
    fn test_render_basic() {
        let (text, c) = numeric_to_text(&num(true, 12345), 5, 2).unwrap();
        assert_eq!(text, "123.45");
        assert_eq!(c, Classification::Success);
        assert_eq!(numeric_to_text(&num(false, 12345), 5, 2).unwrap().0, "-123.45");
        assert_eq!(numeric_to_text(&num(true, 5), 3, 3).unwrap().0, "0.005");
        assert_eq!(numeric_to_text(&num(true, 123), 10, 0).unwrap().0, "123");
    }

    #[test]
    fn test_render_negative_scale_pads() {
        assert_eq!(numeric_to_text(&num(true, 123), 10, -2).unwrap().0, "12300");
        assert_eq!(numeric_to_text(&num(true, 0), 10, -2).unwrap().0, "0");
    }

    #[test]
    fn test_render_negative_zero_has_no_sign() {
        assert_eq!(numeric_to_text(&num(false, 0), 5, 2).unwrap().0, "0.00");
    }

    #[test]
    fn test_render_overflow_and_truncation() {
        assert_eq!(
            numeric_to_text(&num(true, 123456), 3, 2).unwrap_err(),
            ConversionError::NumericValueOutOfRange
        );
        let (text, c) = numeric_to_text(&num(true, 123456), 5, 3).unwrap();
        assert_eq!(text, "123.45");
        assert_eq!(c, Classification::FractionalTruncation);
        let (text, c) = numeric_to_text(&num(true, 1239), 3, 1).unwrap();
        assert_eq!(text, "123");
        assert_eq!(c, Classification::FractionalTruncation);
    }

    #[test]
    fn test_render_max_magnitude() {
        let (text, _) = numeric_to_text(&num(true, u128::MAX), 39, 0).unwrap();
        assert_eq!(text, u128::MAX.to_string());
    }

    #[test]
    fn test_parse_basic() {
        let (n, c) = numeric_from_text("123.45", 5, 2).unwrap();
        assert_eq!(n.magnitude(), 12345);
        assert!(n.positive);
        assert_eq!(c, Classification::Success);
        let (n, _) = numeric_from_text(" -0.5 ", 5, 2).unwrap();
        assert_eq!(n.magnitude(), 50);
        assert!(!n.positive);
        let (n, _) = numeric_from_text("-0", 5, 2).unwrap();
        assert!(n.positive);
    }

    #[test]
    fn test_parse_scale_adjustments() {
        let (n, c) = numeric_from_text("1.239", 5, 2).unwrap();
        assert_eq!(n.magnitude(), 123);
        assert_eq!(c, Classification::FractionalTruncation);
        let (n, c) = numeric_from_text("1.200", 5, 2).unwrap();
        assert_eq!(n.magnitude(), 120);
        assert_eq!(c, Classification::Success);
        let (n, c) = numeric_from_text("12300", 5, -2).unwrap();
        assert_eq!(n.magnitude(), 123);
        assert_eq!(c, Classification::Success);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            numeric_from_text("12a", 5, 0).unwrap_err(),
            ConversionError::InvalidCharacterValue
        );
        assert_eq!(numeric_from_text("", 5, 0).unwrap_err(), ConversionError::InvalidCharacterValue);
        assert_eq!(
            numeric_from_text("123456", 5, 0).unwrap_err(),
            ConversionError::NumericValueOutOfRange
        );
    }

    #[cfg(feature = "decimal")]
    #[test]
    fn test_decimal_interop() {
        use rust_decimal::Decimal;
        use std::str::FromStr;

        let d = Decimal::from_str("-123.45").unwrap();
        let n = NumericStruct::from(d);
        assert_eq!(n.magnitude(), 12345);
        assert_eq!(n.scale, 2);
        assert!(!n.positive);
        assert_eq!(Decimal::try_from(&n).unwrap(), d);

        let n = NumericStruct::from_magnitude(5, -2, true, 123);
        assert_eq!(Decimal::try_from(&n).unwrap(), Decimal::from(12300));
    }
}
