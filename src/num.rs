//! Canonical wire formatting for prices, sizes and amounts.
//!
//! The exchange re-derives the decimal string from whatever it receives, and
//! the signature covers the encoded bytes. A formatting mismatch therefore
//! produces a perfectly valid signature over the wrong order, which the venue
//! rejects without any cryptographic error. Formatting here fails loudly
//! instead of rounding silently.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{Error, Result};

/// Relative round-trip tolerance for [`to_wire`].
const TOLERANCE: f64 = 1e-12;

/// A price snapped to the venue's tick rules.
///
/// Prices with more than five significant digits are only accepted by the
/// venue as whole numbers, so [`format_with_scale`] degrades to an integer in
/// that case and keeps the canonical decimal string otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scaled {
    Int(i64),
    Decimal(String),
}

/// Formats a value as the canonical wire decimal string.
///
/// The value is rendered with 8 decimal places, checked to round-trip within
/// `1e-12` relative error, stripped of trailing zeros, and `-0` is normalized
/// to `"0"`. Values that cannot be represented faithfully are rejected with
/// [`Error::PrecisionLoss`] rather than truncated.
pub fn to_wire(value: f64) -> Result<String> {
    if !value.is_finite() {
        return Err(Error::Overflow { value });
    }

    let fixed = format!("{value:.8}");
    let reparsed: f64 = fixed.parse().expect("fixed-point formatting is parseable");
    if (reparsed - value).abs() >= TOLERANCE * value.abs().max(1.0) {
        return Err(Error::PrecisionLoss {
            value: value.to_string(),
        });
    }

    let decimal: Decimal = fixed.parse().map_err(|_| Error::Overflow { value })?;
    Ok(normalized_string(decimal))
}

/// Rounds `value` to `decimals` places under the venue's tick-size rules.
///
/// The value is first reduced to 8 significant digits (mirroring what the
/// venue itself does before tick validation), then rounded half away from
/// zero. Results with more than five significant digits are truncated to a
/// whole number, since only integer prices are exempt from the five
/// significant digit limit.
pub fn format_with_scale(value: f64, decimals: u32) -> Result<Scaled> {
    if !value.is_finite() {
        return Err(Error::Overflow { value });
    }

    let reduced = reduce_significant(value)?;
    let rounded = reduced.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);

    if significant_figures(rounded) > 5 {
        let whole = rounded
            .trunc()
            .to_i64()
            .ok_or(Error::Overflow { value })?;
        Ok(Scaled::Int(whole))
    } else {
        Ok(Scaled::Decimal(normalized_string(rounded)))
    }
}

/// Reduces a float to 8 significant digits.
fn reduce_significant(value: f64) -> Result<Decimal> {
    let scientific = format!("{value:.7e}");
    Decimal::from_scientific(&scientific).map_err(|_| Error::Overflow { value })
}

/// Counts significant digits the way the venue counts them: trailing zeros in
/// the integer part are significant, trailing fractional zeros are not.
fn significant_figures(value: Decimal) -> usize {
    if value.is_zero() {
        return 1;
    }
    value
        .normalize()
        .mantissa()
        .unsigned_abs()
        .to_string()
        .len()
}

fn normalized_string(decimal: Decimal) -> String {
    let mut normalized = decimal.normalize();
    if normalized.is_zero() {
        normalized.set_sign_positive(true);
    }
    normalized.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_zeros() {
        assert_eq!(to_wire(105000.0).unwrap(), "105000");
        assert_eq!(to_wire(0.0001).unwrap(), "0.0001");
        assert_eq!(to_wire(1234.5678).unwrap(), "1234.5678");
        assert_eq!(to_wire(1.5).unwrap(), "1.5");
    }

    #[test]
    fn negative_zero_normalizes() {
        assert_eq!(to_wire(0.0).unwrap(), "0");
        assert_eq!(to_wire(-0.0).unwrap(), "0");
    }

    #[test]
    fn round_trip_within_tolerance() {
        for value in [0.5, 123.456, 0.00000001, 98765.4321, -42.42] {
            let wire = to_wire(value).unwrap();
            let reparsed: f64 = wire.parse().unwrap();
            assert!((reparsed - value).abs() < 1e-12 * value.abs().max(1.0));
        }
    }

    #[test]
    fn rejects_precision_loss() {
        // more than 8 decimal places of information
        assert!(matches!(
            to_wire(1.234567891e-9),
            Err(Error::PrecisionLoss { .. })
        ));
        assert!(matches!(
            to_wire(123.456789012345),
            Err(Error::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(to_wire(f64::NAN), Err(Error::Overflow { .. })));
        assert!(matches!(
            to_wire(f64::INFINITY),
            Err(Error::Overflow { .. })
        ));
    }

    #[test]
    fn scale_keeps_short_decimals() {
        assert_eq!(
            format_with_scale(0.000123456, 8).unwrap(),
            Scaled::Decimal("0.00012346".to_string())
        );
        assert_eq!(
            format_with_scale(1.2345, 4).unwrap(),
            Scaled::Decimal("1.2345".to_string())
        );
    }

    #[test]
    fn scale_degrades_to_integer() {
        // six significant digits: integer-price exemption applies
        assert_eq!(format_with_scale(105000.0, 1).unwrap(), Scaled::Int(105000));
        // truncated toward zero, not rounded
        assert_eq!(
            format_with_scale(123456.78, 1).unwrap(),
            Scaled::Int(123456)
        );
    }

    #[test]
    fn scale_rounds_half_away_from_zero() {
        assert_eq!(
            format_with_scale(0.123455, 5).unwrap(),
            Scaled::Decimal("0.12346".to_string())
        );
        assert_eq!(
            format_with_scale(-0.123455, 5).unwrap(),
            Scaled::Decimal("-0.12346".to_string())
        );
    }

    #[test]
    fn counts_significant_figures() {
        assert_eq!(significant_figures(Decimal::from(105000)), 6);
        assert_eq!(significant_figures("0.00012346".parse().unwrap()), 5);
        assert_eq!(significant_figures(Decimal::ZERO), 1);
        assert_eq!(significant_figures("1.50".parse().unwrap()), 2);
    }

    #[test]
    fn scaled_serializes_untagged() {
        assert_eq!(
            serde_json::to_string(&Scaled::Int(105000)).unwrap(),
            "105000"
        );
        assert_eq!(
            serde_json::to_string(&Scaled::Decimal("0.0001".into())).unwrap(),
            "\"0.0001\""
        );
    }
}
