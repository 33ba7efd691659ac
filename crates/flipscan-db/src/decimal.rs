//! Conversions between the engine's `f64` money values and `NUMERIC` columns.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::DbError;

/// Converts `value` to a [`Decimal`] rounded to `scale` places.
///
/// Non-finite values cannot be stored and are rejected.
pub(crate) fn to_decimal(
    column: &'static str,
    value: f64,
    scale: u32,
) -> Result<Decimal, DbError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(scale))
        .ok_or_else(|| DbError::InvalidColumn {
            column,
            reason: format!("{value} is not representable as NUMERIC"),
        })
}

pub(crate) fn to_f64(column: &'static str, value: Decimal) -> Result<f64, DbError> {
    value.to_f64().ok_or_else(|| DbError::InvalidColumn {
        column,
        reason: format!("{value} does not fit in f64"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_decimal_rounds_to_scale() {
        let d = to_decimal("price", 24.999, 2).unwrap();
        assert_eq!(d.to_string(), "25.00");
    }

    #[test]
    fn to_decimal_rejects_nan() {
        let err = to_decimal("price", f64::NAN, 2).unwrap_err();
        assert!(matches!(err, DbError::InvalidColumn { column: "price", .. }));
    }

    #[test]
    fn to_f64_reads_back_stored_value() {
        let d = to_decimal("roi_percent", 80.032_013, 4).unwrap();
        let back = to_f64("roi_percent", d).unwrap();
        assert!((back - 80.032).abs() < 1e-9);
    }
}
