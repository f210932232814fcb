//! Text-to-scalar coercion shared by token cursors and decoders.

use std::str::FromStr;

use crate::error::ScalarError;

/// Parse numeric text into an integral type.
///
/// Integral literals are converted exactly. Fractional or exponent literals
/// are accepted when finite and are truncated toward zero; the truncated
/// value must still fit the target type.
pub fn parse_integral<T: TryFrom<i128>>(text: &str) -> Result<T, ScalarError> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i128>() {
        return T::try_from(v).map_err(|_| ScalarError::OutOfRange);
    }

    let v = text.parse::<f64>().map_err(|_| ScalarError::Invalid)?;
    if v.is_nan() {
        return Err(ScalarError::Invalid);
    }
    let truncated = v.trunc();
    if !truncated.is_finite() || truncated < i128::MIN as f64 || truncated > i128::MAX as f64 {
        return Err(ScalarError::OutOfRange);
    }
    T::try_from(truncated as i128).map_err(|_| ScalarError::OutOfRange)
}

/// Parse numeric text into a floating point type.
///
/// `NaN`, `Infinity` and `-Infinity` are accepted.
pub fn parse_float<T: FromStr>(text: &str) -> Result<T, ScalarError> {
    text.trim().parse::<T>().map_err(|_| ScalarError::Invalid)
}

/// Parse `true` / `false` text.
pub fn parse_bool(text: &str) -> Result<bool, ScalarError> {
    match text.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        _ => Err(ScalarError::Invalid),
    }
}
