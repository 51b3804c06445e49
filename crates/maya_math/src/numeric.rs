//! Culture-invariant numeric helpers for Maya value tokens.
//!
//! Maya writes numbers with `.` as the decimal separator regardless of the
//! host locale, so token parsing never consults locale settings.

use glam::DMat4;

/// Tolerance used when deciding whether a float token is really an integer.
pub const INTEGER_EPSILON: f64 = 1e-6;

/// Parse a single token as a finite `f64`.
///
/// Accepts the forms Maya emits (`1`, `-2.5`, `1e-3`, `+4`, `.5`).
/// Comma decimals, empty tokens and non-finite values are rejected.
pub fn parse_float(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || token.contains(',') {
        return None;
    }

    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Round `value` to the nearest integer if it lies within `epsilon` of it.
pub fn snap_to_integer(value: f64, epsilon: f64) -> Option<i64> {
    let rounded = value.round();
    if (value - rounded).abs() > epsilon {
        return None;
    }
    // i64::MAX is not exactly representable; stay strictly inside the range
    if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
        return None;
    }
    Some(rounded as i64)
}

/// Convert 16 values in Maya's row-vector order into a glam matrix.
///
/// Maya stores translation in the last row; glam keeps it in `w_axis`.
/// The flat layouts coincide, so the values load directly as columns.
pub fn matrix_from_row_major(values: &[f64]) -> Option<DMat4> {
    let array: &[f64; 16] = values.try_into().ok()?;
    Some(DMat4::from_cols_array(array))
}
