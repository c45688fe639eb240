//! Quantization of geographic coordinates.
//!
//! Parcel datasets share no stable key, so identity falls back to a quantized
//! vertex. Quantizing to integers avoids locale and float-formatting drift.

/// Decimal digits kept when quantizing a coordinate (~0.1 m at the equator).
pub const FINGERPRINT_DECIMALS: u32 = 6;

/// Grid step corresponding to [`FINGERPRINT_DECIMALS`].
pub const FINGERPRINT_EPSILON: f64 = 1e-6;

/// Canonicalize a floating-point value.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Round `v` to the nearest multiple of `10^-decimals`, expressed as an integer
/// count of grid steps. Ties round away from zero.
///
/// Returns `None` for non-finite input.
pub fn quantize(v: f64, decimals: u32) -> Option<i64> {
    let v = canonical_f64(v);
    if !v.is_finite() {
        return None;
    }
    let scale = 10f64.powi(decimals as i32);
    let q = (v * scale).round();
    if q.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(q as i64)
}

/// Format a quantized value back to a fixed-point decimal string.
pub fn format_quantized(q: i64, decimals: u32) -> String {
    let scale = 10i64.pow(decimals);
    let sign = if q < 0 { "-" } else { "" };
    let abs = q.unsigned_abs();
    let whole = abs / scale as u64;
    let frac = abs % scale as u64;
    if decimals == 0 {
        format!("{sign}{whole}")
    } else {
        format!("{sign}{whole}.{frac:0width$}", width = decimals as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::{FINGERPRINT_DECIMALS, canonical_f64, format_quantized, quantize};

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0), 0.0);
        assert_eq!(canonical_f64(0.0), 0.0);
    }

    #[test]
    fn quantize_rounds_to_grid() {
        assert_eq!(quantize(-74.0000004, FINGERPRINT_DECIMALS), Some(-74_000_000));
        assert_eq!(quantize(-74.0000006, FINGERPRINT_DECIMALS), Some(-74_000_001));
        assert_eq!(quantize(40.5, 0), Some(41));
        assert_eq!(quantize(f64::NAN, FINGERPRINT_DECIMALS), None);
        assert_eq!(quantize(f64::INFINITY, FINGERPRINT_DECIMALS), None);
    }

    #[test]
    fn formats_fixed_point() {
        assert_eq!(format_quantized(-74_000_001, 6), "-74.000001");
        assert_eq!(format_quantized(40_123_456, 6), "40.123456");
        assert_eq!(format_quantized(-5, 6), "-0.000005");
        assert_eq!(format_quantized(0, 6), "0.000000");
        assert_eq!(format_quantized(12, 0), "12");
    }
}
