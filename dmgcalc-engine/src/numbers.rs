//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a percent to `[0, 100]` and convert it to a probability fraction.
#[must_use]
pub fn percent_fraction(percent: i32) -> f64 {
    f64::from(percent.clamp(0, 100)) / 100.0
}

/// Convert usize to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Floor a non-negative fractional rank into an index, returning 0 for non-finite values.
#[must_use]
pub fn floor_to_index(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(0)
}

/// Ceil a non-negative fractional rank into an index, returning 0 for non-finite values.
#[must_use]
pub fn ceil_to_index(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.ceil()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_fraction_clamps_out_of_range() {
        assert!((percent_fraction(50) - 0.5).abs() < f64::EPSILON);
        assert!((percent_fraction(-20) - 0.0).abs() < f64::EPSILON);
        assert!((percent_fraction(250) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn index_rounders_handle_edges() {
        assert_eq!(floor_to_index(2.7), 2);
        assert_eq!(ceil_to_index(2.1), 3);
        assert_eq!(ceil_to_index(3.0), 3);
        assert_eq!(floor_to_index(f64::NAN), 0);
        assert_eq!(ceil_to_index(-1.0), 0);
    }

    #[test]
    fn widening_cast_is_exact_for_small_values() {
        assert!((usize_to_f64(12) - 12.0).abs() < f64::EPSILON);
    }
}
