//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

use crate::constants::{ENERGY_MAX, ENERGY_MIN};

/// Round a f64 half away from zero and clamp it to the i32 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i32(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i32, f64>(i32::MIN).unwrap_or(f64::MIN);
    let max = cast::<i32, f64>(i32::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i32>(clamped).unwrap_or(0)
}

/// Clamp an arbitrary energy value into the rider energy range.
#[must_use]
pub fn clamp_energy(value: i32) -> u8 {
    let clamped = value.clamp(i32::from(ENERGY_MIN), i32::from(ENERGY_MAX));
    cast::<i32, u8>(clamped).unwrap_or(ENERGY_MIN)
}

/// Clamp a probability into `[0, 1]`, mapping non-finite input to 0.
#[must_use]
pub fn clamp_probability(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Scale a small card or surcharge value by a weather factor, never dropping below `floor`.
#[must_use]
pub fn scale_u8(value: u8, factor: f64, floor: u8) -> u8 {
    let scaled = round_f64_to_i32(f64::from(value) * factor);
    let clamped = scaled.clamp(i32::from(floor), i32::from(u8::MAX));
    cast::<i32, u8>(clamped).unwrap_or(floor)
}

/// Convert a count into f64 for weighting maths.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a count into u32, saturating on overflow.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i32(1.6), 2);
        assert_eq!(round_f64_to_i32(4.5), 5);
        assert_eq!(round_f64_to_i32(f64::NAN), 0);
        assert_eq!(round_f64_to_i32(f64::from(i32::MAX) * 2.0), i32::MAX);
    }

    #[test]
    fn energy_clamps_both_ends() {
        assert_eq!(clamp_energy(-12), 0);
        assert_eq!(clamp_energy(140), 100);
        assert_eq!(clamp_energy(42), 42);
    }

    #[test]
    fn probability_handles_non_finite() {
        assert!(clamp_probability(f64::NAN).abs() < f64::EPSILON);
        assert!((clamp_probability(3.0) - 1.0).abs() < f64::EPSILON);
        assert!(clamp_probability(-0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn scale_respects_floor() {
        assert_eq!(scale_u8(1, 1.5, 1), 2);
        assert_eq!(scale_u8(2, 0.1, 1), 1);
        assert_eq!(scale_u8(2, 1.0, 1), 2);
    }
}
