/// The gain (in decibels) at and below which a signal is considered fully silent.
pub const MIN_GAIN_DB: f32 = -80.0;

/// Converts a gain in decibels into a linear amplitude factor.
///
/// Gains at or below [`MIN_GAIN_DB`] map to `0.0`.
#[inline]
pub fn decibels_to_linear(db: f32) -> f32 {
    if db <= MIN_GAIN_DB {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}

/// Converts a linear amplitude factor into a gain in decibels.
///
/// Non-positive amplitudes map to [`MIN_GAIN_DB`].
#[inline]
pub fn linear_to_decibels(linear: f32) -> f32 {
    if linear <= 0.0 {
        MIN_GAIN_DB
    } else {
        20.0 * linear.log10()
    }
}

/// Maps a signed 16-bit PCM sample onto the `[-1.0, 1.0]` float range.
#[inline]
pub fn map_i16_to_f32(sample: i16) -> f32 {
    -1.0 + (f32::from(sample) + 32768.0) / 65535.0 * 2.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unity_gain() {
        assert_eq!(1.0, decibels_to_linear(0.0));
        assert_eq!(0.0, linear_to_decibels(1.0));
    }

    #[test]
    fn silence_floor() {
        assert_eq!(0.0, decibels_to_linear(MIN_GAIN_DB));
        assert_eq!(0.0, decibels_to_linear(-120.0));
        assert_eq!(MIN_GAIN_DB, linear_to_decibels(0.0));
        assert_eq!(MIN_GAIN_DB, linear_to_decibels(-0.5));
    }

    #[test]
    fn pcm_extremes() {
        assert_eq!(-1.0, map_i16_to_f32(i16::MIN));
        assert_eq!(1.0, map_i16_to_f32(i16::MAX));
        assert!(map_i16_to_f32(0).abs() < 1.0e-4);
    }
}
