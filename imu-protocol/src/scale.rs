//! Conversion of raw fixed-point fields to physical units.
//!
//! Signed 24-bit fields use a complement-and-negate rule rather than
//! subtracting 2^24: when bit 23 is set the magnitude is
//! `0xFFFFFF - raw + 1` and the result is `-(magnitude / divisor)`.

use crate::frame::U24;

/// LSB per deg/s for the gyro axes (2^12)
pub const GYRO_DIVISOR: f64 = 4096.0;

/// LSB per g for all accelerometer channels (2^15)
pub const ACCEL_DIVISOR: f64 = 32768.0;

/// LSB per °C for the temperature field
pub const TEMPERATURE_DIVISOR: f64 = 10.0;

/// Offset subtracted from the z accelerometer every frame, in g.
///
/// The sensor mounting is documented as sensing gravity on X, yet the
/// correction is applied to Z. Kept as-is until the mounting is confirmed.
pub const GRAVITY_OFFSET_Z: f64 = 1.0;

const SIGN_BIT: u32 = 1 << 23;

/// Recover a signed physical value from a 24-bit field.
pub fn scale_signed_24(raw: u32, divisor: f64) -> f64 {
    let raw = raw & U24::MAX;
    if raw & SIGN_BIT != 0 {
        let magnitude = U24::MAX - raw + 1;
        -(magnitude as f64 / divisor)
    } else {
        raw as f64 / divisor
    }
}

/// Inverse of [`scale_signed_24`]: scale back to counts and complement
/// negative values into 24 bits.
///
/// Values are rounded to the nearest count and saturate at the representable
/// extremes (-2^23 and 2^23 - 1 counts). NaN encodes as the positive
/// extreme, so callers must reject non-finite input themselves.
pub fn encode_signed_24(value: f64, divisor: f64) -> u32 {
    let counts = (value * divisor).round();
    if counts < 0.0 {
        let magnitude = (-counts).min(SIGN_BIT as f64) as u32;
        (U24::MAX - magnitude + 1) & U24::MAX
    } else {
        counts.min((SIGN_BIT - 1) as f64) as u32
    }
}

/// Gyro axis in deg/s from its assembled 24-bit value
pub fn gyro_dps(raw: u32) -> f64 {
    scale_signed_24(raw, GYRO_DIVISOR)
}

/// Accelerometer channel in g, without any gravity compensation
pub fn accel_g(raw: u32) -> f64 {
    scale_signed_24(raw, ACCEL_DIVISOR)
}

/// Temperature in °C. The field is unsigned.
pub fn temperature_celsius(raw: u16) -> f64 {
    raw as f64 / TEMPERATURE_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_positive_values() {
        assert_eq!(scale_signed_24(0, GYRO_DIVISOR), 0.0);
        assert_eq!(scale_signed_24(4096, GYRO_DIVISOR), 1.0);
        assert_eq!(scale_signed_24(32768, ACCEL_DIVISOR), 1.0);
        assert_eq!(scale_signed_24(0x7F_FFFF, ACCEL_DIVISOR), 8388607.0 / 32768.0);
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(scale_signed_24(0xFF_FFFF, GYRO_DIVISOR), -1.0 / 4096.0);
        assert_eq!(scale_signed_24(0xFF_F000, GYRO_DIVISOR), -1.0);
        assert_eq!(scale_signed_24(0xFF_8000, ACCEL_DIVISOR), -1.0);
        // Most negative representable value
        assert_eq!(scale_signed_24(0x80_0000, ACCEL_DIVISOR), -256.0);
    }

    #[test]
    fn test_matches_twos_complement() {
        for raw in (0..=U24::MAX).step_by(997).chain([0x80_0000, 0x7F_FFFF, U24::MAX]) {
            let signed = ((raw << 8) as i32) >> 8;
            assert_eq!(
                scale_signed_24(raw, ACCEL_DIVISOR),
                signed as f64 / ACCEL_DIVISOR,
                "raw {raw:#08x}"
            );
        }
    }

    #[test]
    fn test_round_trip_recovers_raw() {
        for divisor in [GYRO_DIVISOR, ACCEL_DIVISOR] {
            for raw in (0..=U24::MAX).step_by(251).chain([0x80_0000, 0x7F_FFFF, U24::MAX]) {
                let value = scale_signed_24(raw, divisor);
                assert_eq!(encode_signed_24(value, divisor), raw, "raw {raw:#08x}");
            }
        }
    }

    #[test]
    fn test_encode_saturates() {
        assert_eq!(encode_signed_24(1.0e9, GYRO_DIVISOR), 0x7F_FFFF);
        assert_eq!(encode_signed_24(-1.0e9, GYRO_DIVISOR), 0x80_0000);
    }

    #[test]
    fn test_temperature() {
        assert_relative_eq!(temperature_celsius(253), 25.3, epsilon = 1e-12);
        assert_eq!(temperature_celsius(0), 0.0);
        assert_relative_eq!(temperature_celsius(u16::MAX), 6553.5, epsilon = 1e-9);
    }

    #[test]
    fn test_field_helpers() {
        assert_eq!(gyro_dps(0xFF_F000), -1.0);
        assert_eq!(accel_g(U24::from_bytes([0x00, 0x80, 0x00]).value()), 1.0);
    }
}
