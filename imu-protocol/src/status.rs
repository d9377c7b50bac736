//! Main status word decoding
//!
//! The 16-bit status word at offsets 5..=6 packs the IMU's self-test results.
//! Most bits are fault indicators, so the decoded `*_ok` flags are true when
//! the corresponding bit is clear.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Raw status word with named bits.
    ///
    /// Unnamed bits (0..=3 and 8) are retained by `from_bits_retain` so the
    /// full word can still be logged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusWord: u16 {
        /// High-g sensor present on all axes
        const HIGH_G_ALL_AXES = 1 << 4;
        /// Accelerometer X failure
        const ACC_X_FAIL = 1 << 5;
        /// Accelerometer Y failure
        const ACC_Y_FAIL = 1 << 6;
        /// Accelerometer Z failure
        const ACC_Z_FAIL = 1 << 7;
        /// Gyro X failure
        const GYRO_X_FAIL = 1 << 9;
        /// Gyro Y failure
        const GYRO_Y_FAIL = 1 << 10;
        /// Gyro Z failure
        const GYRO_Z_FAIL = 1 << 11;
        /// External sync signal missing
        const NO_SYNC = 1 << 12;
        /// Built-in test running
        const BIT = 1 << 13;
        /// Fault (only meaningful together with `BIT`)
        const FAULT = 1 << 14;
        /// Gyro measurement out of range
        const GYRO_RANGE_EXCEEDED = 1 << 15;
    }
}

/// Mask covering the two operating-mode bits
pub const MODE_MASK: u16 = 0x6000;

/// Operating mode encoded in bits 13 and 14
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingMode {
    /// Both mode bits clear
    Normal,
    /// Bit 13 set, bit 14 clear
    BuiltInTest,
    /// Bits 13 and 14 both set
    Fault,
    /// Bit 14 set without bit 13. No flag in [`StatusFlags`] covers this
    /// combination; it is reported as-is.
    Reserved,
}

/// Health flags decoded from one status word.
///
/// A plain value recomputed for every frame; nothing carries over between
/// frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    pub high_g_sensor_in_all_axes: bool,
    pub acc_x_ok: bool,
    pub acc_y_ok: bool,
    pub acc_z_ok: bool,
    pub gyro_x_ok: bool,
    pub gyro_y_ok: bool,
    pub gyro_z_ok: bool,
    pub sync_signal_exists: bool,
    pub normal_mode: bool,
    /// Built-in test mode (bit 13 set)
    pub bit_mode: bool,
    pub fault_mode: bool,
    pub gyro_ranges_ok: bool,
}

impl StatusFlags {
    /// Decode a raw status word. Total and pure.
    pub fn from_word(word: u16) -> Self {
        let w = StatusWord::from_bits_retain(word);
        Self {
            high_g_sensor_in_all_axes: w.contains(StatusWord::HIGH_G_ALL_AXES),
            acc_x_ok: !w.contains(StatusWord::ACC_X_FAIL),
            acc_y_ok: !w.contains(StatusWord::ACC_Y_FAIL),
            acc_z_ok: !w.contains(StatusWord::ACC_Z_FAIL),
            gyro_x_ok: !w.contains(StatusWord::GYRO_X_FAIL),
            gyro_y_ok: !w.contains(StatusWord::GYRO_Y_FAIL),
            gyro_z_ok: !w.contains(StatusWord::GYRO_Z_FAIL),
            sync_signal_exists: !w.contains(StatusWord::NO_SYNC),
            normal_mode: word & MODE_MASK == 0,
            bit_mode: w.contains(StatusWord::BIT),
            fault_mode: w.contains(StatusWord::BIT | StatusWord::FAULT),
            gyro_ranges_ok: !w.contains(StatusWord::GYRO_RANGE_EXCEEDED),
        }
    }

    /// Operating mode implied by the flags
    pub fn mode(&self) -> OperatingMode {
        match (self.normal_mode, self.bit_mode, self.fault_mode) {
            (true, _, _) => OperatingMode::Normal,
            (_, _, true) => OperatingMode::Fault,
            (_, true, _) => OperatingMode::BuiltInTest,
            _ => OperatingMode::Reserved,
        }
    }

    /// True when every accelerometer and gyro axis reports healthy
    pub fn all_sensors_ok(&self) -> bool {
        self.acc_x_ok
            && self.acc_y_ok
            && self.acc_z_ok
            && self.gyro_x_ok
            && self.gyro_y_ok
            && self.gyro_z_ok
    }
}

impl From<u16> for StatusFlags {
    fn from(word: u16) -> Self {
        Self::from_word(word)
    }
}
