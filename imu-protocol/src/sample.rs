//! Typed raw fields and their physical-unit counterparts

use serde::{Deserialize, Serialize};

use crate::frame::{FrameLayout, RawFrame, U24, END_SENTINEL, START_SENTINEL};
use crate::scale::{self, GRAVITY_OFFSET_Z};
use crate::status::StatusFlags;

/// Integer fields of one frame, before any scaling.
///
/// 24-bit fields hold their assembled value in the low 24 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub status: u16,
    /// Gyro X/Y/Z counts
    pub gyro: [u32; 3],
    /// Accelerometer X/Y/Z counts
    pub accel: [u32; 3],
    /// High-g accelerometer X counts
    pub accel_high_g_x: u32,
    /// Temperature in tenths of a degree
    pub temperature: u16,
    pub sw_version: u8,
    pub counter: u8,
    /// Checksum as transmitted. Nothing verifies it against the payload.
    pub checksum: u16,
}

impl RawSample {
    /// Decode the fields of a frame. Any frame decodes to some sample.
    pub fn decode(frame: &RawFrame) -> Self {
        let l = frame.layout();
        Self {
            status: u16::from_le_bytes(l.status),
            gyro: l.gyro.map(|v| v.value()),
            accel: l.accel.map(|v| v.value()),
            accel_high_g_x: l.accel_high_g_x.value(),
            temperature: u16::from_le_bytes(l.temperature),
            sw_version: l.sw_version,
            counter: l.counter,
            checksum: u16::from_le_bytes(l.checksum),
        }
    }

    /// Encode into a frame with both sentinels and zeroed reserved bytes.
    ///
    /// 24-bit fields keep only their low 24 bits.
    pub fn to_frame(&self) -> RawFrame {
        let layout = FrameLayout {
            start: START_SENTINEL,
            reserved_a: [0; 4],
            status: self.status.to_le_bytes(),
            reserved_b: 0,
            gyro: self.gyro.map(U24::from_value),
            accel: self.accel.map(U24::from_value),
            accel_high_g_x: U24::from_value(self.accel_high_g_x),
            temperature: self.temperature.to_le_bytes(),
            sw_version: self.sw_version,
            counter: self.counter,
            checksum: self.checksum.to_le_bytes(),
            end: END_SENTINEL,
        };
        RawFrame::from_layout(layout)
    }

    /// Apply scaling, sign recovery and the z gravity offset.
    pub fn to_physical(&self) -> PhysicalSample {
        let gyro = self.gyro.map(scale::gyro_dps);
        let mut accel = self.accel.map(scale::accel_g);
        accel[2] -= GRAVITY_OFFSET_Z;

        PhysicalSample {
            gyro_dps: gyro,
            accel_g: accel,
            accel_high_g_x: scale::accel_g(self.accel_high_g_x),
            temperature_c: scale::temperature_celsius(self.temperature),
            status: StatusFlags::from_word(self.status),
            sw_version: self.sw_version,
            counter: self.counter,
            checksum: self.checksum,
        }
    }
}

impl From<&RawFrame> for RawSample {
    fn from(frame: &RawFrame) -> Self {
        Self::decode(frame)
    }
}

/// One frame in physical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSample {
    /// Angular rate X/Y/Z in deg/s
    pub gyro_dps: [f64; 3],
    /// Acceleration X/Y/Z in g; Z already has 1 g subtracted
    pub accel_g: [f64; 3],
    /// High-g accelerometer X in g
    pub accel_high_g_x: f64,
    pub temperature_c: f64,
    pub status: StatusFlags,
    pub sw_version: u8,
    pub counter: u8,
    pub checksum: u16,
}

impl PhysicalSample {
    /// Decode and scale a frame in one step
    pub fn from_frame(frame: &RawFrame) -> Self {
        RawSample::decode(frame).to_physical()
    }
}
