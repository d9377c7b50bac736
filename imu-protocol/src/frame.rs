//! Raw 36-byte IMU frame and its byte layout

use bytemuck::{Pod, Zeroable};

/// Total frame size in bytes, sentinels included
pub const FRAME_SIZE: usize = 36;

/// First byte of every frame (`$`)
pub const START_SENTINEL: u8 = 0x24;

/// Last byte of every frame (`#`)
pub const END_SENTINEL: u8 = 0x23;

/// A frame whose start and end sentinels have both been confirmed.
///
/// The payload between the sentinels is opaque until decoded with
/// [`RawSample::decode`](crate::RawSample::decode). Once built a frame
/// cannot be modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; FRAME_SIZE]);

impl RawFrame {
    /// Wrap a 36-byte buffer, returning `None` unless both sentinels match.
    pub fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Option<Self> {
        if bytes[0] == START_SENTINEL && bytes[FRAME_SIZE - 1] == END_SENTINEL {
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Build from a layout the caller has already stamped with sentinels
    pub(crate) fn from_layout(layout: FrameLayout) -> Self {
        debug_assert!(layout.start == START_SENTINEL && layout.end == END_SENTINEL);
        Self(bytemuck::cast(layout))
    }

    /// Raw bytes access
    pub fn as_bytes(&self) -> &[u8; FRAME_SIZE] {
        &self.0
    }

    /// View the frame through its field layout
    pub fn layout(&self) -> &FrameLayout {
        bytemuck::from_bytes(&self.0)
    }
}

/// Unsigned 24-bit little-endian field (3 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct U24([u8; 3]);

impl U24 {
    /// Largest value a 24-bit field can carry
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Create from raw bytes (least-significant byte first)
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Create from the low 24 bits of `value`; higher bits are dropped.
    pub fn from_value(value: u32) -> Self {
        let [b0, b1, b2, _] = value.to_le_bytes();
        Self([b0, b1, b2])
    }

    /// Assemble as `b0 | b1 << 8 | b2 << 16`
    pub fn value(&self) -> u32 {
        self.0[0] as u32 | (self.0[1] as u32) << 8 | (self.0[2] as u32) << 16
    }

    /// Raw bytes access
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

/// Byte-for-byte layout of a frame
///
/// Every field is a byte array so the struct has alignment 1 and no padding;
/// multi-byte values are assembled little-endian by the accessors in
/// [`RawSample`](crate::RawSample).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct FrameLayout {
    /// Start sentinel, always 0x24 (offset 0)
    pub start: u8,

    /// Unused (offsets 1..=4)
    pub reserved_a: [u8; 4],

    /// Main status word, u16 LE (offsets 5..=6)
    pub status: [u8; 2],

    /// Unused (offset 7)
    pub reserved_b: u8,

    /// Gyro X/Y/Z (offsets 8..=16)
    pub gyro: [U24; 3],

    /// Accelerometer X/Y/Z (offsets 17..=25)
    pub accel: [U24; 3],

    /// High-g accelerometer, X axis only (offsets 26..=28)
    pub accel_high_g_x: U24,

    /// Temperature in tenths of a degree, u16 LE (offsets 29..=30)
    pub temperature: [u8; 2],

    /// Software version (offset 31)
    pub sw_version: u8,

    /// Rolling frame counter (offset 32)
    pub counter: u8,

    /// Checksum, u16 LE (offsets 33..=34). Never validated.
    pub checksum: [u8; 2],

    /// End sentinel, always 0x23 (offset 35)
    pub end: u8,
}

impl FrameLayout {
    /// Expected layout size in bytes
    pub const SIZE: usize = FRAME_SIZE;
}
