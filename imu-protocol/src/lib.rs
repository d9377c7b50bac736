//! Serial IMU telemetry frame decoding
//!
//! This crate turns the IMU's 36-byte binary frames into typed values:
//!
//! - [`FrameSynchronizer`] locks onto frames in a raw byte stream
//! - [`RawSample`] holds the integer fields of one frame
//! - [`StatusFlags`] expands the packed status word into health flags
//! - [`PhysicalSample`] holds the same fields in deg/s, g and °C
//!
//! Nothing here keeps state across frames apart from the synchronizer's
//! diagnostic counters.

pub mod frame;
pub mod sample;
pub mod scale;
pub mod status;
pub mod sync;

pub use frame::{FrameLayout, RawFrame, U24, END_SENTINEL, FRAME_SIZE, START_SENTINEL};
pub use sample::{PhysicalSample, RawSample};
pub use scale::{
    encode_signed_24, scale_signed_24, ACCEL_DIVISOR, GRAVITY_OFFSET_Z, GYRO_DIVISOR,
    TEMPERATURE_DIVISOR,
};
pub use status::{OperatingMode, StatusFlags, StatusWord};
pub use sync::{ByteSource, FrameSynchronizer, IoByteSource, StreamError, StreamResult, SyncStats};
