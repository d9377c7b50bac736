//! Per-frame output handed to logging and display consumers.

use chrono::{DateTime, Utc};
use imu_protocol::{PhysicalSample, StatusFlags};
use serde::{Deserialize, Serialize};

use crate::state::NavigationState;

/// Everything a consumer gets for one accepted frame.
///
/// This is the only view of the integrators outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavRecord {
    pub timestamp: DateTime<Utc>,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    /// Orientation quaternion as (w, x, y, z)
    pub orientation: [f64; 4],
    /// Angular rate as decoded, deg/s
    pub gyro_dps: [f64; 3],
    /// Body-frame acceleration as decoded, g
    pub accel_g: [f64; 3],
    pub temperature_c: f64,
    pub counter: u8,
    pub status: StatusFlags,
}

impl NavRecord {
    pub fn new(state: &NavigationState, sample: &PhysicalSample) -> Self {
        let q = &state.orientation;
        Self {
            timestamp: state.timestamp,
            position: state.position.into(),
            velocity: state.velocity.into(),
            orientation: [q.w, q.i, q.j, q.k],
            gyro_dps: sample.gyro_dps,
            accel_g: sample.accel_g,
            temperature_c: sample.temperature_c,
            counter: sample.counter,
            status: sample.status,
        }
    }
}
