//! Navigation state and the per-frame update order.

use chrono::{DateTime, Utc};
use imu_protocol::PhysicalSample;
use nalgebra::{Quaternion, Vector3};
use tracing::warn;

use crate::clock::seconds_between;
use crate::motion::MotionIntegrator;
use crate::orientation::OrientationIntegrator;

/// Snapshot of the dead-reckoning estimate.
///
/// Plain `Copy` value; holding one never observes later updates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationState {
    /// Unit quaternion, body to reference frame
    pub orientation: Quaternion<f64>,
    /// Velocity in g·s (acceleration is never converted to m/s²)
    pub velocity: Vector3<f64>,
    /// Position in g·s²
    pub position: Vector3<f64>,
    /// Wall-clock time of the last update
    pub timestamp: DateTime<Utc>,
}

impl NavigationState {
    /// Identity orientation, at rest at the origin
    pub fn at_rest(timestamp: DateTime<Utc>) -> Self {
        Self {
            orientation: Quaternion::identity(),
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            timestamp,
        }
    }
}

/// Owns both integrators and applies them in order for each sample:
/// orientation first, then motion with the updated orientation.
#[derive(Debug, Clone)]
pub struct Navigator {
    orientation: OrientationIntegrator,
    motion: MotionIntegrator,
    last_update: DateTime<Utc>,
}

impl Navigator {
    /// Start at rest; `start` is the reference for the first frame's `dt`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            orientation: OrientationIntegrator::new(),
            motion: MotionIntegrator::new(),
            last_update: start,
        }
    }

    /// Integrate one sample over an explicit `dt` in seconds.
    pub fn step(&mut self, gyro: &Vector3<f64>, accel: &Vector3<f64>, dt: f64) {
        let q = self.orientation.update(gyro, dt);
        self.motion.update_body(&q, accel, dt);
    }

    /// Integrate a decoded sample received at `at`. Returns the `dt` used.
    ///
    /// If the wall clock stepped backwards the sample is integrated with
    /// `dt = 0`, which leaves the state unchanged apart from the timestamp.
    pub fn apply(&mut self, sample: &PhysicalSample, at: DateTime<Utc>) -> f64 {
        let mut dt = seconds_between(self.last_update, at);
        if dt < 0.0 {
            warn!("clock stepped backwards by {:.6} s, integrating with dt = 0", -dt);
            dt = 0.0;
        }

        let gyro = Vector3::from(sample.gyro_dps);
        let accel = Vector3::from(sample.accel_g);
        self.step(&gyro, &accel, dt);
        self.last_update = at;
        dt
    }

    /// Copy of the current estimate
    pub fn state(&self) -> NavigationState {
        NavigationState {
            orientation: self.orientation.quaternion(),
            velocity: self.motion.velocity(),
            position: self.motion.position(),
            timestamp: self.last_update,
        }
    }
}
