//! Optional range check applied before a sample reaches the integrators.
//!
//! Frames are only validated by their sentinels, so a corrupted payload that
//! still lands on both sentinels decodes to arbitrary values. Without this
//! gate those values are integrated as-is.

use imu_protocol::PhysicalSample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Why a sample was kept out of the integrators
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    #[error("non-finite value in sample")]
    NonFinite,

    #[error("gyro {axis} = {value:.3} deg/s exceeds ±{limit} deg/s")]
    GyroOutOfRange { axis: char, value: f64, limit: f64 },

    #[error("accel {axis} = {value:.4} g exceeds ±{limit} g")]
    AccelOutOfRange { axis: char, value: f64, limit: f64 },
}

/// Per-axis magnitude limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlausibilityLimits {
    /// Largest accepted |angular rate| on any axis, deg/s
    pub max_gyro_dps: f64,
    /// Largest accepted |acceleration| on any axis, g (after the z offset)
    pub max_accel_g: f64,
}

impl PlausibilityLimits {
    pub fn new(max_gyro_dps: f64, max_accel_g: f64) -> Self {
        Self {
            max_gyro_dps,
            max_accel_g,
        }
    }

    /// Accept or reject one sample
    pub fn check(&self, sample: &PhysicalSample) -> Result<(), Rejection> {
        if sample
            .gyro_dps
            .iter()
            .chain(sample.accel_g.iter())
            .any(|v| !v.is_finite())
        {
            return Err(Rejection::NonFinite);
        }

        for (axis, &value) in AXES.into_iter().zip(sample.gyro_dps.iter()) {
            if value.abs() > self.max_gyro_dps {
                return Err(Rejection::GyroOutOfRange {
                    axis,
                    value,
                    limit: self.max_gyro_dps,
                });
            }
        }

        for (axis, &value) in AXES.into_iter().zip(sample.accel_g.iter()) {
            if value.abs() > self.max_accel_g {
                return Err(Rejection::AccelOutOfRange {
                    axis,
                    value,
                    limit: self.max_accel_g,
                });
            }
        }

        Ok(())
    }
}
