//! Orientation propagation from angular-rate samples
//!
//! First-order quaternion update:
//!
//! ```text
//! dq = (0, gx·dt, gy·dt, gz·dt)
//! q' = normalize(q + ½·(q ⊗ dq))
//! ```
//!
//! This is the small-angle approximation, not the exponential map, so its
//! error grows with `dt` and with rate magnitude. Rates are consumed in the
//! units they arrive in (deg/s from the IMU) with no conversion to rad/s.
//! Nothing corrects the estimate; drift is unbounded over long runs.

use nalgebra::{Quaternion, Vector3};

/// Single propagation step. Always returns a unit quaternion when `q` is
/// non-zero.
pub fn propagate(q: &Quaternion<f64>, rates: &Vector3<f64>, dt: f64) -> Quaternion<f64> {
    let dq = Quaternion::from_imag(rates * dt);
    let next = q + (q * dq) * 0.5;
    next.normalize()
}

/// Holds the current orientation and applies [`propagate`] per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationIntegrator {
    q: Quaternion<f64>,
}

impl OrientationIntegrator {
    /// Start at the identity (no rotation)
    pub fn new() -> Self {
        Self {
            q: Quaternion::identity(),
        }
    }

    /// Start from a given orientation; it is normalized first.
    pub fn from_quaternion(q: Quaternion<f64>) -> Self {
        Self { q: q.normalize() }
    }

    /// Advance by one angular-rate sample held for `dt` seconds.
    pub fn update(&mut self, rates: &Vector3<f64>, dt: f64) -> Quaternion<f64> {
        self.q = propagate(&self.q, rates, dt);
        self.q
    }

    /// Current orientation (w, i, j, k)
    pub fn quaternion(&self) -> Quaternion<f64> {
        self.q
    }
}

impl Default for OrientationIntegrator {
    fn default() -> Self {
        Self::new()
    }
}
