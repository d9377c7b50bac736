//! Body-to-world rotation and double integration of acceleration.

use nalgebra::{Quaternion, Vector3};

/// Rotate a body-frame vector into the reference frame with `q ⊗ v ⊗ q*`.
///
/// `q` must be unit length so the conjugate is its inverse. The scalar part
/// of the product is dropped.
pub fn rotate_to_world(q: &Quaternion<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    (q * Quaternion::from_imag(*v) * q.conjugate()).imag()
}

/// Velocity and position state, updated with explicit Euler steps.
///
/// Constant acceleration integrates exactly; noise and sensor bias
/// accumulate without bound since nothing resets velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntegrator {
    velocity: Vector3<f64>,
    position: Vector3<f64>,
}

impl MotionIntegrator {
    /// Start at rest at the origin
    pub fn new() -> Self {
        Self {
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
        }
    }

    /// Advance by one world-frame acceleration sample held for `dt` seconds.
    ///
    /// Position uses the velocity from *before* this step plus half the
    /// current acceleration.
    pub fn update(&mut self, accel_world: &Vector3<f64>, dt: f64) {
        let previous = self.velocity;
        self.velocity = previous + accel_world * dt;
        self.position += previous * dt + accel_world * (0.5 * dt * dt);
    }

    /// Rotate a body-frame sample with `orientation`, then [`update`](Self::update).
    /// Returns the world-frame acceleration used.
    pub fn update_body(
        &mut self,
        orientation: &Quaternion<f64>,
        accel_body: &Vector3<f64>,
        dt: f64,
    ) -> Vector3<f64> {
        let accel_world = rotate_to_world(orientation, accel_body);
        self.update(&accel_world, dt);
        accel_world
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn z_rotation(angle: f64) -> Quaternion<f64> {
        let half = angle / 2.0;
        Quaternion::new(half.cos(), 0.0, 0.0, half.sin())
    }

    #[test]
    fn test_identity_rotation_is_noop() {
        let v = Vector3::new(1.5, -2.0, 0.25);
        assert_eq!(rotate_to_world(&Quaternion::identity(), &v), v);
    }

    #[test]
    fn test_quarter_turn_about_z() {
        let rotated = rotate_to_world(&z_rotation(FRAC_PI_2), &Vector3::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(rotated, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_constant_acceleration() {
        let mut motion = MotionIntegrator::new();
        let dt = 0.1;
        for _ in 0..10 {
            motion.update_body(&Quaternion::identity(), &Vector3::new(0.0, 0.0, 1.0), dt);
        }

        let t = 10.0 * dt;
        assert_relative_eq!(motion.velocity().z, 1.0 * t, epsilon = 1e-12);
        assert_relative_eq!(motion.position().z, 0.5 * 1.0 * t * t, epsilon = 1e-12);
        assert_eq!(motion.velocity().x, 0.0);
        assert_eq!(motion.position().y, 0.0);
    }

    #[test]
    fn test_zero_acceleration_holds_velocity() {
        let mut motion = MotionIntegrator::new();
        motion.update(&Vector3::new(2.0, 0.0, -1.0), 0.5);
        let v0 = motion.velocity();
        let p0 = motion.position();

        for _ in 0..100 {
            motion.update(&Vector3::zeros(), 0.01);
        }

        assert_eq!(motion.velocity(), v0);
        // Position keeps coasting on the held velocity
        assert_relative_eq!(motion.position(), p0 + v0 * 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_acceleration_from_rest() {
        let mut motion = MotionIntegrator::new();
        for _ in 0..100 {
            motion.update_body(&z_rotation(0.3), &Vector3::zeros(), 0.02);
        }
        assert_eq!(motion.velocity(), Vector3::zeros());
        assert_eq!(motion.position(), Vector3::zeros());
    }

    #[test]
    fn test_position_uses_previous_velocity() {
        let mut motion = MotionIntegrator::new();
        motion.update(&Vector3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(motion.velocity().x, 1.0);
        assert_eq!(motion.position().x, 0.5);

        motion.update(&Vector3::new(1.0, 0.0, 0.0), 1.0);
        assert_eq!(motion.velocity().x, 2.0);
        // 0.5 + 1.0 * 1.0 + 0.5 * 1.0
        assert_eq!(motion.position().x, 2.0);
    }
}
