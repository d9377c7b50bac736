//! Dead-reckoning navigation from serial IMU telemetry
//!
//! Each accepted frame drives two integrators in order:
//!
//! 1. [`OrientationIntegrator`] advances a unit quaternion by the angular rate
//! 2. [`MotionIntegrator`] rotates the body acceleration into the reference
//!    frame and integrates velocity and position
//!
//! [`ImuSession`] ties a byte source, the frame synchronizer and both
//! integrators together and publishes a [`NavRecord`] per frame.
//!
//! Units are carried through unconverted: angular rate in deg/s, acceleration
//! in g, so velocity is in g·s and position in g·s².

pub mod clock;
pub mod config;
pub mod motion;
pub mod orientation;
pub mod plausibility;
pub mod record;
pub mod serial;
pub mod session;
pub mod state;

pub use clock::{seconds_between, Clock, SteppingClock, SystemClock};
pub use config::{ConfigError, ImuConfig};
pub use motion::{rotate_to_world, MotionIntegrator};
pub use orientation::{propagate, OrientationIntegrator};
pub use plausibility::{PlausibilityLimits, Rejection};
pub use record::NavRecord;
pub use serial::{open_port, open_serial, SerialByteSource};
pub use session::{ImuSession, SessionError, SessionResult, SessionStats, SnapshotReader};
pub use state::{NavigationState, Navigator};
