//! Serial link to the IMU.

use std::io::BufReader;

use imu_protocol::IoByteSource;
use serialport::SerialPort;
use tracing::info;

use crate::config::ImuConfig;
use crate::session::SessionResult;

/// Byte source reading a buffered serial port
pub type SerialByteSource = IoByteSource<BufReader<Box<dyn SerialPort>>>;

/// Open the configured port as a raw handle.
///
/// Reads block for at most `read_timeout_ms`; a timeout surfaces as
/// [`StreamError::Stall`](imu_protocol::StreamError::Stall) once wrapped.
pub fn open_port(config: &ImuConfig) -> SessionResult<Box<dyn SerialPort>> {
    let port = serialport::new(&config.port, config.baud_rate)
        .timeout(config.read_timeout())
        .open()?;
    info!(
        "opened {} at {} baud (timeout {} ms)",
        config.port, config.baud_rate, config.read_timeout_ms
    );
    Ok(port)
}

/// Open the configured port as a byte source for a session.
pub fn open_serial(config: &ImuConfig) -> SessionResult<SerialByteSource> {
    Ok(IoByteSource::new(BufReader::new(open_port(config)?)))
}
