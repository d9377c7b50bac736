//! End-to-end tests: bytes in, navigation records out.

use std::io::{self, Cursor, Read, Write};

use approx::assert_relative_eq;
use chrono::{DateTime, Duration, Utc};
use imu_nav::{ImuSession, NavRecord, PlausibilityLimits, SessionError, SteppingClock};
use imu_protocol::scale::{encode_signed_24, ACCEL_DIVISOR, GYRO_DIVISOR};
use imu_protocol::{
    IoByteSource, PhysicalSample, RawFrame, RawSample, StreamError, END_SENTINEL, FRAME_SIZE,
    START_SENTINEL,
};

fn frames_to_bytes(samples: &[RawSample]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|s| s.to_frame().as_bytes().to_vec())
        .collect()
}

fn session_over(
    bytes: Vec<u8>,
    step_ms: i64,
) -> ImuSession<IoByteSource<Cursor<Vec<u8>>>, SteppingClock> {
    let clock = SteppingClock::from_epoch(Duration::milliseconds(step_ms));
    ImuSession::with_clock(IoByteSource::new(Cursor::new(bytes)), clock)
}

/// Frame with one accelerometer axis set to `g` as the decoder reports it
fn accel_frame(axis: usize, g: f64, counter: u8) -> RawSample {
    let mut accel = [0u32; 3];
    // The decoder subtracts 1 g from z
    let raw_g = if axis == 2 { g + 1.0 } else { g };
    accel[axis] = encode_signed_24(raw_g, ACCEL_DIVISOR);
    if axis != 2 {
        accel[2] = encode_signed_24(1.0, ACCEL_DIVISOR);
    }
    RawSample {
        accel,
        counter,
        ..Default::default()
    }
}

#[test]
fn test_constant_acceleration_closed_form() {
    let frames: Vec<_> = (0..10).map(|i| accel_frame(2, 1.0, i)).collect();
    let mut session = session_over(frames_to_bytes(&frames), 100);

    let records: Vec<NavRecord> = session.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 10);

    let last = records.last().unwrap();
    assert_relative_eq!(last.velocity[2], 1.0, epsilon = 1e-12);
    assert_relative_eq!(last.position[2], 0.5, epsilon = 1e-12);
    assert_eq!(last.velocity[0], 0.0);
    assert_eq!(last.orientation, [1.0, 0.0, 0.0, 0.0]);
    assert_eq!(
        last.timestamp,
        DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1)
    );

    // Position follows ½·a·t² at every step
    for (k, record) in records.iter().enumerate() {
        let t = 0.1 * (k + 1) as f64;
        assert_relative_eq!(record.position[2], 0.5 * t * t, epsilon = 1e-12);
    }
}

#[test]
fn test_level_and_still_stays_put() {
    // Raw z of +1 g is gravity only
    let frames: Vec<_> = (0..20).map(|i| accel_frame(2, 0.0, i)).collect();
    let mut session = session_over(frames_to_bytes(&frames), 10);

    for record in session.by_ref() {
        let record = record.unwrap();
        assert_eq!(record.accel_g, [0.0, 0.0, 0.0]);
        assert_eq!(record.velocity, [0.0; 3]);
        assert_eq!(record.position, [0.0; 3]);
    }
    assert_eq!(session.stats().accepted, 20);
}

#[test]
fn test_yaw_rotates_acceleration() {
    // 90 deg/s about z for one second, then push along body x
    let spin = RawSample {
        gyro: [0, 0, encode_signed_24(90.0, GYRO_DIVISOR)],
        accel: [0, 0, encode_signed_24(1.0, ACCEL_DIVISOR)],
        ..Default::default()
    };
    let push = accel_frame(0, 1.0, 1);
    let mut session = session_over(frames_to_bytes(&[spin, push]), 1000);

    let turned = session.next_record().unwrap();
    // Rates are fed in deg/s, so the quaternion has turned well past 90°
    let [w, x, y, z] = turned.orientation;
    assert_relative_eq!(w * w + x * x + y * y + z * z, 1.0, epsilon = 1e-12);
    assert!(z.abs() > 0.0);
    assert_eq!(turned.velocity, [0.0; 3]);

    let pushed = session.next_record().unwrap();
    let speed = pushed.velocity.iter().map(|v| v * v).sum::<f64>().sqrt();
    assert_relative_eq!(speed, 1.0, epsilon = 1e-12);
    assert!(pushed.velocity[1].abs() > 0.0);
    assert_eq!(pushed.velocity[2], 0.0);
}

#[test]
fn test_desync_then_valid_frame() {
    let mut bytes = vec![START_SENTINEL];
    bytes.extend(std::iter::repeat(0x55).take(FRAME_SIZE - 2));
    bytes.push(0x00);
    let valid = RawSample {
        counter: 9,
        ..Default::default()
    };
    bytes.extend(frames_to_bytes(&[valid]));

    let mut session = session_over(bytes, 10);
    let record = session.next_record().unwrap();
    assert_eq!(record.counter, 9);
    assert!(matches!(
        session.next_record(),
        Err(SessionError::Stream(StreamError::Closed))
    ));

    let stats = session.stats();
    assert_eq!(stats.sync.frames, 1);
    assert_eq!(stats.sync.desyncs, 1);
    assert_eq!(stats.accepted, 1);
}

#[test]
fn test_zero_gyro_and_gravity_offset() {
    // Gyro all zero; accel z = 0xFF8000, a negative count of -32768
    let mut bytes = [0u8; FRAME_SIZE];
    bytes[0] = START_SENTINEL;
    bytes[FRAME_SIZE - 1] = END_SENTINEL;
    bytes[23..26].copy_from_slice(&[0x00, 0x80, 0xFF]);

    let frame = RawFrame::from_bytes(bytes).unwrap();
    let sample = PhysicalSample::from_frame(&frame);
    assert_eq!(sample.gyro_dps, [0.0; 3]);
    assert_relative_eq!(sample.accel_g[2], -2.0);

    // Bytes [0x00, 0x80, 0x00] assemble little-endian to +1 g, i.e. level
    bytes[23..26].copy_from_slice(&[0x00, 0x80, 0x00]);
    let level = PhysicalSample::from_frame(&RawFrame::from_bytes(bytes).unwrap());
    assert_eq!(level.accel_g[2], 0.0);

    let mut session = session_over(frame.as_bytes().to_vec(), 500);
    let record = session.next_record().unwrap();
    assert_relative_eq!(record.velocity[2], -1.0, epsilon = 1e-12);
    assert_relative_eq!(record.position[2], -0.25, epsilon = 1e-12);
}

struct StallAfter {
    data: Cursor<Vec<u8>>,
}

impl Read for StallAfter {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
            n => Ok(n),
        }
    }
}

#[test]
fn test_stall_ends_session() {
    let mut bytes = frames_to_bytes(&[RawSample::default()]);
    // Half of a second frame, then silence
    bytes.extend_from_slice(&frames_to_bytes(&[RawSample::default()])[..18]);

    let source = IoByteSource::new(StallAfter {
        data: Cursor::new(bytes),
    });
    let clock = SteppingClock::from_epoch(Duration::milliseconds(10));
    let mut session = ImuSession::with_clock(source, clock);

    assert!(session.next_record().is_ok());
    let err = session.next_record().unwrap_err();
    assert!(matches!(err, SessionError::Stream(StreamError::Stall)));
    assert_eq!(session.stats().accepted, 1);

    // The iterator surfaces stalls as items rather than ending
    assert!(matches!(
        session.next(),
        Some(Err(SessionError::Stream(StreamError::Stall)))
    ));
}

#[test]
fn test_gate_drops_wild_frames_from_capture() {
    let good = accel_frame(2, 0.5, 0);
    let wild = RawSample {
        accel: [0, 0, 0x800000],
        counter: 1,
        ..Default::default()
    };
    let mut capture = tempfile::tempfile().unwrap();
    capture
        .write_all(&frames_to_bytes(&[good, wild, good, wild, good]))
        .unwrap();
    capture.flush().unwrap();
    io::Seek::rewind(&mut capture).unwrap();

    let clock = SteppingClock::from_epoch(Duration::milliseconds(100));
    let mut session = ImuSession::with_clock(IoByteSource::new(capture), clock)
        .with_limits(PlausibilityLimits::new(2000.0, 16.0));

    let records: Vec<_> = session.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.accel_g[2] == 0.5));

    // Three accepted frames, 0.1 s apart
    let last = records.last().unwrap();
    assert_relative_eq!(last.velocity[2], 0.15, epsilon = 1e-12);

    let stats = session.stats();
    assert_eq!(stats.rejected, 2);
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.sync.frames, 5);
}

#[tokio::test]
async fn test_snapshot_reader_sees_latest() {
    let frames: Vec<_> = (0..3).map(|i| accel_frame(2, 1.0, i)).collect();
    let mut session = session_over(frames_to_bytes(&frames), 100);
    let mut reader = session.subscribe();
    let mut late = session.subscribe();

    let first = session.next_record().unwrap();
    assert_eq!(reader.changed().await, Some(first));

    session.next_record().unwrap();
    let third = session.next_record().unwrap();
    // Readers only ever see whole records, and only the newest one
    assert_eq!(late.latest(), Some(third));
    assert_eq!(reader.changed().await, Some(third));

    drop(session);
    assert_eq!(reader.changed().await, None);
    assert_eq!(reader.latest(), Some(third));
}
