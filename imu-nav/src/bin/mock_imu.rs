//! Emit synthetic IMU frames to a serial port or a file.
//!
//! Every frame carries the same rates and acceleration with an incrementing
//! counter. A file target doubles as a capture for `decode_dump`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use imu_nav::{open_port, ImuConfig};
use imu_protocol::scale::{
    encode_signed_24, ACCEL_DIVISOR, GRAVITY_OFFSET_Z, GYRO_DIVISOR, TEMPERATURE_DIVISOR,
};
use imu_protocol::{RawSample, FRAME_SIZE};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mock_imu")]
#[command(about = "Write synthetic IMU frames to a serial port or file")]
#[command(version)]
struct Args {
    /// Serial device to write to
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    port: Option<String>,

    /// File to write to instead of a serial port
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Baud rate for the serial port
    #[arg(short, long, default_value = "1250000")]
    baud: u32,

    /// Frames per second (0 = as fast as possible)
    #[arg(short, long, default_value = "100")]
    rate_hz: f64,

    /// Number of frames to write (0 = until interrupted)
    #[arg(short = 'n', long, default_value = "1000")]
    count: u64,

    /// Angular rate X,Y,Z in deg/s
    #[arg(long, value_delimiter = ',', default_value = "0,0,0", allow_hyphen_values = true)]
    gyro_dps: Vec<f64>,

    /// Acceleration X,Y,Z in g as the decoder reports it (gravity removed from Z)
    #[arg(long, value_delimiter = ',', default_value = "0,0,0", allow_hyphen_values = true)]
    accel_g: Vec<f64>,

    /// Temperature in °C
    #[arg(long, default_value = "25.0")]
    temperature_c: f64,

    /// Replace every Nth frame's terminator with a wrong byte
    #[arg(long)]
    corrupt_every: Option<u64>,
}

fn axes(values: &[f64], name: &str) -> Result<[f64; 3]> {
    match values {
        &[x, y, z] if [x, y, z].iter().all(|v| v.is_finite()) => Ok([x, y, z]),
        &[_, _, _] => bail!("--{} values must be finite", name),
        _ => bail!("--{} takes exactly three comma-separated values", name),
    }
}

fn template(args: &Args) -> Result<RawSample> {
    if !(args.rate_hz.is_finite() && args.rate_hz >= 0.0) {
        bail!("--rate-hz must be a finite, non-negative rate, got {}", args.rate_hz);
    }

    let gyro = axes(&args.gyro_dps, "gyro-dps")?;
    let mut accel = axes(&args.accel_g, "accel-g")?;
    accel[2] += GRAVITY_OFFSET_Z;

    if !(0.0..=u16::MAX as f64 / TEMPERATURE_DIVISOR).contains(&args.temperature_c) {
        bail!("temperature {} °C is not representable", args.temperature_c);
    }

    Ok(RawSample {
        gyro: gyro.map(|v| encode_signed_24(v, GYRO_DIVISOR)),
        accel: accel.map(|v| encode_signed_24(v, ACCEL_DIVISOR)),
        temperature: (args.temperature_c * TEMPERATURE_DIVISOR).round() as u16,
        ..Default::default()
    })
}

fn open_target(args: &Args) -> Result<Box<dyn Write>> {
    if let Some(path) = &args.file {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        info!("Writing frames to {}", path.display());
        return Ok(Box::new(BufWriter::new(file)));
    }

    let Some(port) = &args.port else {
        bail!("either --port or --file is required");
    };
    let config = ImuConfig {
        port: port.clone(),
        baud_rate: args.baud,
        ..Default::default()
    };
    let serial = open_port(&config).with_context(|| format!("failed to open {}", port))?;
    Ok(Box::new(serial))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut sample = template(&args)?;
    let mut out = open_target(&args)?;

    let period = (args.rate_hz > 0.0).then(|| Duration::from_secs_f64(1.0 / args.rate_hz));
    let start = Instant::now();
    let mut written: u64 = 0;
    let mut corrupted: u64 = 0;

    while args.count == 0 || written < args.count {
        let mut bytes = *sample.to_frame().as_bytes();
        if args
            .corrupt_every
            .is_some_and(|n| n > 0 && (written + 1) % n == 0)
        {
            bytes[FRAME_SIZE - 1] = 0x00;
            corrupted += 1;
        }

        out.write_all(&bytes)?;
        out.flush()?;
        written += 1;
        sample.counter = sample.counter.wrapping_add(1);

        if let Some(period) = period {
            let due = start + period.mul_f64(written as f64);
            if let Some(wait) = due.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
        }
    }

    info!(
        "Wrote {} frames ({} corrupted) in {:.2} s",
        written,
        corrupted,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
