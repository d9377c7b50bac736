//! Decode a captured IMU byte dump into a CSV of physical samples.
//!
//! The dump is fed through the same synchronizer used on the live link, so
//! desync behavior matches what the serial reader would have seen.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imu_protocol::{FrameSynchronizer, IoByteSource, PhysicalSample, RawSample, StreamError};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "decode_dump")]
#[command(about = "Decode a raw IMU serial capture to CSV")]
#[command(version)]
struct Args {
    /// Raw byte capture from the IMU serial link
    dump_file: PathBuf,

    /// CSV file to write
    output_csv: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let file = File::open(&args.dump_file)
        .with_context(|| format!("failed to open {}", args.dump_file.display()))?;
    let mut sync = FrameSynchronizer::new(IoByteSource::new(BufReader::new(file)));

    let out = File::create(&args.output_csv)
        .with_context(|| format!("failed to create {}", args.output_csv.display()))?;
    let mut out = BufWriter::new(out);

    writeln!(out, "counter,sw_version,status_word,gyro_x_dps,gyro_y_dps,gyro_z_dps,accel_x_g,accel_y_g,accel_z_g,accel_high_g_x_g,temperature_c,normal_mode,bit_mode,fault_mode,sensors_ok,checksum")?;

    loop {
        let frame = match sync.next_frame() {
            Ok(frame) => frame,
            Err(StreamError::Closed) => break,
            Err(e) => return Err(e.into()),
        };

        let raw = RawSample::decode(&frame);
        let PhysicalSample {
            gyro_dps: [gx, gy, gz],
            accel_g: [ax, ay, az],
            accel_high_g_x,
            temperature_c,
            status,
            sw_version,
            counter,
            checksum,
        } = raw.to_physical();

        writeln!(
            out,
            "{counter},{sw_version},{:#06x},{gx:.6},{gy:.6},{gz:.6},{ax:.6},{ay:.6},{az:.6},{accel_high_g_x:.6},{temperature_c:.1},{},{},{},{},{checksum}",
            raw.status,
            status.normal_mode,
            status.bit_mode,
            status.fault_mode,
            status.all_sensors_ok(),
        )?;
    }
    out.flush()?;

    let stats = sync.stats();
    info!(
        "Decoded {} frames ({} desyncs, {} bytes hunted, {} bytes discarded)",
        stats.frames, stats.desyncs, stats.hunted_bytes, stats.discarded_bytes
    );
    if stats.frames == 0 {
        warn!("No frames found in {}", args.dump_file.display());
    }
    info!("Wrote {}", args.output_csv.display());

    Ok(())
}
