//! Listen to the IMU serial link and print one JSON navigation record per
//! accepted frame.
//!
//! Records go to stdout, logs to stderr via the tracing subscriber.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use imu_nav::{open_serial, ImuConfig, ImuSession, PlausibilityLimits, SessionError};
use imu_protocol::StreamError;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "listen_imu")]
#[command(about = "Decode and integrate IMU telemetry from a serial port")]
#[command(version)]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Byte read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Stop after this many records
    #[arg(short = 'n', long)]
    max_frames: Option<u64>,

    /// Reject samples with any |gyro| axis above this, deg/s
    #[arg(long)]
    max_gyro_dps: Option<f64>,

    /// Reject samples with any |accel| axis above this, g
    #[arg(long)]
    max_accel_g: Option<f64>,
}

impl Args {
    fn resolve_config(&self) -> Result<ImuConfig> {
        let mut config = match &self.config {
            Some(path) => ImuConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ImuConfig::default(),
        };

        if let Some(port) = &self.port {
            config.port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.read_timeout_ms = timeout_ms;
        }

        if self.max_gyro_dps.is_some() || self.max_accel_g.is_some() {
            let base = config
                .limits
                .unwrap_or(PlausibilityLimits::new(f64::INFINITY, f64::INFINITY));
            config.limits = Some(PlausibilityLimits::new(
                self.max_gyro_dps.unwrap_or(base.max_gyro_dps),
                self.max_accel_g.unwrap_or(base.max_accel_g),
            ));
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let args = Args::parse();
    let config = args.resolve_config()?;
    if let Some(limits) = &config.limits {
        info!(
            "Plausibility gate: |gyro| <= {} deg/s, |accel| <= {} g",
            limits.max_gyro_dps, limits.max_accel_g
        );
    }

    let source =
        open_serial(&config).with_context(|| format!("failed to open {}", config.port))?;
    let mut session = ImuSession::new(source);
    session.set_limits(config.limits);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut emitted: u64 = 0;

    let outcome = loop {
        if args.max_frames.is_some_and(|max| emitted >= max) {
            break Ok(());
        }

        match session.next_record() {
            Ok(record) => {
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
                emitted += 1;
            }
            Err(SessionError::Stream(StreamError::Closed)) => {
                info!("Serial port closed");
                break Ok(());
            }
            Err(e) => break Err(e),
        }
    };
    out.flush()?;

    let stats = session.stats();
    info!(
        "{} records ({} rejected); sync: {} frames, {} desyncs, {} bytes hunted, {} discarded",
        stats.accepted,
        stats.rejected,
        stats.sync.frames,
        stats.sync.desyncs,
        stats.sync.hunted_bytes,
        stats.sync.discarded_bytes
    );

    if let Err(e) = outcome {
        warn!("Session ended: {}", e);
        return Err(e).context("IMU stream failed");
    }
    Ok(())
}
