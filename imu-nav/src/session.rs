//! One IMU stream driven end to end: sync, decode, gate, integrate, publish.

use imu_protocol::{ByteSource, FrameSynchronizer, PhysicalSample, StreamError, SyncStats};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::plausibility::PlausibilityLimits;
use crate::record::NavRecord;
use crate::state::{NavigationState, Navigator};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub sync: SyncStats,
    /// Samples integrated
    pub accepted: u64,
    /// Samples dropped by the plausibility gate
    pub rejected: u64,
}

/// Read side of the session's snapshot channel.
///
/// Each reader holds its own copy of the latest record; the session is the
/// only writer.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<NavRecord>>,
}

impl SnapshotReader {
    /// Most recent record, or `None` before the first accepted frame.
    /// Marks the value as seen.
    pub fn latest(&mut self) -> Option<NavRecord> {
        *self.rx.borrow_and_update()
    }

    /// Whether a record was published since the last [`latest`](Self::latest).
    /// Returns false once the session is gone.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next record. Returns `None` when the session is dropped.
    pub async fn changed(&mut self) -> Option<NavRecord> {
        self.rx.changed().await.ok()?;
        *self.rx.borrow_and_update()
    }

    pub fn into_inner(self) -> watch::Receiver<Option<NavRecord>> {
        self.rx
    }
}

/// Owns the byte source (through the synchronizer) and the navigation state.
pub struct ImuSession<S, C = SystemClock> {
    sync: FrameSynchronizer<S>,
    navigator: Navigator,
    clock: C,
    limits: Option<PlausibilityLimits>,
    publisher: watch::Sender<Option<NavRecord>>,
    accepted: u64,
    rejected: u64,
}

impl<S: ByteSource> ImuSession<S, SystemClock> {
    /// Session timed by the host wall clock
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S: ByteSource, C: Clock> ImuSession<S, C> {
    /// The first frame's `dt` is measured from the time of this call.
    pub fn with_clock(source: S, clock: C) -> Self {
        let start = clock.now();
        let (publisher, _) = watch::channel(None);
        info!("IMU session started at {}", start);
        Self {
            sync: FrameSynchronizer::new(source),
            navigator: Navigator::new(start),
            clock,
            limits: None,
            publisher,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Enable the plausibility gate
    pub fn with_limits(mut self, limits: PlausibilityLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn set_limits(&mut self, limits: Option<PlausibilityLimits>) {
        self.limits = limits;
    }

    /// Block until the next sample is integrated and return its record.
    ///
    /// Samples failing the plausibility gate are skipped without reading
    /// the clock. Source errors end the session and are returned as-is.
    pub fn next_record(&mut self) -> SessionResult<NavRecord> {
        loop {
            let frame = self.sync.next_frame()?;
            let sample = PhysicalSample::from_frame(&frame);

            if let Some(limits) = &self.limits {
                if let Err(reason) = limits.check(&sample) {
                    self.rejected += 1;
                    warn!(counter = sample.counter, "sample rejected: {}", reason);
                    continue;
                }
            }

            let at = self.clock.now();
            let dt = self.navigator.apply(&sample, at);
            self.accepted += 1;
            debug!(counter = sample.counter, dt, "sample integrated");

            let record = NavRecord::new(&self.navigator.state(), &sample);
            self.publisher.send_replace(Some(record));
            return Ok(record);
        }
    }

    /// New reader of the published records
    pub fn subscribe(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.publisher.subscribe(),
        }
    }

    /// Copy of the current navigation estimate
    pub fn state(&self) -> NavigationState {
        self.navigator.state()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            sync: self.sync.stats(),
            accepted: self.accepted,
            rejected: self.rejected,
        }
    }

    pub fn source(&self) -> &S {
        self.sync.source()
    }

    /// Unwrap, returning the byte source
    pub fn into_source(self) -> S {
        self.sync.into_source()
    }
}

impl<S: ByteSource, C: Clock> Iterator for ImuSession<S, C> {
    type Item = SessionResult<NavRecord>;

    /// Ends when the source closes.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Err(SessionError::Stream(StreamError::Closed)) => None,
            other => Some(other),
        }
    }
}
