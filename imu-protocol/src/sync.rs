//! Frame synchronization over an unbounded byte stream
//!
//! Frames carry no length prefix; the only framing is the start sentinel
//! (0x24) and the end sentinel (0x23) 35 bytes later. The synchronizer scans
//! for a start byte, reads the remaining 35 bytes unconditionally, and checks
//! the terminator.
//!
//! When the terminator does not match, all 36 bytes are dropped and scanning
//! resumes with the *next* byte read. A start sentinel sitting inside the
//! dropped buffer is not revisited, so lock can take up to one extra frame
//! length to recover after corruption.

use std::io::{ErrorKind, Read};

use thiserror::Error;
use tracing::{debug, trace};

use crate::frame::{RawFrame, END_SENTINEL, FRAME_SIZE, START_SENTINEL};

/// Errors raised by a byte source.
///
/// Every variant ends the current stream; the synchronizer never retries.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The source produced nothing within the bound imposed by the host.
    #[error("byte source stalled")]
    Stall,

    /// The source reached end of stream.
    #[error("byte source closed")]
    Closed,

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// A blocking source of single bytes.
pub trait ByteSource {
    /// Read the next byte, blocking until one is available or the source
    /// gives up.
    fn read_byte(&mut self) -> StreamResult<u8>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> StreamResult<u8> {
        (**self).read_byte()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> StreamResult<u8> {
        (**self).read_byte()
    }
}

/// Adapts any [`Read`] (serial port, file, cursor) into a [`ByteSource`].
///
/// `TimedOut` and `WouldBlock` become [`StreamError::Stall`], a zero-length
/// read becomes [`StreamError::Closed`], and `Interrupted` is retried.
/// Wrap the reader in a `BufReader` when each `read` is a system call.
#[derive(Debug)]
pub struct IoByteSource<R> {
    inner: R,
}

impl<R: Read> IoByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Access the wrapped reader
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwrap, returning the reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoByteSource<R> {
    fn read_byte(&mut self) -> StreamResult<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Err(StreamError::Closed),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Err(StreamError::Stall)
                }
                Err(e) => return Err(StreamError::Io(e)),
            }
        }
    }
}

/// Diagnostic counters kept by a [`FrameSynchronizer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Frames emitted
    pub frames: u64,
    /// Buffers dropped because the end sentinel did not match
    pub desyncs: u64,
    /// Bytes skipped while hunting for a start sentinel
    pub hunted_bytes: u64,
    /// Bytes dropped together with desynchronized buffers
    pub discarded_bytes: u64,
}

/// Turns a byte stream into sentinel-validated frames.
#[derive(Debug)]
pub struct FrameSynchronizer<S> {
    source: S,
    stats: SyncStats,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            stats: SyncStats::default(),
        }
    }

    /// Block until the next valid frame arrives.
    ///
    /// Desyncs are absorbed and counted; only errors from the byte source
    /// are returned.
    pub fn next_frame(&mut self) -> StreamResult<RawFrame> {
        loop {
            let byte = self.source.read_byte()?;
            if byte != START_SENTINEL {
                self.stats.hunted_bytes += 1;
                continue;
            }

            let mut buf = [0u8; FRAME_SIZE];
            buf[0] = byte;
            for slot in buf.iter_mut().skip(1) {
                *slot = self.source.read_byte()?;
            }

            match RawFrame::from_bytes(buf) {
                Some(frame) => {
                    self.stats.frames += 1;
                    trace!(counter = buf[32], "frame accepted");
                    return Ok(frame);
                }
                None => {
                    self.stats.desyncs += 1;
                    self.stats.discarded_bytes += FRAME_SIZE as u64;
                    debug!(
                        "frame desync: terminator {:#04x} != {:#04x}, discarding buffer ({} so far)",
                        buf[FRAME_SIZE - 1],
                        END_SENTINEL,
                        self.stats.desyncs
                    );
                }
            }
        }
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Access the byte source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the byte source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Unwrap, returning the byte source
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Iterator for FrameSynchronizer<S> {
    type Item = StreamResult<RawFrame>;

    /// Ends at end of stream; any other source error is yielded as an item.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_frame() {
            Err(StreamError::Closed) => None,
            other => Some(other),
        }
    }
}
