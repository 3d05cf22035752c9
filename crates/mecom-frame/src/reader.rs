use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::{Buf, Bytes, BytesMut};
use mecom_transport::{BoundedRead, DeviceStream};
use tracing::{debug, warn};

use crate::codec::{decode_request, decode_response, FrameConfig};
use crate::command::{Command, Header};
use crate::constants::TERMINATOR;
use crate::error::{FrameError, Result};
use crate::response::Response;

const INITIAL_BUFFER_CAPACITY: usize = 256;
const READ_CHUNK_SIZE: usize = 64;
/// Input quiet for this long counts as drained.
const DRAIN_QUIET: Duration = Duration::from_millis(2);
/// Upper bound on bytes dropped by one drain, in maximum-length lines.
const DRAIN_LIMIT_LINES: usize = 4;

/// Reads complete `\r`-terminated lines from any `Read` stream.
///
/// Bytes are accumulated in an internal buffer; each call slices one line
/// off the front and keeps the remainder for the next call. Callers never
/// see partial lines.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete line (blocking), terminator excluded.
    ///
    /// The configured `read_timeout` bounds the whole line, not each read.
    pub fn read_line(&mut self) -> Result<Bytes> {
        let deadline = self.config.read_timeout.map(|t| Instant::now() + t);
        self.read_line_until(deadline)
    }

    /// Read the next complete line, giving up at `deadline`.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached and
    /// `Err(FrameError::Timeout)` when the deadline passes or the stream's
    /// own read timeout fires. A timed-out partial line is discarded.
    pub fn read_line_until(&mut self, deadline: Option<Instant>) -> Result<Bytes> {
        self.fill_line(deadline, |_, _| Ok(()))
    }

    fn fill_line<F>(&mut self, deadline: Option<Instant>, mut before_read: F) -> Result<Bytes>
    where
        F: FnMut(&mut T, Duration) -> std::io::Result<()>,
    {
        loop {
            if let Some(line) = self.take_line()? {
                return Ok(line);
            }

            if let Some(deadline) = deadline {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    return Err(self.timed_out());
                }
                before_read(&mut self.inner, left)?;
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Err(self.timed_out());
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read and decode the next device response.
    pub fn read_response(&mut self) -> Result<Response> {
        let line = self.read_line()?;
        decode_response(&line, self.config.verify_checksum)
    }

    /// Read and decode the next host request.
    pub fn read_request(&mut self) -> Result<(Header, Command)> {
        let line = self.read_line()?;
        decode_request(&line, self.config.verify_checksum)
    }

    fn take_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.buf.iter().position(|&b| b == TERMINATOR) {
                // A bare terminator carries nothing.
                Some(0) => self.buf.advance(1),
                Some(end) if end > self.config.max_frame_len => {
                    warn!(len = end, max = self.config.max_frame_len, "dropping oversized line");
                    self.buf.advance(end + 1);
                    return Err(FrameError::FrameTooLong {
                        len: end,
                        max: self.config.max_frame_len,
                    });
                }
                Some(end) => {
                    let line = self.buf.split_to(end).freeze();
                    self.buf.advance(1);
                    return Ok(Some(line));
                }
                None if self.buf.len() > self.config.max_frame_len => {
                    let len = self.buf.len();
                    warn!(len, max = self.config.max_frame_len, "unterminated line too long");
                    self.buf.clear();
                    return Err(FrameError::FrameTooLong {
                        len,
                        max: self.config.max_frame_len,
                    });
                }
                None => return Ok(None),
            }
        }
    }

    fn timed_out(&mut self) -> FrameError {
        if !self.buf.is_empty() {
            debug!(discarded = self.buf.len(), "partial line dropped on timeout");
        }
        self.buf.clear();
        FrameError::Timeout
    }

    /// Number of bytes buffered but not yet returned as a line.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Drop any buffered bytes.
    pub fn discard_buffered(&mut self) {
        self.buf.clear();
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Switch checksum verification for subsequent decodes.
    pub fn set_verify_checksum(&mut self, verify: bool) {
        self.config.verify_checksum = verify;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: BoundedRead> FrameReader<T> {
    /// Read the next complete line, giving up at `deadline`.
    ///
    /// Unlike [`read_line_until`](Self::read_line_until), every blocking read
    /// is bounded by the time left, so the stream's own read timeout cannot
    /// stretch the wait past `deadline`.
    pub fn read_line_bounded(&mut self, deadline: Instant) -> Result<Bytes> {
        self.fill_line(Some(deadline), |inner, left| inner.bound_reads(left))
    }

    /// Drop buffered bytes and any input already waiting on the stream.
    ///
    /// Returns the number of bytes discarded. Stops once the stream stays
    /// quiet for a moment, or after a bounded amount of input.
    pub fn drain_pending(&mut self) -> Result<usize> {
        let mut dropped = self.buf.len();
        self.buf.clear();
        self.inner.bound_reads(DRAIN_QUIET)?;

        let limit = self.config.max_frame_len.saturating_mul(DRAIN_LIMIT_LINES);
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        while dropped < limit {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => dropped += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    break;
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(dropped)
    }
}

impl FrameReader<DeviceStream> {
    /// Create a frame reader for `DeviceStream` and apply read timeout from config.
    pub fn with_config_device(mut inner: DeviceStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: mecom_transport::TransportError) -> FrameError {
    match err {
        mecom_transport::TransportError::Io(io)
        | mecom_transport::TransportError::Connect { source: io, .. } => FrameError::Io(io),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
