use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use mecom_transport::DeviceStream;

use crate::codec::{encode_frame, FrameConfig};
use crate::command::{Command, Header};
use crate::error::{FrameError, Result};
use crate::field::Field;
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes complete frames to any `Write` stream.
///
/// Each frame is encoded into an internal buffer first and then written in
/// full, so a frame is never interleaved with another on the wire.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a host request (blocking).
    pub fn write_request(&mut self, header: &Header, command: &Command) -> Result<()> {
        self.send(header, &command.fields())
    }

    /// Write a device response (blocking). `None` sends a bare acknowledgement.
    pub fn write_response(&mut self, header: &Header, value: Option<Field>) -> Result<()> {
        match value {
            Some(field) => self.send(header, &[field]),
            None => self.send(header, &[]),
        }
    }

    /// Encode and send a frame built from a header and payload fields.
    ///
    /// An expired stream write timeout is reported as `FrameError::Timeout`;
    /// the frame may then be partly on the wire.
    pub fn send(&mut self, header: &Header, fields: &[Field]) -> Result<()> {
        self.buf.clear();
        encode_frame(header, fields, &mut self.buf)?;

        let line_len = self.buf.len() - 1;
        if line_len > self.config.max_frame_len {
            self.buf.clear();
            return Err(FrameError::FrameTooLong {
                len: line_len,
                max: self.config.max_frame_len,
            });
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(FrameError::Timeout),
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Bytes of the most recently written frame, terminator included.
    pub fn last_frame(&self) -> &[u8] {
        &self.buf
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(FrameError::Timeout),
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

// Unix sockets report an expired SO_SNDTIMEO as WouldBlock.
fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl FrameWriter<DeviceStream> {
    /// Create a frame writer for `DeviceStream` and apply write timeout from config.
    pub fn with_config_device(mut inner: DeviceStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
