use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use mecom_frame::{
    decode_response, Command, FrameConfig, FrameError, FrameReader, FrameWriter, Header, Response,
    ResponseValue, ValueKind, DEFAULT_MAX_FRAME_LEN,
};
use mecom_transport::{BoundedRead, DeviceStream, SerialConfig};
use tracing::{debug, info, warn};

use crate::bootstrap::{resolve_address, BootstrapConfig};
use crate::error::{Result, SessionError};

/// Default time to wait for one complete response line.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Replies up to this many sequence numbers behind the request are stale.
const STALE_WINDOW: u16 = 0x8000;

/// Runtime configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Serial line settings (ignored for TCP bridges except the timeout).
    pub serial: SerialConfig,
    /// Deadline for one response after the request has been written.
    pub response_timeout: Duration,
    /// Write timeout applied to TCP bridges.
    ///
    /// Serial ports ignore it: their driver keeps a single timeout, which
    /// each exchange resets to the time left on `response_timeout`.
    pub write_timeout: Option<Duration>,
    /// Reject responses whose checksum does not match. Default: true.
    pub verify_checksum: bool,
    /// Maximum response line length.
    pub max_frame_len: usize,
    /// Which parameter resolves the device address.
    pub bootstrap: BootstrapConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            write_timeout: Some(DEFAULT_RESPONSE_TIMEOUT),
            verify_checksum: true,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Frame codec settings derived from this configuration.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_frame_len: self.max_frame_len,
            read_timeout: Some(self.response_timeout),
            write_timeout: self.write_timeout,
            verify_checksum: self.verify_checksum,
        }
    }
}

struct Exchange<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    sequence: u16,
    address: u8,
}

/// An exclusive request/response channel to one controller.
///
/// Every [`execute`](Session::execute) holds the session lock from the
/// moment the request is written until its response has been read, so
/// concurrent callers are serialized and their frames never interleave.
pub struct Session<R = DeviceStream, W = DeviceStream> {
    exchange: Mutex<Exchange<R, W>>,
    response_timeout: Duration,
    write_timeout: Option<Duration>,
    verify_checksum: bool,
}

impl<R: BoundedRead, W: Write> Session<R, W> {
    /// Wrap an already framed stream pair without resolving the address.
    ///
    /// The sequence counter starts at 0 and requests go to `address`.
    pub fn from_parts(
        reader: FrameReader<R>,
        writer: FrameWriter<W>,
        address: u8,
        config: &SessionConfig,
    ) -> Self {
        Self {
            exchange: Mutex::new(Exchange {
                reader,
                writer,
                sequence: 0,
                address,
            }),
            response_timeout: config.response_timeout,
            write_timeout: config.write_timeout,
            verify_checksum: config.verify_checksum,
        }
    }

    /// Build a session and resolve the device address.
    ///
    /// The bootstrap read is sent to address 0. If it fails the session is
    /// dropped and the error is returned as [`SessionError::Bootstrap`].
    pub fn establish(
        reader: FrameReader<R>,
        writer: FrameWriter<W>,
        config: &SessionConfig,
    ) -> Result<Self> {
        let session = Self::from_parts(reader, writer, 0, config);
        let address = resolve_address(&session, &config.bootstrap)
            .map_err(|err| SessionError::Bootstrap(Box::new(err)))?;
        session.lock()?.address = address;
        info!(address, "session established");
        Ok(session)
    }

    /// Send one request and wait for its response.
    ///
    /// Input left over from earlier exchanges is dropped before the request
    /// goes out, and late replies to earlier sequence numbers are skipped
    /// while waiting. A failed exchange still consumes its sequence number.
    pub fn execute(&self, command: &Command) -> Result<Response> {
        let mut guard = self.lock()?;
        let exchange = &mut *guard;

        exchange.sequence = exchange.sequence.wrapping_add(1);
        let header = Header::host(exchange.address, exchange.sequence);

        let dropped = exchange.reader.drain_pending()?;
        if dropped != 0 {
            debug!(discarded = dropped, "dropping stale bytes before request");
        }

        exchange
            .writer
            .write_request(&header, command)
            .map_err(|err| self.write_error(err))?;
        debug!(
            address = header.address,
            sequence = header.sequence,
            line = %printable(exchange.writer.last_frame()),
            "sent"
        );

        let deadline = Instant::now() + self.response_timeout;
        loop {
            let line = exchange
                .reader
                .read_line_bounded(deadline)
                .map_err(|err| self.read_error(err))?;
            debug!(sequence = header.sequence, line = %printable(&line), "received");

            let response = decode_response(&line, self.verify_checksum)?;
            let received = response.header.sequence;
            if received == header.sequence {
                return Ok(response);
            }
            if is_stale(header.sequence, received) {
                warn!(
                    expected = header.sequence,
                    received, "skipping late response to an earlier request"
                );
                continue;
            }
            warn!(
                expected = header.sequence,
                received, "response sequence mismatch"
            );
            return Ok(response);
        }
    }

    /// Read `parameter_id` of `instance` and decode it as `kind`.
    pub fn read_value(
        &self,
        parameter_id: u16,
        instance: u8,
        kind: ValueKind,
    ) -> Result<ResponseValue> {
        let response = self.execute(&Command::read(parameter_id, instance))?;
        Ok(response.decode(kind)?)
    }

    /// Read a float parameter.
    pub fn read_float(&self, parameter_id: u16, instance: u8) -> Result<f32> {
        let response = self.execute(&Command::read(parameter_id, instance))?;
        Ok(response.as_float32()?)
    }

    /// Read an integer parameter, keeping the low 16 bits.
    pub fn read_uint16(&self, parameter_id: u16, instance: u8) -> Result<u16> {
        let response = self.execute(&Command::read(parameter_id, instance))?;
        Ok(response.as_uint16()?)
    }

    /// Write a float parameter. Only the device's acknowledgement is checked.
    pub fn set_float(&self, parameter_id: u16, instance: u8, value: f32) -> Result<()> {
        let response = self.execute(&Command::set(parameter_id, instance, value))?;
        if let Some(code) = response.device_error() {
            return Err(FrameError::DeviceError { code }.into());
        }
        Ok(())
    }

    /// Resolved device address.
    pub fn address(&self) -> Result<u8> {
        Ok(self.lock()?.address)
    }

    /// Sequence number of the most recent request.
    pub fn sequence(&self) -> Result<u16> {
        Ok(self.lock()?.sequence)
    }

    /// Response deadline applied to every exchange.
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    fn lock(&self) -> Result<MutexGuard<'_, Exchange<R, W>>> {
        self.exchange.lock().map_err(|_| SessionError::Poisoned)
    }

    fn read_error(&self, err: FrameError) -> SessionError {
        match err {
            FrameError::Timeout => SessionError::Timeout(self.response_timeout),
            other => SessionError::Frame(other),
        }
    }

    fn write_error(&self, err: FrameError) -> SessionError {
        match err {
            FrameError::Timeout => {
                SessionError::Timeout(self.write_timeout.unwrap_or(self.response_timeout))
            }
            other => SessionError::Frame(other),
        }
    }
}

impl<R, W> std::fmt::Debug for Session<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("response_timeout", &self.response_timeout)
            .field("verify_checksum", &self.verify_checksum)
            .finish_non_exhaustive()
    }
}

fn is_stale(expected: u16, received: u16) -> bool {
    let behind = expected.wrapping_sub(received);
    behind != 0 && behind < STALE_WINDOW
}

fn printable(line: &[u8]) -> String {
    String::from_utf8_lossy(line).trim_end_matches('\r').to_string()
}
