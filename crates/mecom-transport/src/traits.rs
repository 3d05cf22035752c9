use std::io::{Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;

use serialport::SerialPort;

use crate::error::Result;

// Zero is rejected by socket timeouts and means "poll" to some serial drivers.
const MIN_READ_BOUND: Duration = Duration::from_millis(1);

/// A readable stream whose blocking reads can be cut short.
///
/// After `bound_reads(limit)` a read that sees no data for `limit` fails with
/// `WouldBlock` or `TimedOut`. Limits below one millisecond are rounded up.
pub trait BoundedRead: Read {
    fn bound_reads(&mut self, limit: Duration) -> std::io::Result<()>;
}

impl BoundedRead for TcpStream {
    fn bound_reads(&mut self, limit: Duration) -> std::io::Result<()> {
        self.set_read_timeout(Some(limit.max(MIN_READ_BOUND)))
    }
}

#[cfg(unix)]
impl BoundedRead for UnixStream {
    fn bound_reads(&mut self, limit: Duration) -> std::io::Result<()> {
        self.set_read_timeout(Some(limit.max(MIN_READ_BOUND)))
    }
}

impl BoundedRead for DeviceStream {
    fn bound_reads(&mut self, limit: Duration) -> std::io::Result<()> {
        let limit = limit.max(MIN_READ_BOUND);
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.set_timeout(limit).map_err(Into::into),
            DeviceStreamInner::Tcp(stream) => stream.set_read_timeout(Some(limit)),
        }
    }
}

/// A connected device stream implementing `Read + Write`.
///
/// This is the fundamental I/O type returned by transport operations.
/// For a local port it wraps the driver handle from `serialport`; for a
/// serial bridge it wraps a TCP stream.
pub struct DeviceStream {
    inner: DeviceStreamInner,
}

enum DeviceStreamInner {
    Serial(Box<dyn SerialPort>),
    Tcp(TcpStream),
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.read(buf),
            DeviceStreamInner::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for DeviceStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.write(buf),
            DeviceStreamInner::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.flush(),
            DeviceStreamInner::Tcp(stream) => stream.flush(),
        }
    }
}

impl DeviceStream {
    /// Create a DeviceStream from an opened serial port.
    pub(crate) fn from_serial(port: Box<dyn SerialPort>) -> Self {
        Self {
            inner: DeviceStreamInner::Serial(port),
        }
    }

    /// Create a DeviceStream from a connected TCP bridge stream.
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: DeviceStreamInner::Tcp(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    ///
    /// Serial ports carry a single driver timeout; `None` leaves the timeout
    /// chosen at open time in place.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => match timeout {
                Some(timeout) => port.set_timeout(timeout).map_err(Into::into),
                None => Ok(()),
            },
            DeviceStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    ///
    /// Ignored for serial ports: their driver has one timeout, owned by the
    /// read side.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            DeviceStreamInner::Serial(_) => Ok(()),
            DeviceStreamInner::Tcp(stream) => {
                stream.set_write_timeout(timeout).map_err(Into::into)
            }
        }
    }

    /// Try to clone this stream (creates a new handle to the same device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            DeviceStreamInner::Serial(port) => Ok(Self::from_serial(port.try_clone()?)),
            DeviceStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            DeviceStreamInner::Serial(_) => "serial",
            DeviceStreamInner::Tcp(_) => "tcp",
        }
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DeviceStreamInner::Serial(port) => f
                .debug_struct("DeviceStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .finish(),
            DeviceStreamInner::Tcp(stream) => f
                .debug_struct("DeviceStream")
                .field("type", &"tcp")
                .field("peer", &stream.peer_addr().ok())
                .finish(),
        }
    }
}
