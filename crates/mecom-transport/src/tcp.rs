use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::DeviceStream;

/// Connect to a raw TCP serial bridge (blocking).
///
/// Each resolved address is tried in turn; the first successful connection
/// wins. Nagle is disabled because every frame is a single short line.
pub fn connect_tcp(addr: &str, timeout: Duration) -> Result<DeviceStream> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|source| TransportError::Connect {
            addr: addr.to_string(),
            source,
        })?;

    let mut last_err = None;
    for candidate in addrs {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                debug!(%candidate, "connected to serial bridge");
                return Ok(DeviceStream::from_tcp(stream));
            }
            Err(err) => last_err = Some(TransportError::connect(&candidate, err)),
        }
    }

    Err(last_err.unwrap_or_else(|| TransportError::Unresolved(addr.to_string())))
}
