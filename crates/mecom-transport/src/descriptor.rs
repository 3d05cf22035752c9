use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TransportError};
use crate::serial::{open_serial, SerialConfig};
use crate::tcp::connect_tcp;
use crate::traits::DeviceStream;

const TCP_SCHEME: &str = "tcp://";

/// Where the controller lives.
///
/// Parsed from a single string so that CLIs and config files can carry it
/// verbatim: `tcp://host:port` selects a serial bridge, anything else is a
/// local device path (`/dev/ttyUSB0`, `COM3`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportDescriptor {
    /// Local serial device path.
    Serial(String),
    /// `host:port` of a raw TCP serial bridge.
    Tcp(String),
}

impl TransportDescriptor {
    /// Parse a descriptor string.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TransportError::InvalidDescriptor(input.to_string()));
        }

        if let Some(addr) = input.strip_prefix(TCP_SCHEME) {
            // Require an explicit port; serial bridges have no well-known one.
            match addr.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    Ok(Self::Tcp(addr.to_string()))
                }
                _ => Err(TransportError::InvalidDescriptor(input.to_string())),
            }
        } else {
            Ok(Self::Serial(input.to_string()))
        }
    }
}

impl FromStr for TransportDescriptor {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(path) => f.write_str(path),
            Self::Tcp(addr) => write!(f, "{TCP_SCHEME}{addr}"),
        }
    }
}

/// Open a transport with the default serial configuration.
pub fn open(descriptor: &TransportDescriptor) -> Result<DeviceStream> {
    open_with_config(descriptor, &SerialConfig::default())
}

/// Open a transport with explicit configuration.
///
/// For TCP bridges the serial timeout bounds the connect attempt; the baud
/// rate is whatever the bridge is configured with.
pub fn open_with_config(
    descriptor: &TransportDescriptor,
    config: &SerialConfig,
) -> Result<DeviceStream> {
    match descriptor {
        TransportDescriptor::Serial(path) => open_serial(path, config),
        TransportDescriptor::Tcp(addr) => connect_tcp(addr, config.timeout),
    }
}
