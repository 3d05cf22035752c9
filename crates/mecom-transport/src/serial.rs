use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::DeviceStream;

/// Line rate used by the controllers out of the box.
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// Driver timeout applied when the port is opened.
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial line configuration.
///
/// Framing is fixed at 8 data bits, no parity, one stop bit and no flow
/// control; only the rate and the driver timeout vary between installations.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line rate in bits per second. Default: 57600.
    pub baud_rate: u32,
    /// Driver timeout for blocking reads. Default: 1 second.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_PORT_TIMEOUT,
        }
    }
}

/// Open a local serial device (blocking).
pub fn open_serial(device: &str, config: &SerialConfig) -> Result<DeviceStream> {
    debug!(device, baud_rate = config.baud_rate, "opening serial device");

    let port = serialport::new(device, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.timeout)
        .open()
        .map_err(|source| TransportError::Open {
            device: device.to_string(),
            source,
        })?;

    info!(device, baud_rate = config.baud_rate, "serial device open");
    Ok(DeviceStream::from_serial(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_line_settings() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, 57_600);
        assert_eq!(cfg.timeout, Duration::from_secs(1));
    }

    #[test]
    fn open_missing_device_fails() {
        let device = format!("/dev/mecom-missing-{}", std::process::id());
        let result = open_serial(&device, &SerialConfig::default());
        assert!(matches!(result, Err(TransportError::Open { .. })));
    }
}
