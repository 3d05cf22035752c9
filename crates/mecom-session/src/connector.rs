use mecom_frame::{FrameReader, FrameWriter};
use mecom_transport::{open_with_config as open_transport, DeviceStream, TransportDescriptor};
use tracing::info;

use crate::error::Result;
use crate::session::{Session, SessionConfig};

/// Open a controller session with default configuration.
///
/// `descriptor` is a serial device path or `tcp://host:port`.
pub fn open(descriptor: &str) -> Result<Session> {
    open_with_config(descriptor, &SessionConfig::default())
}

/// Open a controller session with explicit configuration.
pub fn open_with_config(descriptor: &str, config: &SessionConfig) -> Result<Session> {
    let descriptor = TransportDescriptor::parse(descriptor)?;
    open_descriptor(&descriptor, config)
}

/// Open a session on an already parsed descriptor.
pub fn open_descriptor(
    descriptor: &TransportDescriptor,
    config: &SessionConfig,
) -> Result<Session<DeviceStream, DeviceStream>> {
    let stream = open_transport(descriptor, &config.serial)?;
    info!(
        device = %descriptor,
        transport = stream.transport_name(),
        "transport opened"
    );
    let reader_stream = stream.try_clone()?;

    let frame_config = config.frame_config();
    let reader = FrameReader::with_config_device(reader_stream, frame_config.clone())?;
    let writer = FrameWriter::with_config_device(stream, frame_config)?;

    Session::establish(reader, writer, config)
}
