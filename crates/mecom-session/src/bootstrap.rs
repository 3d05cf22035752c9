use std::io::Write;

use mecom_frame::field::narrow_u8;
use mecom_transport::BoundedRead;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;

/// Parameter that reports the controller's bus address.
pub const BOOTSTRAP_PARAMETER_ID: u16 = 2051;

/// Instance queried during bootstrap.
pub const BOOTSTRAP_INSTANCE: u8 = 1;

/// Which parameter the session reads to learn the device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub parameter_id: u16,
    pub instance: u8,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            parameter_id: BOOTSTRAP_PARAMETER_ID,
            instance: BOOTSTRAP_INSTANCE,
        }
    }
}

/// Query the device address through `session`.
///
/// The reply is read as a 16-bit integer and must fit the 2-character
/// address field.
pub fn resolve_address<R: BoundedRead, W: Write>(
    session: &Session<R, W>,
    config: &BootstrapConfig,
) -> Result<u8> {
    let raw = session.read_uint16(config.parameter_id, config.instance)?;
    debug!(
        parameter_id = config.parameter_id,
        instance = config.instance,
        raw,
        "bootstrap reply"
    );
    narrow_address(raw)
}

fn narrow_address(raw: u16) -> Result<u8> {
    Ok(narrow_u8("address", u32::from(raw))?)
}
