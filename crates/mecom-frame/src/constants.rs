//! Fixed protocol markers and field lengths.

/// Control marker of a host-originated frame.
pub const CONTROL_HOST: u8 = b'#';

/// Control marker of a device-originated frame.
pub const CONTROL_DEVICE: u8 = b'!';

/// Line terminator ending every frame.
pub const TERMINATOR: u8 = b'\r';

/// Control (1) + address (2) + sequence (4).
pub const HEADER_LEN: usize = 7;

/// Hex-rendered CRC-16.
pub const CHECKSUM_LEN: usize = 4;

/// Minimum value field of a read response: one 32-bit quantity in hex.
pub const RESPONSE_VALUE_LEN: usize = 8;

/// First byte of a device error reply (`+` followed by a 2-char code).
pub const DEVICE_ERROR_MARKER: u8 = b'+';

/// Returns a human-readable name for a control byte.
pub fn control_name(control: u8) -> &'static str {
    match control {
        CONTROL_HOST => "HOST",
        CONTROL_DEVICE => "DEVICE",
        _ => "UNKNOWN",
    }
}

/// Returns true if the byte may start a frame.
pub fn is_control(byte: u8) -> bool {
    byte == CONTROL_HOST || byte == CONTROL_DEVICE
}
