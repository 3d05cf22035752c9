//! CRC-16/XMODEM frame checksum.
//!
//! Computed over the literal ASCII bytes of header and payload (never the
//! decoded values, never the terminator) and rendered as 4 upper-case hex
//! characters.

use bytes::BytesMut;
use crc::{Crc, CRC_16_XMODEM};

use crate::constants::CHECKSUM_LEN;
use crate::error::{FrameError, Result};
use crate::field::{decode_u16, encode_u16};

const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC-16/XMODEM of `data`.
pub fn checksum(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

/// Append the hex-rendered checksum of `data` to `dst`.
pub fn encode_checksum(data: &[u8], dst: &mut BytesMut) {
    encode_u16(checksum(data), dst);
}

/// Recompute the checksum of `body` and compare it with the received field.
///
/// Returns the received value on success.
pub fn verify_checksum(body: &[u8], received: &[u8]) -> Result<u16> {
    let received = decode_u16(&received[..received.len().min(CHECKSUM_LEN)])?;
    let computed = checksum(body);
    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }
    Ok(received)
}
