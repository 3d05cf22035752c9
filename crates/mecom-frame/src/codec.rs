use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::{checksum, verify_checksum};
use crate::command::{Command, Header};
use crate::constants::{CHECKSUM_LEN, CONTROL_DEVICE, CONTROL_HOST, HEADER_LEN, TERMINATOR};
use crate::error::{FrameError, Result};
use crate::field::{decode_fields, decode_u16, decode_u8, encode_u16, CommandToken, Field};
use crate::response::Response;

/// Default maximum line length, terminator excluded.
///
/// The longest well-formed frame (a value-set request) is 24 characters;
/// the margin absorbs device replies with longer value fields.
pub const DEFAULT_MAX_FRAME_LEN: usize = 128;

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬──────────┬───────────┬────────────────────┬───────────┬────┐
/// │ Control │ Address  │ Sequence  │ Payload fields     │ CRC-16    │ CR │
/// │ (1B)    │ (2 hex)  │ (4 hex)   │ (token + hex)      │ (4 hex)   │    │
/// └─────────┴──────────┴───────────┴────────────────────┴───────────┴────┘
/// ```
///
/// The checksum covers every byte from the control marker to the end of
/// the payload.
pub fn encode_frame(header: &Header, fields: &[Field], dst: &mut BytesMut) -> Result<()> {
    // Only printable ASCII may appear inside the line.
    if !header.control.is_ascii_graphic() {
        return Err(FrameError::Encoding {
            field: "control",
            value: u64::from(header.control),
            width: 1,
        });
    }

    let payload_len: usize = fields.iter().map(Field::encoded_len).sum();
    dst.reserve(HEADER_LEN + payload_len + CHECKSUM_LEN + 1);

    let start = dst.len();
    dst.put_u8(header.control);
    for field in header.fields().iter().chain(fields) {
        field.encode(dst);
    }

    let crc = checksum(&dst[start..]);
    encode_u16(crc, dst);
    dst.put_u8(TERMINATOR);
    Ok(())
}

/// Encode a host request.
pub fn encode_request(header: &Header, command: &Command, dst: &mut BytesMut) -> Result<()> {
    encode_frame(header, &command.fields(), dst)
}

/// Encode a device response carrying an optional value field.
///
/// Value-set acknowledgements carry no value.
pub fn encode_response(header: &Header, value: Option<Field>, dst: &mut BytesMut) -> Result<()> {
    match value {
        Some(field) => encode_frame(header, &[field], dst),
        None => encode_frame(header, &[], dst),
    }
}

/// Split the trailing checksum off a line (terminator already removed).
///
/// When `verify` is set the checksum is recomputed over the body and a
/// mismatch fails with [`FrameError::ChecksumMismatch`]; otherwise the
/// field only has to be well-formed hex.
pub fn split_checksum(line: &[u8], verify: bool) -> Result<(&[u8], u16)> {
    let min = HEADER_LEN + CHECKSUM_LEN;
    if line.len() < min {
        return Err(FrameError::Truncated {
            len: line.len(),
            min,
        });
    }

    let (body, crc) = line.split_at(line.len() - CHECKSUM_LEN);
    let received = if verify {
        verify_checksum(body, crc)?
    } else {
        decode_u16(crc)?
    };
    Ok((body, received))
}

/// Decode the header at the front of `body`.
///
/// Returns the header and the number of bytes consumed.
pub fn decode_header(body: &[u8], expected_control: u8) -> Result<(Header, usize)> {
    let Some(&control) = body.first() else {
        return Err(FrameError::Truncated {
            len: 0,
            min: HEADER_LEN,
        });
    };
    if control != expected_control {
        return Err(FrameError::InvalidControl {
            found: control,
            expected: char::from(expected_control),
        });
    }

    let address = decode_u8(&body[1..])?;
    let sequence = decode_u16(&body[3..])?;
    Ok((
        Header {
            control,
            address,
            sequence,
        },
        HEADER_LEN,
    ))
}

/// Decode a host request line (terminator already removed).
pub fn decode_request(line: &[u8], verify: bool) -> Result<(Header, Command)> {
    let (body, _) = split_checksum(line, verify)?;
    let (header, offset) = decode_header(body, CONTROL_HOST)?;

    let payload = &body[offset..];
    let (token, token_len) = CommandToken::parse_prefix(payload)?;
    let (fields, used) = decode_fields(Command::schema(token), &payload[token_len..])?;

    let trailing = payload.len() - token_len - used;
    if trailing != 0 {
        return Err(FrameError::TrailingBytes(trailing));
    }

    Ok((header, Command::from_fields(token, &fields)?))
}

/// Decode a device response line (terminator already removed).
///
/// The value field is kept raw; its interpretation is up to the caller
/// (see [`Response::as_float32`] and [`Response::as_uint16`]).
pub fn decode_response(line: &[u8], verify: bool) -> Result<Response> {
    let (body, _) = split_checksum(line, verify)?;
    let (header, offset) = decode_header(body, CONTROL_DEVICE)?;
    Ok(Response::new(header, Bytes::copy_from_slice(&body[offset..])))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum line length in bytes. Default: 128.
    pub max_frame_len: usize,
    /// Deadline for one complete frame on blocking reads.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
    /// Recompute and compare received checksums. Default: true.
    pub verify_checksum: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            read_timeout: None,
            write_timeout: None,
            verify_checksum: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn request_line(header: Header, command: Command) -> BytesMut {
        let mut buf = BytesMut::new();
        encode_request(&header, &command, &mut buf).unwrap();
        buf
    }

    #[test]
    fn value_read_literal_vector() {
        let buf = request_line(Header::host(2, 3), Command::read(1000, 1));
        assert_eq!(buf.as_ref(), b"#020003?VR03E801AC05\r");
    }

    #[test]
    fn value_set_literal_vector() {
        let buf = request_line(Header::host(2, 4), Command::set(3000, 1, 25.0));
        assert_eq!(buf.as_ref(), b"#020004VS0BB80141C800002434\r");
    }

    #[test]
    fn only_final_byte_is_terminator() {
        let buf = request_line(Header::host(0xFF, 0xFFFF), Command::set(0xFFFF, 0xFF, f32::MAX));
        let (last, rest) = buf.split_last().unwrap();
        assert_eq!(*last, TERMINATOR);
        assert!(!rest.contains(&TERMINATOR));
        assert!(rest.iter().all(u8::is_ascii_graphic));
    }

    #[test]
    fn frame_length_is_fixed_by_widths() {
        let read = request_line(Header::host(1, 1), Command::read(1, 1));
        assert_eq!(read.len(), HEADER_LEN + 3 + 4 + 2 + CHECKSUM_LEN + 1);
        let set = request_line(Header::host(1, 1), Command::set(1, 1, 1.0));
        assert_eq!(set.len(), HEADER_LEN + 2 + 4 + 2 + 8 + CHECKSUM_LEN + 1);
    }

    #[test]
    fn rejects_unprintable_control() {
        let header = Header {
            control: TERMINATOR,
            address: 0,
            sequence: 0,
        };
        let mut buf = BytesMut::new();
        let err = encode_request(&header, &Command::read(1, 1), &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::Encoding { field: "control", .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn request_decode_roundtrip() {
        let header = Header::host(7, 513);
        let command = Command::set(50002, 1, 4.25);
        let line = request_line(header, command);
        let (h, c) = decode_request(&line[..line.len() - 1], true).unwrap();
        assert_eq!(h, header);
        assert_eq!(c, command);
    }

    #[test]
    fn request_with_unknown_token() {
        let mut body = BytesMut::from(&b"#020003?VX03E801"[..]);
        let crc = checksum(&body);
        encode_u16(crc, &mut body);
        assert!(matches!(
            decode_request(&body, true),
            Err(FrameError::UnknownCommand(_))
        ));
    }

    #[test]
    fn request_with_trailing_bytes() {
        let mut body = BytesMut::from(&b"#020003?VR03E80199"[..]);
        let crc = checksum(&body);
        encode_u16(crc, &mut body);
        assert!(matches!(
            decode_request(&body, true),
            Err(FrameError::TrailingBytes(2))
        ));
    }

    #[test]
    fn response_decode_float() {
        let resp = decode_response(b"!020003421600000AB2", true).unwrap();
        assert_eq!(resp.header, Header::device(2, 3));
        assert_eq!(resp.value.as_ref(), b"42160000");
        assert_eq!(resp.as_float32().unwrap(), 37.5);
    }

    #[test]
    fn response_decode_uint() {
        let resp = decode_response(b"!020001000000013B5F", true).unwrap();
        assert_eq!(resp.as_uint16().unwrap(), 1);
    }

    #[test]
    fn response_ack_without_value() {
        let resp = decode_response(b"!0200042B78", true).unwrap();
        assert_eq!(resp.header.sequence, 4);
        assert!(resp.is_ack());
    }

    #[test]
    fn response_checksum_enforced() {
        let err = decode_response(b"!020003421600000AB3", true).unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));
    }

    #[test]
    fn response_checksum_lenient() {
        let resp = decode_response(b"!020003421600000AB3", false).unwrap();
        assert_eq!(resp.as_float32().unwrap(), 37.5);
    }

    #[test]
    fn response_wrong_control() {
        let mut line = BytesMut::new();
        encode_request(&Header::host(2, 3), &Command::read(1000, 1), &mut line).unwrap();
        line.truncate(line.len() - 1);
        assert!(matches!(
            decode_response(&line, true),
            Err(FrameError::InvalidControl {
                found: b'#',
                expected: '!'
            })
        ));
    }

    #[test]
    fn truncated_line() {
        assert!(matches!(
            decode_response(b"!0200", true),
            Err(FrameError::Truncated { len: 5, .. })
        ));
    }

    #[test]
    fn malformed_header_field() {
        let mut body = BytesMut::from(&b"!0G0003"[..]);
        let crc = checksum(&body);
        encode_u16(crc, &mut body);
        assert!(matches!(
            decode_response(&body, true),
            Err(FrameError::MalformedField {
                kind: FieldKind::U8,
                ..
            })
        ));
    }

    #[test]
    fn response_encode_decode() {
        let mut buf = BytesMut::new();
        encode_response(&Header::device(2, 10), Some(Field::F32(25.0)), &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"!02000A41C80000BEF8\r");
        let resp = decode_response(&buf[..buf.len() - 1], true).unwrap();
        assert_eq!(resp.as_float32().unwrap(), 25.0);
    }

    #[test]
    fn default_config() {
        let cfg = FrameConfig::default();
        assert_eq!(cfg.max_frame_len, DEFAULT_MAX_FRAME_LEN);
        assert!(cfg.verify_checksum);
        assert!(cfg.read_timeout.is_none());
    }
}
