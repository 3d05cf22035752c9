//! Fixed-width hex-ASCII field codec.
//!
//! Every numeric field is rendered as zero-padded upper-case hex of a fixed
//! width: 2 characters for 8-bit, 4 for 16-bit, 8 for 32-bit values. Floats
//! travel as their IEEE-754 bit pattern, most significant nibble first.
//! Command tokens are literal ASCII with no padding.

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// The closed set of field kinds a frame is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    F32,
    Token,
}

impl FieldKind {
    /// Wire width in characters. Tokens are variable width.
    pub const fn width(self) -> Option<usize> {
        match self {
            FieldKind::U8 => Some(2),
            FieldKind::U16 => Some(4),
            FieldKind::F32 => Some(8),
            FieldKind::Token => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::F32 => "f32",
            FieldKind::Token => "token",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Command tokens understood by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandToken {
    /// `?VR`: read a parameter value.
    ValueRead,
    /// `VS`: set a parameter value.
    ValueSet,
}

impl CommandToken {
    pub const ALL: [CommandToken; 2] = [CommandToken::ValueRead, CommandToken::ValueSet];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandToken::ValueRead => "?VR",
            CommandToken::ValueSet => "VS",
        }
    }

    pub const fn encoded_len(self) -> usize {
        self.as_str().len()
    }

    /// Match a token at the start of `src`.
    ///
    /// Returns the token and the number of bytes it occupies.
    pub fn parse_prefix(src: &[u8]) -> Result<(Self, usize)> {
        Self::ALL
            .into_iter()
            .find(|token| src.starts_with(token.as_str().as_bytes()))
            .map(|token| (token, token.encoded_len()))
            .ok_or_else(|| {
                let shown = &src[..src.len().min(3)];
                FrameError::UnknownCommand(String::from_utf8_lossy(shown).into_owned())
            })
    }
}

impl fmt::Display for CommandToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed field of a frame body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    U8(u8),
    U16(u16),
    F32(f32),
    Token(CommandToken),
}

impl Field {
    /// Narrow a wider integer into a `U8` field.
    ///
    /// Fails with [`FrameError::Encoding`] if the value needs more than two
    /// hex characters.
    pub fn u8_checked(field: &'static str, value: u32) -> Result<Self> {
        narrow_u8(field, value).map(Field::U8)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::U8(_) => FieldKind::U8,
            Field::U16(_) => FieldKind::U16,
            Field::F32(_) => FieldKind::F32,
            Field::Token(_) => FieldKind::Token,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Field::Token(token) => token.encoded_len(),
            other => other.kind().width().unwrap_or(0),
        }
    }

    /// Append the wire form of this field to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match *self {
            Field::U8(v) => encode_u8(v, dst),
            Field::U16(v) => encode_u16(v, dst),
            Field::F32(v) => encode_f32(v, dst),
            Field::Token(token) => dst.put_slice(token.as_str().as_bytes()),
        }
    }
}

/// Narrow `value` to 8 bits, failing with [`FrameError::Encoding`] when it
/// would not fit a 2-character field.
pub fn narrow_u8(field: &'static str, value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| FrameError::Encoding {
        field,
        value: u64::from(value),
        width: 2,
    })
}

pub fn encode_u8(value: u8, dst: &mut BytesMut) {
    put_hex(dst, u32::from(value), 2);
}

pub fn encode_u16(value: u16, dst: &mut BytesMut) {
    put_hex(dst, u32::from(value), 4);
}

pub fn encode_u32(value: u32, dst: &mut BytesMut) {
    put_hex(dst, value, 8);
}

pub fn encode_f32(value: f32, dst: &mut BytesMut) {
    put_hex(dst, value.to_bits(), 8);
}

fn put_hex(dst: &mut BytesMut, value: u32, width: usize) {
    dst.reserve(width);
    for i in (0..width).rev() {
        let nibble = (value >> (i * 4)) & 0xF;
        dst.put_u8(HEX_DIGITS[nibble as usize]);
    }
}

pub fn decode_u8(src: &[u8]) -> Result<u8> {
    parse_hex(src, FieldKind::U8, 2).map(|v| v as u8)
}

pub fn decode_u16(src: &[u8]) -> Result<u16> {
    parse_hex(src, FieldKind::U16, 4).map(|v| v as u16)
}

/// Decode 8 hex characters as an unsigned 32-bit value.
pub fn decode_u32(src: &[u8]) -> Result<u32> {
    parse_hex(src, FieldKind::F32, 8)
}

pub fn decode_f32(src: &[u8]) -> Result<f32> {
    parse_hex(src, FieldKind::F32, 8).map(f32::from_bits)
}

/// Parse exactly `width` hex characters from the front of `src`.
fn parse_hex(src: &[u8], kind: FieldKind, width: usize) -> Result<u32> {
    let malformed = || FrameError::MalformedField {
        kind,
        found: String::from_utf8_lossy(&src[..src.len().min(width)]).into_owned(),
    };

    if src.len() < width {
        return Err(malformed());
    }

    src[..width].iter().try_fold(0u32, |acc, &byte| {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'A'..=b'F' => byte - b'A' + 10,
            b'a'..=b'f' => byte - b'a' + 10,
            _ => return Err(malformed()),
        };
        Ok((acc << 4) | u32::from(nibble))
    })
}

/// Decode one field of `kind` from the front of `src`.
///
/// Returns the field and the number of bytes consumed.
pub fn decode_field(kind: FieldKind, src: &[u8]) -> Result<(Field, usize)> {
    match kind {
        FieldKind::U8 => Ok((Field::U8(decode_u8(src)?), 2)),
        FieldKind::U16 => Ok((Field::U16(decode_u16(src)?), 4)),
        FieldKind::F32 => Ok((Field::F32(decode_f32(src)?), 8)),
        FieldKind::Token => {
            let (token, len) = CommandToken::parse_prefix(src)?;
            Ok((Field::Token(token), len))
        }
    }
}

/// Walk a positional schema over `src`.
///
/// Returns the decoded fields and the total number of bytes consumed.
pub fn decode_fields(schema: &[FieldKind], src: &[u8]) -> Result<(Vec<Field>, usize)> {
    let mut fields = Vec::with_capacity(schema.len());
    let mut offset = 0usize;
    for &kind in schema {
        let (field, used) = decode_field(kind, &src[offset..])?;
        fields.push(field);
        offset += used;
    }
    Ok((fields, offset))
}
