//! Typed interpretation of response value fields.
//!
//! The protocol does not say whether a value is an integer or a float; the
//! caller knows from the parameter it asked for and picks the decoder.

use std::fmt;

use bytes::Bytes;

use crate::command::Header;
use crate::constants::{DEVICE_ERROR_MARKER, RESPONSE_VALUE_LEN};
use crate::error::{FrameError, Result};
use crate::field::{decode_u32, decode_u8};

/// A parsed device response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Header as sent by the device.
    pub header: Header,
    /// Raw hex-ASCII value field, checksum removed.
    pub value: Bytes,
}

/// How the caller wants a value field read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Float32,
    Uint16,
}

/// A decoded value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResponseValue {
    Float32(f32),
    Uint16(u16),
}

impl Response {
    pub fn new(header: Header, value: impl Into<Bytes>) -> Self {
        Self {
            header,
            value: value.into(),
        }
    }

    /// True for a bare acknowledgement (value-set replies).
    pub fn is_ack(&self) -> bool {
        self.value.is_empty()
    }

    /// Error code if the device answered `+XX` instead of a value.
    pub fn device_error(&self) -> Option<u8> {
        match self.value.split_first() {
            Some((&DEVICE_ERROR_MARKER, code)) => decode_u8(code).ok(),
            _ => None,
        }
    }

    /// The first 8 value characters as a big-endian 32-bit quantity.
    pub fn as_uint32(&self) -> Result<u32> {
        if let Some(code) = self.device_error() {
            return Err(FrameError::DeviceError { code });
        }
        if self.value.len() < RESPONSE_VALUE_LEN {
            return Err(FrameError::UnexpectedResponseValue {
                len: self.value.len(),
                min: RESPONSE_VALUE_LEN,
            });
        }
        decode_u32(&self.value[..RESPONSE_VALUE_LEN])
    }

    /// Reinterpret the 32-bit value as an IEEE-754 float.
    pub fn as_float32(&self) -> Result<f32> {
        self.as_uint32().map(f32::from_bits)
    }

    /// Read the full 32-bit value and keep the low 16 bits.
    ///
    /// The device reports 16-bit parameters in a 32-bit field; the high
    /// half is discarded, not checked.
    pub fn as_uint16(&self) -> Result<u16> {
        self.as_uint32().map(|v| v as u16)
    }

    /// Decode according to the caller's expected kind.
    pub fn decode(&self, kind: ValueKind) -> Result<ResponseValue> {
        match kind {
            ValueKind::Float32 => self.as_float32().map(ResponseValue::Float32),
            ValueKind::Uint16 => self.as_uint16().map(ResponseValue::Uint16),
        }
    }
}

impl ResponseValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Float32(_) => ValueKind::Float32,
            Self::Uint16(_) => ValueKind::Uint16,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Float32(v) => f64::from(v),
            Self::Uint16(v) => f64::from(v),
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float32(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
        }
    }
}
