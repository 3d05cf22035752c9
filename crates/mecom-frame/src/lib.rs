//! Hex-ASCII line framing for the MeCom TEC controller protocol.
//!
//! This is the core value-add layer of mecom. Every frame is one line of
//! printable ASCII:
//! - a control marker (`#` host to device, `!` device to host)
//! - a 2-char address and a 4-char sequence number
//! - a command token (`?VR`, `VS`) and fixed-width hex fields
//! - a 4-char CRC-16/XMODEM checksum and a `\r` terminator
//!
//! Fields are fixed width so a frame is parsed positionally, with no
//! delimiters inside the payload.

pub mod checksum;
pub mod codec;
pub mod command;
pub mod constants;
pub mod error;
pub mod field;
pub mod reader;
pub mod response;
pub mod writer;

pub use checksum::{checksum, encode_checksum, verify_checksum};
pub use codec::{
    decode_header, decode_request, decode_response, encode_frame, encode_request,
    encode_response, split_checksum, FrameConfig, DEFAULT_MAX_FRAME_LEN,
};
pub use command::{Command, Header};
pub use constants::{
    CHECKSUM_LEN, CONTROL_DEVICE, CONTROL_HOST, HEADER_LEN, RESPONSE_VALUE_LEN, TERMINATOR,
};
pub use error::{FrameError, Result};
pub use field::{CommandToken, Field, FieldKind};
pub use reader::FrameReader;
pub use response::{Response, ResponseValue, ValueKind};
pub use writer::FrameWriter;
