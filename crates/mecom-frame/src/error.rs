use crate::field::FieldKind;

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A fixed-width field was short or contained non-hex characters.
    #[error("malformed {kind} field: {found:?}")]
    MalformedField { kind: FieldKind, found: String },

    /// The payload does not start with a known command token.
    #[error("unknown command token at {0:?}")]
    UnknownCommand(String),

    /// A value cannot be rendered in its fixed wire width.
    #[error("cannot encode {field} value {value} in {width} wire characters")]
    Encoding {
        field: &'static str,
        value: u64,
        width: usize,
    },

    /// The frame starts with the wrong control marker.
    #[error("unexpected control byte 0x{found:02X} (expected {expected:?})")]
    InvalidControl { found: u8, expected: char },

    /// The frame is shorter than header plus checksum.
    #[error("frame truncated ({len} bytes, need at least {min})")]
    Truncated { len: usize, min: usize },

    /// Bytes remain after the last field of a request.
    #[error("{0} unexpected trailing bytes after payload")]
    TrailingBytes(usize),

    /// The response value field is shorter than the protocol minimum.
    #[error("unexpected response value ({len} characters, need {min})")]
    UnexpectedResponseValue { len: usize, min: usize },

    /// The received checksum does not match the frame body.
    #[error("checksum mismatch (computed {computed:04X}, received {received:04X})")]
    ChecksumMismatch { computed: u16, received: u16 },

    /// A line exceeded the configured maximum before its terminator.
    #[error("frame too long ({len} bytes, max {max})")]
    FrameTooLong { len: usize, max: usize },

    /// The device answered with an error reply instead of a value.
    #[error("device reported error code {code}")]
    DeviceError { code: u8 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// No terminator arrived before the read deadline.
    #[error("timed out waiting for frame terminator")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, FrameError>;
