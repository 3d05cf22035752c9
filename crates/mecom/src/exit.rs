use std::fmt;
use std::io;

use mecom_frame::FrameError;
use mecom_session::SessionError;
use mecom_transport::TransportError;

// Process exit codes; 124 follows the `timeout(1)` convention.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(USAGE, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = io_code(err.kind());
    CliError::new(code, format!("{context}: {err}"))
}

fn io_code(kind: io::ErrorKind) -> i32 {
    match kind {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotFound => TRANSPORT_ERROR,
        _ => INTERNAL,
    }
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { source, .. } | TransportError::Io(source) => {
            io_error(context, source)
        }
        TransportError::InvalidDescriptor(_) => CliError::usage(format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::Timeout => CliError::new(TIMEOUT, format!("{context}: {err}")),
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        FrameError::DeviceError { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
        FrameError::MalformedField { .. }
        | FrameError::UnknownCommand(_)
        | FrameError::Encoding { .. }
        | FrameError::InvalidControl { .. }
        | FrameError::Truncated { .. }
        | FrameError::TrailingBytes(_)
        | FrameError::UnexpectedResponseValue { .. }
        | FrameError::ChecksumMismatch { .. }
        | FrameError::FrameTooLong { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Frame(err) => frame_error(context, err),
        SessionError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        SessionError::Bootstrap(inner) => {
            session_error(&format!("{context}: address bootstrap failed"), *inner)
        }
        SessionError::Poisoned => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = session_error("read", SessionError::Timeout(Duration::from_secs(1)));
        assert_eq!(err.code, TIMEOUT);
        assert_eq!(frame_error("read", FrameError::Timeout).code, TIMEOUT);
    }

    #[test]
    fn bootstrap_is_unwrapped() {
        let err = session_error(
            "open",
            SessionError::Bootstrap(Box::new(SessionError::Timeout(Duration::from_secs(1)))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("open: address bootstrap failed"));
    }

    #[test]
    fn data_errors_map_to_60() {
        let err = frame_error(
            "decode",
            FrameError::ChecksumMismatch {
                computed: 1,
                received: 2,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn transport_errors() {
        let refused = transport_error(
            "connect",
            TransportError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)),
        );
        assert_eq!(refused.code, TRANSPORT_ERROR);

        let bad = transport_error("open", TransportError::InvalidDescriptor("tcp://".into()));
        assert_eq!(bad.code, USAGE);
    }
}
