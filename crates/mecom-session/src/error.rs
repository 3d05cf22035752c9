use std::time::Duration;

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mecom_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] mecom_frame::FrameError),

    /// No response arrived within the response timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The address bootstrap exchange failed.
    #[error("address bootstrap failed: {0}")]
    Bootstrap(#[source] Box<SessionError>),

    /// Another thread panicked while holding the session.
    #[error("session lock poisoned")]
    Poisoned,
}

impl SessionError {
    /// Innermost error, looking through bootstrap wrapping.
    pub fn root(&self) -> &SessionError {
        match self {
            SessionError::Bootstrap(inner) => inner.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
