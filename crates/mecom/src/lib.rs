//! Serial line protocol engine for MeCom-style TEC controllers.
//!
//! mecom talks to thermo-electric cooler controllers over a serial port or
//! a TCP serial bridge, using the controller's hex-ASCII request/response
//! framing with CRC-16/XMODEM integrity.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial and TCP byte streams
//! - [`frame`]: Field codec, checksums, and line framing
//! - [`session`]: Exclusive request/response sessions (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use mecom_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use mecom_frame::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use mecom_session::*;
}
