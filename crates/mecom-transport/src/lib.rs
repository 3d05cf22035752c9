//! Byte-stream transports for talking to a TEC controller.
//!
//! Provides a unified interface over the two ways a controller is usually
//! reached:
//! - a local serial port (USB-UART adapters, RS-485 dongles)
//! - a raw TCP serial bridge such as `ser2net`
//!
//! This is the lowest layer of mecom. Everything else builds on top of
//! the [`DeviceStream`] type provided here.

pub mod descriptor;
pub mod error;
pub mod serial;
pub mod tcp;
pub mod traits;

pub use descriptor::{open, open_with_config, TransportDescriptor};
pub use error::{Result, TransportError};
pub use serial::{SerialConfig, DEFAULT_BAUD_RATE};
pub use traits::{BoundedRead, DeviceStream};
