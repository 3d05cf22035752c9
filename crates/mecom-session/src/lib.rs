//! Request/response sessions with a MeCom TEC controller.
//!
//! This is the "just works" layer. Open a device, let the session resolve
//! its address, then read and write parameters. Exchanges are exclusive:
//! one request is in flight at a time and each waits for its response.

pub mod bootstrap;
pub mod connector;
pub mod error;
pub mod parameters;
pub mod session;

#[cfg(test)]
mod testing;

pub use bootstrap::{resolve_address, BootstrapConfig, BOOTSTRAP_INSTANCE, BOOTSTRAP_PARAMETER_ID};
pub use connector::{open, open_descriptor, open_with_config};
pub use error::{Result, SessionError};
pub use parameters::{
    DEFAULT_INSTANCE, OBJECT_TEMPERATURE, SET_TEMPERATURE, TARGET_TEMPERATURE, TEC_CURRENT,
    TEC_VOLTAGE,
};
pub use session::{Session, SessionConfig, DEFAULT_RESPONSE_TIMEOUT};
