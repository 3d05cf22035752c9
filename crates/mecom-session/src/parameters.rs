//! Well-known controller parameters and typed accessors for them.

use std::io::Write;

use mecom_transport::BoundedRead;

use crate::error::Result;
use crate::session::Session;

/// Measured object temperature, °C.
pub const OBJECT_TEMPERATURE: u16 = 1000;
/// Active target temperature, °C.
pub const TARGET_TEMPERATURE: u16 = 1010;
/// Target temperature setpoint, °C.
pub const SET_TEMPERATURE: u16 = 3000;
/// Static TEC current setpoint, A.
pub const TEC_CURRENT: u16 = 50001;
/// Static TEC voltage setpoint, V.
pub const TEC_VOLTAGE: u16 = 50002;

/// Channel addressed by the single-channel accessors below.
pub const DEFAULT_INSTANCE: u8 = 1;

impl<R: BoundedRead, W: Write> Session<R, W> {
    pub fn read_object_temperature(&self) -> Result<f32> {
        self.read_float(OBJECT_TEMPERATURE, DEFAULT_INSTANCE)
    }

    pub fn read_target_temperature(&self) -> Result<f32> {
        self.read_float(TARGET_TEMPERATURE, DEFAULT_INSTANCE)
    }

    pub fn set_temperature(&self, celsius: f32) -> Result<()> {
        self.set_float(SET_TEMPERATURE, DEFAULT_INSTANCE, celsius)
    }

    pub fn set_tec_current(&self, amps: f32) -> Result<()> {
        self.set_float(TEC_CURRENT, DEFAULT_INSTANCE, amps)
    }

    pub fn set_tec_voltage(&self, volts: f32) -> Result<()> {
        self.set_float(TEC_VOLTAGE, DEFAULT_INSTANCE, volts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use mecom_frame::{Command, Field};

    use super::*;
    use crate::session::SessionConfig;
    use crate::testing::{pair, spawn_device, Reply, TEST_TIMEOUT};

    fn session_with_registers(
        registers: HashMap<u16, f32>,
    ) -> (
        Session<std::os::unix::net::UnixStream, std::os::unix::net::UnixStream>,
        std::thread::JoinHandle<Vec<(mecom_frame::Header, Command)>>,
    ) {
        let (host, device) = pair();
        let mut registers = registers;
        let handle = spawn_device(device, move |_, cmd| match *cmd {
            Command::ValueRead { parameter_id, .. } => match registers.get(&parameter_id) {
                Some(&v) => Reply::Value(Field::F32(v)),
                None => Reply::Raw(b"!020001+055ED6\r".to_vec()),
            },
            Command::ValueSet {
                parameter_id,
                value,
                ..
            } => {
                registers.insert(parameter_id, value);
                Reply::Ack
            }
        });
        let cfg = SessionConfig {
            response_timeout: TEST_TIMEOUT,
            ..SessionConfig::default()
        };
        let (reader, writer) = host;
        (Session::from_parts(reader, writer, 2, &cfg), handle)
    }

    #[test]
    fn temperature_reads() {
        let registers = HashMap::from([(OBJECT_TEMPERATURE, 37.5), (TARGET_TEMPERATURE, 25.0)]);
        let (session, handle) = session_with_registers(registers);

        assert_eq!(session.read_object_temperature().unwrap(), 37.5);
        assert_eq!(session.read_target_temperature().unwrap(), 25.0);
        drop(session);

        let seen = handle.join().unwrap();
        assert_eq!(seen[0].1, Command::read(1000, 1));
        assert_eq!(seen[1].1, Command::read(1010, 1));
    }

    #[test]
    fn setters_target_expected_parameters() {
        let (session, handle) = session_with_registers(HashMap::new());

        session.set_temperature(25.0).unwrap();
        session.set_tec_current(1.5).unwrap();
        session.set_tec_voltage(-3.0).unwrap();
        assert_eq!(session.read_float(SET_TEMPERATURE, 1).unwrap(), 25.0);
        drop(session);

        let seen = handle.join().unwrap();
        assert_eq!(seen[0].1, Command::set(3000, 1, 25.0));
        assert_eq!(seen[1].1, Command::set(50001, 1, 1.5));
        assert_eq!(seen[2].1, Command::set(50002, 1, -3.0));
    }

    #[test]
    fn unknown_parameter_reports_device_error() {
        let (session, handle) = session_with_registers(HashMap::new());
        let err = session.read_object_temperature().unwrap_err();
        assert!(matches!(
            err,
            crate::SessionError::Frame(mecom_frame::FrameError::DeviceError { code: 5 })
        ));
        drop(session);
        handle.join().unwrap();
    }
}
