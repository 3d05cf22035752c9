//! Fake-controller example: a TCP stand-in for a TEC controller.
//!
//! Run with:
//!   cargo run --example fake-controller -- 127.0.0.1:5025
//!
//! then point the CLI at it:
//!   mecom --device tcp://127.0.0.1:5025 status

use std::collections::HashMap;
use std::net::{TcpListener, TcpStream};
use std::thread;

use mecom::frame::{Command, Field, FrameError, FrameReader, FrameWriter, Header};
use mecom::session::{
    BOOTSTRAP_PARAMETER_ID, OBJECT_TEMPERATURE, SET_TEMPERATURE, TARGET_TEMPERATURE,
};

const ADDRESS: u8 = 1;

fn serve(stream: TcpStream) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut reader = FrameReader::new(stream.try_clone()?);
    let mut writer = FrameWriter::new(stream);
    let mut registers: HashMap<u16, f32> =
        HashMap::from([(OBJECT_TEMPERATURE, 22.5), (TARGET_TEMPERATURE, 25.0)]);

    loop {
        let (header, command) = match reader.read_request() {
            Ok(request) => request,
            Err(FrameError::ConnectionClosed) => return Ok(()),
            Err(FrameError::Io(err)) => return Err(err.into()),
            Err(err) => {
                eprintln!("[device] dropping bad request: {err}");
                continue;
            }
        };
        eprintln!("[device] {command:?}");
        let reply = Header::device(ADDRESS, header.sequence);

        match command {
            Command::ValueRead { parameter_id, .. } if parameter_id == BOOTSTRAP_PARAMETER_ID => {
                // Integer parameters travel as 32-bit values; an f32 with
                // the same bit pattern encodes identically.
                let value = Field::F32(f32::from_bits(u32::from(ADDRESS)));
                writer.write_response(&reply, Some(value))?;
            }
            Command::ValueRead { parameter_id, .. } => {
                let value = registers.get(&parameter_id).copied().unwrap_or(0.0);
                writer.write_response(&reply, Some(Field::F32(value)))?;
            }
            Command::ValueSet {
                parameter_id,
                value,
                ..
            } => {
                registers.insert(parameter_id, value);
                if parameter_id == SET_TEMPERATURE {
                    registers.insert(TARGET_TEMPERATURE, value);
                }
                writer.write_response(&reply, None)?;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:5025".to_string());
    let listener = TcpListener::bind(&addr)?;
    eprintln!("[device] listening on tcp://{addr}");

    for stream in listener.incoming() {
        let stream = stream?;
        thread::spawn(move || {
            if let Err(err) = serve(stream) {
                eprintln!("[device] session ended: {err}");
            }
        });
    }
    Ok(())
}
