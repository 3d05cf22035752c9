//! Read-temperature example: open a controller and print its temperatures.
//!
//! Run with:
//!   cargo run --example read-temperature -- /dev/ttyUSB0
//!   cargo run --example read-temperature -- tcp://127.0.0.1:5025

use mecom::session::{open, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let session: Session = open(&device)?;
    println!("device {device} answers at address {}", session.address()?);
    println!("object temperature: {:.2} °C", session.read_object_temperature()?);
    println!("target temperature: {:.2} °C", session.read_target_temperature()?);

    Ok(())
}
