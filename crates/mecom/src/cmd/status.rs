use serde::Serialize;

use crate::cmd::{Context, StatusArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{format_float, print, Render};

#[derive(Serialize)]
struct StatusOutput {
    schema_id: &'static str,
    device: String,
    address: u8,
    object_temperature: f32,
    target_temperature: f32,
}

impl Render for StatusOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device", self.device.clone()),
            ("address", self.address.to_string()),
            ("object_temperature", format_float(self.object_temperature)),
            ("target_temperature", format_float(self.target_temperature)),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        format!(
            "{} {} {}\n",
            self.address, self.object_temperature, self.target_temperature
        )
        .into_bytes()
    }
}

pub fn run(_args: StatusArgs, ctx: &Context) -> CliResult<i32> {
    let session = ctx.open_session()?;
    let address = session
        .address()
        .map_err(|err| session_error("status failed", err))?;
    let object_temperature = session
        .read_object_temperature()
        .map_err(|err| session_error("reading object temperature failed", err))?;
    let target_temperature = session
        .read_target_temperature()
        .map_err(|err| session_error("reading target temperature failed", err))?;

    let out = StatusOutput {
        schema_id: "https://schemas.3leaps.dev/mecom/cli/v1/status.schema.json",
        device: ctx.device.clone().unwrap_or_default(),
        address,
        object_temperature,
        target_temperature,
    };
    print(&out, ctx.format);
    Ok(SUCCESS)
}
