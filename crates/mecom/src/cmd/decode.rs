use mecom_frame::{decode_request, decode_response, Command, CONTROL_HOST};
use serde::Serialize;

use crate::cmd::{Context, DecodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{format_float, print, Render};

#[derive(Serialize, Default, Debug)]
struct DecodeOutput {
    schema_id: &'static str,
    direction: &'static str,
    address: u8,
    sequence: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    float32: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uint16: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_error: Option<u8>,
    ack: bool,
}

impl Render for DecodeOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("direction", self.direction.to_string()),
            ("address", self.address.to_string()),
            ("sequence", self.sequence.to_string()),
        ];
        if let Some(command) = self.command {
            rows.push(("command", command.to_string()));
        }
        if let Some(id) = self.parameter_id {
            rows.push(("parameter_id", id.to_string()));
        }
        if let Some(instance) = self.instance {
            rows.push(("instance", instance.to_string()));
        }
        if let Some(hex) = &self.value_hex {
            rows.push(("value_hex", hex.clone()));
        }
        if let Some(v) = self.float32 {
            rows.push(("float32", format_float(v)));
        }
        if let Some(v) = self.uint16 {
            rows.push(("uint16", v.to_string()));
        }
        if let Some(code) = self.device_error {
            rows.push(("device_error", code.to_string()));
        }
        if self.ack {
            rows.push(("ack", "true".to_string()));
        }
        rows
    }

    fn raw(&self) -> Vec<u8> {
        let text = match (self.float32, self.device_error) {
            (Some(v), _) => v.to_string(),
            (None, Some(code)) => format!("error {code}"),
            (None, None) => "ok".to_string(),
        };
        format!("{text}\n").into_bytes()
    }
}

pub fn run(args: DecodeArgs, ctx: &Context) -> CliResult<i32> {
    let out = decode(&args.line, ctx.config.verify_checksum)?;
    print(&out, ctx.format);
    Ok(SUCCESS)
}

fn decode(input: &str, verify: bool) -> CliResult<DecodeOutput> {
    let line = normalize(input);
    let schema_id = "https://schemas.3leaps.dev/mecom/cli/v1/frame-decoded.schema.json";

    if line.as_bytes().first() == Some(&CONTROL_HOST) {
        let (header, command) = decode_request(line.as_bytes(), verify)
            .map_err(|err| frame_error("decode failed", err))?;
        let value = match command {
            Command::ValueSet { value, .. } => Some(value),
            Command::ValueRead { .. } => None,
        };
        return Ok(DecodeOutput {
            schema_id,
            direction: "request",
            address: header.address,
            sequence: header.sequence,
            command: Some(command.token().as_str()),
            parameter_id: Some(command.parameter_id()),
            instance: Some(command.instance()),
            float32: value,
            ..DecodeOutput::default()
        });
    }

    let response =
        decode_response(line.as_bytes(), verify).map_err(|err| frame_error("decode failed", err))?;
    let device_error = response.device_error();
    let (float32, uint16) = match (response.as_float32(), response.as_uint16()) {
        (Ok(f), Ok(u)) => (Some(f), Some(u)),
        _ => (None, None),
    };
    Ok(DecodeOutput {
        schema_id,
        direction: "response",
        address: response.header.address,
        sequence: response.header.sequence,
        value_hex: (!response.is_ack())
            .then(|| String::from_utf8_lossy(&response.value).into_owned()),
        float32,
        uint16,
        device_error,
        ack: response.is_ack(),
        ..DecodeOutput::default()
    })
}

fn normalize(input: &str) -> &str {
    let line = input.trim();
    line.strip_suffix("\\r").unwrap_or(line)
}
