use mecom_frame::{ResponseValue, ValueKind};
use serde::Serialize;

use crate::cmd::{Context, GetArgs, ValueAs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print, Render};

#[derive(Serialize)]
struct ValueOutput {
    schema_id: &'static str,
    parameter_id: u16,
    instance: u8,
    kind: &'static str,
    value: JsonValue,
    #[serde(skip)]
    display: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonValue {
    Float(f32),
    Uint(u16),
}

impl Render for ValueOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("parameter_id", self.parameter_id.to_string()),
            ("instance", self.instance.to_string()),
            ("kind", self.kind.to_string()),
            ("value", self.display.clone()),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        format!("{}\n", self.display).into_bytes()
    }
}

impl From<ValueAs> for ValueKind {
    fn from(kind: ValueAs) -> Self {
        match kind {
            ValueAs::Float => ValueKind::Float32,
            ValueAs::Uint => ValueKind::Uint16,
        }
    }
}

pub fn run(args: GetArgs, ctx: &Context) -> CliResult<i32> {
    let session = ctx.open_session()?;
    let value = session
        .read_value(args.parameter, args.instance, args.kind.into())
        .map_err(|err| session_error(&format!("reading parameter {} failed", args.parameter), err))?;

    print(&value_output(args.parameter, args.instance, value), ctx.format);
    Ok(SUCCESS)
}

fn value_output(parameter_id: u16, instance: u8, value: ResponseValue) -> ValueOutput {
    ValueOutput {
        schema_id: "https://schemas.3leaps.dev/mecom/cli/v1/value.schema.json",
        parameter_id,
        instance,
        kind: match value {
            ResponseValue::Float32(_) => "float",
            ResponseValue::Uint16(_) => "uint",
        },
        value: match value {
            ResponseValue::Float32(v) => JsonValue::Float(v),
            ResponseValue::Uint16(v) => JsonValue::Uint(v),
        },
        display: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_output_is_integral() {
        let out = value_output(2051, 1, ResponseValue::Uint16(2));
        assert_eq!(out.kind, "uint");
        assert_eq!(out.raw(), b"2\n");
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"value\":2}"));
        assert!(!json.contains("display"));
    }

    #[test]
    fn float_output() {
        let out = value_output(1000, 1, ResponseValue::Float32(37.5));
        assert_eq!(out.rows()[3], ("value", "37.5".to_string()));
    }
}
