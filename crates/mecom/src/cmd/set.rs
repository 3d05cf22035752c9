use mecom_session::{Session, SET_TEMPERATURE, TEC_CURRENT, TEC_VOLTAGE};
use serde::Serialize;
use tracing::info;

use crate::cmd::{Context, SetArgs, SetTempArgs, TecArgs};
use crate::exit::{session_error, CliError, CliResult, SUCCESS};
use crate::output::{format_float, print, Render};

#[derive(Serialize)]
struct SetOutput {
    schema_id: &'static str,
    parameter_id: u16,
    instance: u8,
    value: f32,
    acknowledged: bool,
}

impl Render for SetOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("parameter_id", self.parameter_id.to_string()),
            ("instance", self.instance.to_string()),
            ("value", format_float(self.value)),
            ("acknowledged", self.acknowledged.to_string()),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        b"ok\n".to_vec()
    }
}

pub fn run(args: SetArgs, ctx: &Context) -> CliResult<i32> {
    let session = ctx.open_session()?;
    write(&session, ctx, args.parameter, args.instance, args.value)
}

pub fn run_set_temp(args: SetTempArgs, ctx: &Context) -> CliResult<i32> {
    let session = ctx.open_session()?;
    write(&session, ctx, SET_TEMPERATURE, 1, args.celsius)
}

pub fn run_tec(args: TecArgs, ctx: &Context) -> CliResult<i32> {
    let (parameter, value) = match (args.voltage, args.current) {
        (Some(volts), None) => (TEC_VOLTAGE, volts),
        (None, Some(amps)) => (TEC_CURRENT, amps),
        _ => return Err(CliError::usage("give exactly one of --voltage or --current")),
    };
    let session = ctx.open_session()?;
    write(&session, ctx, parameter, 1, value)
}

fn write(
    session: &Session,
    ctx: &Context,
    parameter_id: u16,
    instance: u8,
    value: f32,
) -> CliResult<i32> {
    if !value.is_finite() {
        return Err(CliError::usage(format!("value must be finite, got {value}")));
    }
    session
        .set_float(parameter_id, instance, value)
        .map_err(|err| session_error(&format!("writing parameter {parameter_id} failed"), err))?;
    info!(parameter_id, instance, value, "parameter written");

    let out = SetOutput {
        schema_id: "https://schemas.3leaps.dev/mecom/cli/v1/value-set.schema.json",
        parameter_id,
        instance,
        value,
        acknowledged: true,
    };
    print(&out, ctx.format);
    Ok(SUCCESS)
}
