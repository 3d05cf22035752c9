use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use mecom_session::{open_with_config, Session, SessionConfig};

use crate::exit::{session_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod get;
pub mod set;
pub mod status;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the device address and current temperatures.
    Status(StatusArgs),
    /// Read one parameter.
    Get(GetArgs),
    /// Write a float parameter.
    Set(SetArgs),
    /// Set the target temperature (°C).
    SetTemp(SetTempArgs),
    /// Set a static TEC output.
    Tec(TecArgs),
    /// Poll the object temperature until interrupted.
    Watch(WatchArgs),
    /// Print a request frame without talking to a device.
    Encode(EncodeArgs),
    /// Parse a frame line without talking to a device.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub device: Option<String>,
    pub config: SessionConfig,
    pub format: OutputFormat,
}

impl Context {
    /// Open the configured device and resolve its address.
    pub fn open_session(&self) -> CliResult<Session> {
        let device = self.device.as_deref().ok_or_else(|| {
            CliError::usage("no device given (use --device or set MECOM_DEVICE)")
        })?;
        open_with_config(device, &self.config)
            .map_err(|err| session_error(&format!("failed to open {device}"), err))
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Status(args) => status::run(args, ctx),
        Command::Get(args) => get::run(args, ctx),
        Command::Set(args) => set::run(args, ctx),
        Command::SetTemp(args) => set::run_set_temp(args, ctx),
        Command::Tec(args) => set::run_tec(args, ctx),
        Command::Watch(args) => watch::run(args, ctx),
        Command::Encode(args) => encode::run(args, ctx),
        Command::Decode(args) => decode::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ValueAs {
    #[default]
    Float,
    Uint,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Parameter id.
    pub parameter: u16,
    /// Parameter instance (channel).
    #[arg(long, short = 'i', default_value = "1")]
    pub instance: u8,
    /// How to interpret the value field.
    #[arg(long = "as", value_name = "KIND", default_value = "float")]
    pub kind: ValueAs,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Parameter id.
    pub parameter: u16,
    /// New value.
    #[arg(allow_negative_numbers = true)]
    pub value: f32,
    /// Parameter instance (channel).
    #[arg(long, short = 'i', default_value = "1")]
    pub instance: u8,
}

#[derive(Args, Debug)]
pub struct SetTempArgs {
    /// Target temperature in °C.
    #[arg(allow_negative_numbers = true)]
    pub celsius: f32,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TecArgs {
    /// Static output voltage in volts.
    #[arg(long, allow_negative_numbers = true)]
    pub voltage: Option<f32>,
    /// Static output current in amps.
    #[arg(long, allow_negative_numbers = true)]
    pub current: Option<f32>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Time between samples (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Exit after N samples.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    #[command(subcommand)]
    pub request: EncodeRequest,
    /// Device address placed in the header.
    #[arg(long, default_value = "0", global = true)]
    pub address: u8,
    /// Sequence number placed in the header.
    #[arg(long, default_value = "1", global = true)]
    pub sequence: u16,
}

#[derive(Subcommand, Debug)]
pub enum EncodeRequest {
    /// Value-read request (`?VR`).
    Read {
        parameter: u16,
        #[arg(long, short = 'i', default_value = "1")]
        instance: u8,
    },
    /// Value-set request (`VS`).
    Set {
        parameter: u16,
        #[arg(allow_negative_numbers = true)]
        value: f32,
        #[arg(long, short = 'i', default_value = "1")]
        instance: u8,
    },
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame line; a trailing CR or literal `\r` is ignored.
    pub line: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::usage(format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::usage("duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::USAGE;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn missing_device_is_usage_error() {
        let ctx = Context {
            device: None,
            config: SessionConfig::default(),
            format: OutputFormat::Json,
        };
        let err = ctx.open_session().unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
