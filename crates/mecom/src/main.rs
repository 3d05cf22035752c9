mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use mecom_session::SessionConfig;
use mecom_transport::DEFAULT_BAUD_RATE;

use crate::cmd::{parse_duration, Command, Context};
use crate::exit::CliResult;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "mecom", version, about = "TEC controller CLI")]
struct Cli {
    /// Serial device path or `tcp://host:port` bridge.
    #[arg(long, short = 'd', env = "MECOM_DEVICE", global = true)]
    device: Option<String>,

    /// Serial line rate.
    #[arg(long, env = "MECOM_BAUD", default_value_t = DEFAULT_BAUD_RATE, global = true)]
    baud: u32,

    /// Response timeout (e.g. 1s, 500ms).
    #[arg(long, env = "MECOM_TIMEOUT", default_value = "1s", global = true)]
    timeout: String,

    /// Accept responses whose checksum does not match.
    #[arg(long, global = true)]
    lenient: bool,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn context(&self) -> CliResult<Context> {
        let timeout = parse_duration(&self.timeout)?;
        let mut config = SessionConfig {
            response_timeout: timeout,
            write_timeout: Some(timeout),
            verify_checksum: !self.lenient,
            ..SessionConfig::default()
        };
        config.serial.baud_rate = self.baud;
        config.serial.timeout = timeout;

        Ok(Context {
            device: self.device.clone(),
            config,
            format: self.format.unwrap_or_else(OutputFormat::default_for_stdout),
        })
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = cli.context().and_then(|ctx| cmd::run(cli.command, &ctx));

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
