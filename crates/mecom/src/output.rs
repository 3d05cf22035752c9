use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that can be printed in every output format.
pub trait Render: Serialize {
    /// Field/value pairs for table and pretty output.
    fn rows(&self) -> Vec<(&'static str, String)>;

    /// Bytes written verbatim for `--format raw`.
    fn raw(&self) -> Vec<u8>;
}

pub fn print<R: Render>(value: &R, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for (field, val) in value.rows() {
                table.add_row(vec![field.to_string(), val]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = value
                .rows()
                .into_iter()
                .map(|(field, val)| format!("{field}={val}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
        OutputFormat::Raw => print_raw(&value.raw()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Format a reading with enough digits to round-trip an `f32`.
pub fn format_float(value: f32) -> String {
    format!("{value}")
}

pub fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Wire line as text, terminator removed.
pub fn printable_line(line: &[u8]) -> String {
    String::from_utf8_lossy(line)
        .trim_end_matches('\r')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        value: f32,
    }

    impl Render for Sample {
        fn rows(&self) -> Vec<(&'static str, String)> {
            vec![("value", format_float(self.value))]
        }

        fn raw(&self) -> Vec<u8> {
            format!("{}\n", self.value).into_bytes()
        }
    }

    #[test]
    fn rows_and_raw() {
        let sample = Sample { value: 37.5 };
        assert_eq!(sample.rows(), vec![("value", "37.5".to_string())]);
        assert_eq!(sample.raw(), b"37.5\n");
        assert_eq!(serde_json::to_string(&sample).unwrap(), r#"{"value":37.5}"#);
    }

    #[test]
    fn printable_line_drops_terminator() {
        assert_eq!(printable_line(b"!0200042B78\r"), "!0200042B78");
    }
}
