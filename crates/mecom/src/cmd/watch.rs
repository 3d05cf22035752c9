use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cmd::{parse_duration, Context, WatchArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{format_float, now_unix_millis, print, Render};

const SLEEP_SLICE: Duration = Duration::from_millis(50);

#[derive(Serialize)]
struct Sample {
    schema_id: &'static str,
    sample: usize,
    timestamp_ms: u128,
    object_temperature: f32,
}

impl Render for Sample {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sample", self.sample.to_string()),
            ("timestamp_ms", self.timestamp_ms.to_string()),
            ("object_temperature", format_float(self.object_temperature)),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        format!("{}\n", self.object_temperature).into_bytes()
    }
}

pub fn run(args: WatchArgs, ctx: &Context) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let session = ctx.open_session()?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut taken = 0usize;
    while running.load(Ordering::SeqCst) {
        let started = Instant::now();
        let object_temperature = session
            .read_object_temperature()
            .map_err(|err| session_error("reading object temperature failed", err))?;
        taken = taken.saturating_add(1);

        print(
            &Sample {
                schema_id: "https://schemas.3leaps.dev/mecom/cli/v1/temperature-sample.schema.json",
                sample: taken,
                timestamp_ms: now_unix_millis(),
                object_temperature,
            },
            ctx.format,
        );

        if args.count.is_some_and(|count| taken >= count) {
            break;
        }
        sleep_until(started + interval, &running);
    }

    Ok(SUCCESS)
}

fn sleep_until(deadline: Instant, running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
