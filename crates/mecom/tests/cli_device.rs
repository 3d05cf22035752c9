#![cfg(feature = "cli")]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

use mecom_frame::{checksum, decode_request, Command as Request};

const ADDRESS: u8 = 2;

enum Reply {
    Uint(u32),
    Float(f32),
    Ack,
    Raw(&'static str),
    Silent,
}

/// Accept one connection and answer each request via `handler`.
///
/// Returns the bound address and a handle yielding the requests seen.
fn fake_device<F>(handler: F) -> (String, JoinHandle<Vec<Request>>)
where
    F: Fn(&Request) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("local addr").to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("client should connect");
        let mut writer = stream.try_clone().expect("stream should clone");
        let mut reader = BufReader::new(stream);
        let mut seen = Vec::new();

        loop {
            let mut line = Vec::new();
            match reader.read_until(b'\r', &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let body = line.strip_suffix(b"\r").unwrap_or(&line);
            let (header, request) = decode_request(body, true).expect("valid request");
            seen.push(request);

            let value = match handler(&request) {
                Reply::Uint(v) => format!("{v:08X}"),
                Reply::Float(v) => format!("{:08X}", v.to_bits()),
                Reply::Ack => String::new(),
                Reply::Raw(line) => {
                    let _ = writer.write_all(line.as_bytes());
                    continue;
                }
                Reply::Silent => continue,
            };
            let mut out = format!("!{ADDRESS:02X}{:04X}{value}", header.sequence);
            out.push_str(&format!("{:04X}\r", checksum(out.as_bytes())));
            if writer.write_all(out.as_bytes()).is_err() {
                break;
            }
        }
        seen
    });

    (format!("tcp://{addr}"), handle)
}

fn controller(request: &Request) -> Reply {
    match *request {
        Request::ValueRead {
            parameter_id: 2051, ..
        } => Reply::Uint(u32::from(ADDRESS)),
        Request::ValueRead {
            parameter_id: 1000, ..
        } => Reply::Float(37.5),
        Request::ValueRead {
            parameter_id: 1010, ..
        } => Reply::Float(25.0),
        Request::ValueRead { .. } => Reply::Uint(0x0001_0007),
        Request::ValueSet { .. } => Reply::Ack,
    }
}

fn run(device: &str, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mecom"))
        .env_remove("MECOM_TIMEOUT")
        .env("MECOM_DEVICE", device)
        .args(["--log-level", "error", "--timeout", "500ms"])
        .args(args)
        .output()
        .expect("mecom should run")
}

#[test]
fn status_reads_address_and_temperatures() {
    let (device, handle) = fake_device(controller);
    let output = run(&device, &["--format", "json", "status"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"address\":2"));
    assert!(stdout.contains("\"object_temperature\":37.5"));
    assert!(stdout.contains("\"target_temperature\":25.0"));

    let seen = handle.join().expect("device thread");
    assert_eq!(
        seen,
        vec![
            Request::read(2051, 1),
            Request::read(1000, 1),
            Request::read(1010, 1)
        ]
    );
}

#[test]
fn get_as_uint_keeps_low_half() {
    let (device, handle) = fake_device(controller);
    let output = run(&device, &["--format", "raw", "get", "108", "--as", "uint"]);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"7\n");
    handle.join().expect("device thread");
}

#[test]
fn set_temp_writes_setpoint() {
    let (device, handle) = fake_device(controller);
    let output = run(&device, &["--format", "raw", "set-temp", "21.5"]);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"ok\n");

    let seen = handle.join().expect("device thread");
    assert_eq!(seen[1], Request::set(3000, 1, 21.5));
}

#[test]
fn tec_current_targets_current_parameter() {
    let (device, handle) = fake_device(controller);
    let output = run(&device, &["--format", "json", "tec", "--current", "1.25"]);

    assert!(output.status.success());
    let seen = handle.join().expect("device thread");
    assert_eq!(seen[1], Request::set(50001, 1, 1.25));
}

#[test]
fn watch_stops_after_count() {
    let (device, handle) = fake_device(controller);
    let output = run(
        &device,
        &["--format", "raw", "watch", "--interval", "10ms", "--count", "3"],
    );

    assert!(output.status.success());
    assert_eq!(output.stdout, b"37.5\n37.5\n37.5\n");
    assert_eq!(handle.join().expect("device thread").len(), 4);
}

#[test]
fn silent_device_returns_124() {
    let (device, handle) = fake_device(|_| Reply::Silent);
    let output = run(&device, &["status"]);

    assert_eq!(output.status.code(), Some(124));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bootstrap"));
    handle.join().expect("device thread");
}

#[test]
fn corrupted_response_returns_60() {
    let (device, handle) = fake_device(|request| match request.parameter_id() {
        2051 => Reply::Uint(u32::from(ADDRESS)),
        _ => Reply::Raw("!020002421600000000\r"),
    });
    let output = run(&device, &["get", "1000"]);

    assert_eq!(output.status.code(), Some(60));
    handle.join().expect("device thread");
}

#[test]
fn refused_connection_returns_3() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let output = run(&format!("tcp://{addr}"), &["status"]);
    assert_eq!(output.status.code(), Some(3));
}
