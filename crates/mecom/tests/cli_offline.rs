#![cfg(feature = "cli")]

use std::process::Command;

fn mecom() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mecom"));
    cmd.env_remove("MECOM_DEVICE")
        .env_remove("MECOM_BAUD")
        .env_remove("MECOM_TIMEOUT")
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn encode_read_prints_known_frame() {
    let output = mecom()
        .args(["--format", "json", "encode", "read", "1000"])
        .args(["--address", "2", "--sequence", "3"])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"frame\":\"#020003?VR03E801AC05\""));
    assert!(stdout.contains("\"checksum\":\"AC05\""));
}

#[test]
fn encode_raw_is_wire_exact() {
    let output = mecom()
        .args(["--format", "raw", "encode", "set", "3000", "25"])
        .args(["--address", "2", "--sequence", "4"])
        .output()
        .expect("encode should run");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"#020004VS0BB80141C800002434\r");
}

#[test]
fn decode_response_line() {
    let output = mecom()
        .args(["--format", "json", "decode", "!020003421600000AB2"])
        .output()
        .expect("decode should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"float32\":37.5"));
    assert!(stdout.contains("\"direction\":\"response\""));
}

#[test]
fn decode_bad_checksum_returns_60() {
    let output = mecom()
        .args(["decode", "!020003421600000AB3"])
        .output()
        .expect("decode should run");
    assert_eq!(output.status.code(), Some(60));

    let lenient = mecom()
        .args(["--lenient", "--format", "raw", "decode", "!020003421600000AB3"])
        .output()
        .expect("decode should run");
    assert!(lenient.status.success());
    assert_eq!(lenient.stdout, b"37.5\n");
}

#[test]
fn missing_device_returns_64() {
    let output = mecom().arg("status").output().expect("status should run");
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MECOM_DEVICE"));
}

#[test]
fn invalid_timeout_returns_64() {
    let output = mecom()
        .args(["--timeout", "0s", "version"])
        .output()
        .expect("version should run");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_extended_lists_build_info() {
    let output = mecom()
        .args(["version", "--extended"])
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: mecom"));
    assert!(stdout.contains("default baud 57600"));
}
