use std::net::UdpSocket;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dmxbridge"))
}

fn receiver() -> (UdpSocket, u16) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind receiver");
    socket
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    let port = socket.local_addr().expect("local addr").port();
    (socket, port)
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run").and(contains("broadcast")).and(contains("decode")));
    cmd().arg("run").arg("--help").assert().success();
}

#[test]
fn broadcast_prints_subnet_broadcast() {
    cmd()
        .arg("broadcast")
        .arg("192.168.1.10")
        .arg("255.255.255.0")
        .assert()
        .success()
        .stdout("192.168.1.255\n");
    cmd()
        .arg("broadcast")
        .arg("10.0.0.5")
        .arg("255.0.0.0")
        .assert()
        .success()
        .stdout("10.255.255.255\n");
}

#[test]
fn broadcast_invalid_address_shows_error_and_hint() {
    cmd()
        .arg("broadcast")
        .arg("10.0.0")
        .arg("255.0.0.0")
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn encode_empty_payload_is_header_only() {
    let assert = cmd()
        .arg("encode")
        .arg("--universe")
        .arg("0")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let hex = stdout.trim();
    assert_eq!(hex.len(), 36);
    assert!(hex.starts_with("4172742d4e657400"));
    assert!(hex.ends_with("0000"));
}

#[test]
fn encode_rejects_large_universe() {
    cmd()
        .arg("encode")
        .arg("--universe")
        .arg("40000")
        .assert()
        .failure()
        .stderr(contains("exceeds 15 bits"));
}

#[test]
fn encode_then_decode() {
    let assert = cmd()
        .arg("encode")
        .arg("--universe")
        .arg("258")
        .arg("--values")
        .arg("1,2,255")
        .assert()
        .success();
    let hex = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");

    for strict in [false, true] {
        let mut command = cmd();
        command.arg("decode").arg(hex.trim());
        if strict {
            command.arg("--strict");
        }
        let assert = command.assert().success();
        let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
        let value: Value = serde_json::from_str(&stdout).expect("valid json");
        assert_eq!(value["universe"], 258);
        assert_eq!(value["channelValues"], serde_json::json!([1, 2, 255]));
    }
}

#[test]
fn decode_short_frame_fails() {
    cmd()
        .arg("decode")
        .arg("4172742d")
        .assert()
        .code(2)
        .stderr(contains("payload too short"));
}

#[test]
fn decode_accepts_separators_and_rejects_bad_digits() {
    let header = "41:72:74:2d:4e:65:74:00 0050 000e 00 00 0100 0000";
    let assert = cmd().arg("decode").arg(header).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["universe"], 1);

    cmd()
        .arg("decode")
        .arg("4172zz")
        .assert()
        .code(2)
        .stderr(contains("invalid hex input").and(contains("hint:")));
}

#[test]
fn strict_decode_rejects_foreign_frames() {
    let zeros = "00".repeat(18);
    cmd().arg("decode").arg(&zeros).assert().success();
    cmd()
        .arg("decode")
        .arg(&zeros)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("not an ArtDmx frame"));
}

#[test]
fn run_forwards_stdin_messages() {
    let (socket, port) = receiver();

    cmd()
        .arg("run")
        .arg("--bind")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--destination-port")
        .arg(port.to_string())
        .arg("--output")
        .arg("lo=127.0.0.1/255.255.255.255")
        .arg("--log-level")
        .arg("error")
        .write_stdin("not json\n{\"universe\":5,\"channelValues\":[10,20]}\n")
        .timeout(Duration::from_secs(20))
        .assert()
        .success();

    let mut buf = [0u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).expect("frame forwarded");
    assert_eq!(len, 20);
    assert_eq!(&buf[..8], b"Art-Net\0");
    assert_eq!(buf[12], 0, "malformed line must not consume a sequence number");
    assert_eq!(buf[14], 5);
    assert_eq!(&buf[18..20], &[10, 20]);
}

#[test]
fn run_reads_outputs_file() {
    let (socket, port) = receiver();
    let temp = TempDir::new().expect("tempdir");
    let outputs = temp.path().join("outputs.json");
    std::fs::write(
        &outputs,
        r#"{"outputs":[{"name":"lo","address":"127.0.0.1","mask":"255.255.255.255"}]}"#,
    )
    .expect("write outputs file");

    cmd()
        .arg("run")
        .arg("--bind")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--destination-port")
        .arg(port.to_string())
        .arg("--outputs-file")
        .arg(&outputs)
        .write_stdin("{\"universe\":1,\"channelValues\":[]}\n")
        .timeout(Duration::from_secs(20))
        .assert()
        .success();

    let mut buf = [0u8; 1024];
    let (len, _) = socket.recv_from(&mut buf).expect("frame forwarded");
    assert_eq!(len, 18);
}

#[test]
fn run_rejects_invalid_output() {
    cmd()
        .arg("run")
        .arg("--bind")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--output")
        .arg("lan=10.0.0.1")
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("invalid output").and(contains("hint:")));
}

#[test]
fn run_rejects_bad_output_address() {
    cmd()
        .arg("run")
        .arg("--bind")
        .arg("127.0.0.1")
        .arg("--port")
        .arg("0")
        .arg("--output")
        .arg("lan=10.0.0.300/255.0.0.0")
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("out of range"));
}

#[test]
fn run_rejects_malformed_outputs_file() {
    let temp = TempDir::new().expect("tempdir");
    let outputs = temp.path().join("outputs.json");
    std::fs::write(&outputs, "{\"outputs\": 3}").expect("write outputs file");

    cmd()
        .arg("run")
        .arg("--port")
        .arg("0")
        .arg("--outputs-file")
        .arg(&outputs)
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(contains("invalid outputs file"));
}
