// CLI integration tests for single and multi-target fetches.
mod common;

use std::process::Command;

use common::{TestServer, unused_port};
use serde_json::{Value, json};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_reqjson");
    let mut command = Command::new(exe);
    command.env_remove("RUST_LOG");
    command
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn parse_json_lines(output: &[u8]) -> Vec<Value> {
    let text = String::from_utf8_lossy(output);
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_json)
        .collect()
}

#[test]
fn single_target_prints_document() {
    let server = TestServer::start().expect("server");
    let output = cmd()
        .arg(server.url("/pokemon/ditto"))
        .output()
        .expect("run");
    assert!(output.status.success());
    let value = parse_json(std::str::from_utf8(&output.stdout).expect("utf8"));
    assert_eq!(value["id"], 132);
}

#[test]
fn base_url_resolves_relative_targets() {
    let server = TestServer::start().expect("server");
    let output = cmd()
        .args(["--base", &server.url("/pokemon"), "ditto"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value = parse_json(std::str::from_utf8(&output.stdout).expect("utf8"));
    assert_eq!(value["name"], "ditto");
}

#[test]
fn async_multi_target_keeps_input_order() {
    let server = TestServer::start().expect("server");
    let output = cmd()
        .args([
            "--async",
            &server.url("/slow/2"),
            &server.url("/missing"),
            &server.url("/slow/1"),
        ])
        .output()
        .expect("run");
    assert!(output.status.success());
    let records = parse_json_lines(&output.stdout);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["data"], json!({"id": 2}));
    assert_eq!(records[1]["data"], json!({"error": "not found"}));
    assert_eq!(records[2]["data"], json!({"id": 1}));
    assert_eq!(records[1]["url"], server.url("/missing"));
}

#[test]
fn object_flag_fails_on_array_root() {
    let server = TestServer::start().expect("server");
    let output = cmd()
        .args(["--object", &server.url("/array")])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(5));
    let err = parse_json(std::str::from_utf8(&output.stderr).expect("utf8").trim());
    assert_eq!(err["error"]["kind"], "Shape");
}

#[test]
fn multi_target_reports_first_failure_code() {
    let server = TestServer::start().expect("server");
    let port = unused_port().expect("port");
    let refused = format!("http://127.0.0.1:{port}/");
    let output = cmd()
        .args([&server.url("/text"), &refused])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(4));
    let records = parse_json_lines(&output.stdout);
    assert_eq!(records[0]["error"]["kind"], "Decode");
    assert_eq!(records[0]["error"]["status"], 200);
    assert_eq!(records[1]["error"]["kind"], "Transport");
}

#[test]
fn bad_base_url_is_a_usage_error() {
    let output = cmd()
        .args(["--base", "ftp://example.com", "x"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(2));
    let err = parse_json(std::str::from_utf8(&output.stderr).expect("utf8").trim());
    assert_eq!(err["error"]["kind"], "Usage");
}
