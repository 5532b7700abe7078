//! CLI tests for `argcursor varargs`.

use std::process::Command;

use assert_cmd::cargo;
use serde_json::Value;

fn argcursor_cmd() -> Command {
    Command::new(cargo::cargo_bin!("argcursor"))
}

fn run_json(tokens: &[&str]) -> (bool, Value) {
    let output = argcursor_cmd()
        .args(["--output", "json", "varargs", "--"])
        .args(tokens)
        .output()
        .expect("run varargs command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("valid json");
    (output.status.success(), json)
}

#[test]
fn group_and_rest() {
    let (ok, json) = run_json(&["3", "a", "b", "c", "d"]);
    assert!(ok);
    assert_eq!(json["group"], serde_json::json!(["a", "b", "c"]));
    assert_eq!(json["rest"], serde_json::json!(["d"]));
}

#[test]
fn short_group_is_missing_argument() {
    let (ok, json) = run_json(&["4", "a"]);
    assert!(!ok);
    assert_eq!(json["diagnostics"][0]["id"], "AC1002");
    assert_eq!(json["diagnostics"][0]["span"]["start"], 2);
}

#[test]
fn non_numeric_count_is_parse_failure() {
    let (ok, json) = run_json(&["some", "a"]);
    assert!(!ok);
    assert_eq!(json["diagnostics"][0]["id"], "AC1001");
    assert_eq!(json["diagnostics"][0]["span"]["start"], 0);
}
