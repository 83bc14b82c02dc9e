//! The `dialectic` binary end to end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn dialectic(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dialectic"))
        .args(args)
        .current_dir(dir)
        .env("DIALECTIC_CONFIG", dir.join("missing.toml"))
        .env_remove("RUST_LOG")
        .output()
        .expect("run dialectic")
}

fn json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("write fixture");
}

const CONCEDED: &str = r#"[
    {"id": "m1", "kind": "ASSERT", "actorId": "alice", "payload": {"text": "Offer"}},
    {"id": "m2", "kind": "CONCEDE", "actorId": "bob"}
]"#;

#[test]
fn step_prints_a_convergent_trace() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "moves.json", CONCEDED);
    let output = dialectic(dir.path(), &["step", "moves.json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let response = json(&output);
    assert_eq!(response["status"], "CONVERGENT");
    assert_eq!(response["decisiveIndices"], serde_json::json!([1]));
}

#[test]
fn compile_reports_designs_and_scopes() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "moves.json", CONCEDED);
    let output = dialectic(dir.path(), &["compile", "moves.json", "--scoping", "per-target"]);
    assert!(output.status.success());
    let report = json(&output);
    assert_eq!(report["designs"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["scopes"][0]["label"], "legacy");
}

#[test]
fn solve_labels_a_framework() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "af.json",
        r#"{"nodes": ["a", "b"], "attacks": [["a", "b"], ["b", "a"]]}"#,
    );
    let grounded = dialectic(dir.path(), &["solve", "af.json"]);
    assert_eq!(json(&grounded)["a"], "UNDEC");

    let preferred = dialectic(dir.path(), &["solve", "af.json", "--semantics", "preferred"]);
    assert!(preferred.status.success());
    assert!(json(&preferred)["b"].is_string());
}

#[test]
fn rejected_attack_exits_with_failure() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "attack.json",
        r#"{"attackType": "UNDERCUTS", "targetScope": "conclusion", "fromArgumentId": "arg2", "toArgumentId": "arg1"}"#,
    );
    let output = dialectic(dir.path(), &["validate-attack", "attack.json"]);
    assert!(!output.status.success());
    let verdict = json(&output);
    assert_eq!(verdict["ok"], false);
    assert_eq!(verdict["rule"], "attack.scope_mismatch");
}

#[test]
fn undermining_a_registered_argument_passes() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "args.json",
        r#"{"arg1": {"conclusionId": "c", "premiseIds": ["p1", "p2"]}}"#,
    );
    write(
        dir.path(),
        "attack.json",
        r#"{"attackType": "UNDERMINES", "targetScope": "premise", "fromArgumentId": "arg2",
            "toArgumentId": "arg1", "targetPremiseId": "p2"}"#,
    );
    let output = dialectic(
        dir.path(),
        &["validate-attack", "attack.json", "--arguments", "args.json"],
    );
    assert!(output.status.success());
    assert_eq!(json(&output)["ok"], true);
}

#[test]
fn commitments_are_chained_per_owner() {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "stores.json",
        r#"{
            "alice": [{"label": "rain", "basePolarity": "pos"}, {"label": "rain -> wet", "basePolarity": "neg"}],
            "bob": [{"label": "not rain", "basePolarity": "pos"}]
        }"#,
    );
    let output = dialectic(dir.path(), &["commitments", "stores.json"]);
    assert!(output.status.success());
    let results = json(&output);
    assert_eq!(results["alice"]["derivedFacts"], serde_json::json!(["wet"]));
    assert_eq!(results["bob"]["contradictions"], serde_json::json!([]));
}

#[test]
fn config_file_caps_the_stepper() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "moves.json", CONCEDED);
    write(dir.path(), "config.toml", "[stepper]\nmax_pairs = 1\n");
    let output = dialectic(dir.path(), &["--config", "config.toml", "step", "moves.json"]);
    assert!(output.status.success());
    assert_eq!(json(&output)["status"], "STUCK");
}

#[test]
fn unreadable_input_is_an_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = dialectic(dir.path(), &["compile", "nope.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.json"));
}
