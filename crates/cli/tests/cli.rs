//! End-to-end tests of the `relay` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn relay(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("relay").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("RUST_LOG", "off")
        .arg("--root")
        .arg(root);
    cmd
}

/// A project with two agents, no substitute delay and credentials kept
/// inside the project directory.
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let relay_dir = dir.path().join(".agent-relay");
    fs::create_dir_all(relay_dir.join("agents")).unwrap();
    fs::create_dir_all(relay_dir.join("pipelines")).unwrap();

    fs::write(
        relay_dir.join("config.toml"),
        format!(
            "substitute_delay_ms = 0\ncredentials_path = {:?}\n",
            dir.path().join("credentials.json")
        ),
    )
    .unwrap();
    fs::write(
        relay_dir.join("agents/a.md"),
        "---\nname: summariser\nmodel: gpt-4o-mini\nuser-prompt: Summarise:\n---\n",
    )
    .unwrap();
    fs::write(
        relay_dir.join("agents/b.md"),
        "---\nname: reviewer\nmodel: claude-3-haiku-20240307\nuser-prompt: Review:\n---\n",
    )
    .unwrap();
    fs::write(
        relay_dir.join("pipelines/p.yaml"),
        "name: two-step\nagents: [summariser, reviewer]\n",
    )
    .unwrap();
    fs::write(dir.path().join("doc.txt"), "ABC").unwrap();
    dir
}

#[test]
fn test_init_creates_project() {
    let dir = tempfile::tempdir().unwrap();

    relay(dir.path())
        .args(["init", "--minimal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    assert!(dir.path().join(".agent-relay/config.toml").exists());

    relay(dir.path()).arg("init").assert().failure();
}

#[test]
fn test_models_lists_table() {
    let dir = tempfile::tempdir().unwrap();
    relay(dir.path())
        .arg("models")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini-2.5-flash").and(predicate::str::contains("Anthropic")));
}

#[test]
fn test_exec_runs_pipeline_with_substitutes() {
    let dir = project();

    relay(dir.path())
        .args(["exec", "--document"])
        .arg(dir.path().join("doc.txt"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[MOCK OUTPUT for gpt-4o-mini]")
                .and(predicate::str::contains("[MOCK OUTPUT for claude-3-haiku-20240307]")),
        );
}

#[test]
fn test_exec_json_snapshot() {
    let dir = project();

    let output = relay(dir.path())
        .args(["exec", "--json", "--step", "0", "--document"])
        .arg(dir.path().join("doc.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["document_text"], "ABC");
    assert_eq!(snapshot["metrics"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["outputs"][1]["input"], snapshot["outputs"][0]["output"]);
}

#[test]
fn test_exec_rejects_unknown_step() {
    let dir = project();

    relay(dir.path())
        .args(["exec", "--step", "7", "--document"])
        .arg(dir.path().join("doc.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no agent at position 7"));
}

#[test]
fn test_keys_set_list_unset() {
    let dir = project();

    relay(dir.path())
        .args(["keys", "set", "gemini", "AIza-secret-1234"])
        .assert()
        .success();

    relay(dir.path())
        .args(["keys", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("...1234").and(predicate::str::contains("AIza").not()));

    relay(dir.path())
        .args(["keys", "unset", "gemini"])
        .assert()
        .success();

    let stored = fs::read_to_string(dir.path().join("credentials.json")).unwrap();
    assert!(!stored.contains("gemini"));
}

#[test]
fn test_exec_simulates_ocr_for_scans_without_key() {
    let dir = project();
    let scan = dir.path().join("scan.pdf");
    fs::write(&scan, [0x25, 0x50, 0x44, 0x46, 0xff, 0xfe]).unwrap();

    let output = relay(dir.path())
        .args(["exec", "--json", "--step", "0", "--document"])
        .arg(&scan)
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let document = snapshot["document_text"].as_str().unwrap();
    assert!(document.starts_with("# OCR Result for scan.pdf"));
    assert!(document.contains("(Simulated Extraction)"));
}

#[test]
fn test_keys_tolerate_unrecognised_stored_provider() {
    let dir = project();
    fs::write(
        dir.path().join("credentials.json"),
        r#"{"openai":"sk-stored-9876","mistral":"m-1"}"#,
    )
    .unwrap();

    relay(dir.path())
        .args(["keys", "set", "grok", "xai-5555"])
        .assert()
        .success();

    relay(dir.path())
        .args(["keys", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("...9876").and(predicate::str::contains("...5555")));

    let stored = fs::read_to_string(dir.path().join("credentials.json")).unwrap();
    assert!(!stored.contains("mistral"));
}
