use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn temp_path(suffix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tally-cli-{}{}", uuid::Uuid::new_v4(), suffix))
}

#[test]
fn test_list_publishers() {
    Command::cargo_bin("tally")
        .unwrap()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("json_lines"))
        .stdout(predicate::str::contains("http"));
}

#[test]
fn test_validate_rejects_bad_scope() {
    let scope = temp_path(".yaml");
    std::fs::write(&scope, "namespace: svc\napp_name: \"\"\n").unwrap();

    Command::cargo_bin("tally")
        .unwrap()
        .args(["validate", scope.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Scope is invalid"));

    std::fs::remove_file(scope).unwrap();
}

#[test]
fn test_replay_then_report() {
    let published = temp_path(".jsonl");
    let scope = temp_path(".yaml");
    let observations = temp_path("-obs.jsonl");

    std::fs::write(
        &scope,
        format!(
            "namespace: svc\napp_name: search\ncomponent: index\npublisher:\n  type: json_lines\n  path: {}\n",
            published.display()
        ),
    )
    .unwrap();
    std::fs::write(
        &observations,
        "{\"name\":\"lookup\",\"kind\":\"duration\",\"value\":42}\n{\"name\":\"requests\",\"kind\":\"count\"}\n{\"name\":\"requests\",\"kind\":\"count\"}\n",
    )
    .unwrap();

    Command::cargo_bin("tally")
        .unwrap()
        .args([
            "--quiet",
            "replay",
            scope.to_str().unwrap(),
            observations.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("published 2 metrics"));

    Command::cargo_bin("tally")
        .unwrap()
        .args(["report", published.to_str().unwrap(), "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Batch 1: search"))
        .stdout(predicate::str::contains("requests"))
        .stdout(predicate::str::contains("[namespace=svc,component=index]"));

    for path in [published, scope, observations] {
        std::fs::remove_file(path).unwrap();
    }
}
