use assert_cmd::Command;
use predicates::prelude::*;

fn ds() -> Command {
    Command::cargo_bin("ds").expect("binary should build")
}

#[test]
fn test_help_lists_workflow_commands() {
    ds().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("execute"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("undo"));
}

#[test]
fn test_version_flag() {
    ds().arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ds"));
}

#[test]
fn test_missing_configuration_is_reported() {
    ds().arg("sessions")
        .env_remove("DS_SITE_URL")
        .env_remove("DS_USERNAME")
        .env_remove("DS_APP_PASSWORD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DS_SITE_URL"));
}

#[test]
fn test_invalid_plan_file_is_rejected_before_any_request() {
    let dir = std::env::temp_dir();
    let path = dir.join("ds_invalid_plan_test.json");
    std::fs::write(&path, "{ not json").expect("write temp plan");

    ds().args(["execute", path.to_str().expect("utf-8 path")])
        .env("DS_SITE_URL", "http://127.0.0.1:9")
        .env("DS_USERNAME", "admin")
        .env("DS_APP_PASSWORD", "pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plan rejected"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_unknown_subcommand_fails() {
    ds().arg("teleport").assert().failure();
}

#[test]
fn test_publish_requires_session_id() {
    ds().arg("publish")
        .env("DS_SITE_URL", "http://127.0.0.1:9")
        .env("DS_USERNAME", "admin")
        .env("DS_APP_PASSWORD", "pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SESSION_ID"));
}
