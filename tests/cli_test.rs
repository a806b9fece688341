use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn sailsync(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("sailsync").unwrap();
    cmd.current_dir(dir)
        .env_remove("SAILTHRU_API_KEY")
        .env_remove("SAILTHRU_API_SECRET")
        .env_remove("SAILTHRU_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_describes_the_tool() {
    let dir = tempfile::tempdir().unwrap();
    sailsync(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sailthru").and(predicate::str::contains("--env")));
}

#[test]
fn missing_credentials_fail_before_any_prompt() {
    let dir = tempfile::tempdir().unwrap();
    sailsync(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}

#[test]
fn named_env_file_supplies_credentials() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".env.staging"),
        "SAILTHRU_API_KEY=key\nSAILTHRU_API_SECRET=secret\n",
    )
    .unwrap();
    // Broken config proves we got past the credential check.
    fs::write(dir.path().join("sailsync.json"), "{ broken").unwrap();

    sailsync(dir.path())
        .args(["--env", "staging"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("sailsync.json")
                .and(predicate::str::contains("Missing credentials").not()),
        );
}

#[test]
fn default_env_file_is_not_used_for_a_named_env() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(".env"),
        "SAILTHRU_API_KEY=key\nSAILTHRU_API_SECRET=secret\n",
    )
    .unwrap();

    sailsync(dir.path())
        .args(["--env", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}

#[test]
fn unknown_arguments_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    sailsync(dir.path()).arg("push").assert().failure();
}
