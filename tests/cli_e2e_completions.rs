//! End-to-end tests for the `organizer completions` command.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("organizer");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("powershell"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("organizer");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_organizer()"))
        .stdout(predicate::str::contains("map"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("organizer");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef organizer"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("organizer");
    cmd.arg("completions")
        .arg("tcsh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
