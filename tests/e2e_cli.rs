//! CLI end-to-end tests
//!
//! Tests for the ripforge command-line interface.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the ripforge binary
#[allow(deprecated)]
fn ripforge_cmd() -> Command {
    Command::cargo_bin("ripforge").unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = ripforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = ripforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ripforge"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = ripforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_rip_help() {
    let mut cmd = ripforge_cmd();
    cmd.args(["rip", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rip discs"))
        .stdout(predicate::str::contains("--min"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = ripforge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("HandBrakeCLI"));
}

#[test]
fn test_cli_rip_missing_output_dir_fails() {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mkv");
    fs::write(&movie, b"source").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("rip")
        .arg("-i")
        .arg(&movie)
        .args(["-t", "movie"])
        .arg("-o")
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_cli_rip_file_without_title_fails() {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mkv");
    fs::write(&movie, b"source").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("rip")
        .arg("-i")
        .arg(&movie)
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("title is required"));
}

#[test]
fn test_cli_rip_file_dry_run() {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mkv");
    fs::write(&movie, b"source").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("rip")
        .arg("--dry-run")
        .arg("-i")
        .arg(&movie)
        .args(["-t", "movie", "-b", "nonexistent_tool_xyz_12345"])
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Used Title"));
}

#[cfg(unix)]
#[test]
fn test_cli_rip_file_runs_transcoder() {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mkv");
    fs::write(&movie, b"source").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("rip")
        .arg("-i")
        .arg(&movie)
        .args(["-t", "movie", "-b", "true", "-x", "av_mkv"])
        .arg("-o")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("--format av_mkv"))
        .stderr(predicate::str::contains("Movie.mkv"));
}

#[cfg(unix)]
#[test]
fn test_cli_rip_transcoder_failure_exits_non_zero() {
    let dir = tempdir().unwrap();
    let movie = dir.path().join("movie.mkv");
    fs::write(&movie, b"source").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("rip")
        .arg("-i")
        .arg(&movie)
        .args(["-t", "movie", "-b", "false"])
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool error"));
}

#[test]
fn test_cli_invalid_min_length() {
    let mut cmd = ripforge_cmd();
    cmd.args(["rip", "--min", "forever"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
}

#[test]
fn test_cli_bad_config_file_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("ripforge.toml");
    fs::write(&config, "min_length = [1, 2]\n").unwrap();

    let mut cmd = ripforge_cmd();
    cmd.arg("--config")
        .arg(&config)
        .args(["rip", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
