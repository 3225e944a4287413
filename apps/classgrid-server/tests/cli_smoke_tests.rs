//! CLI smoke tests for the classgrid-server binary: help/version output,
//! configuration validation and --print-config.

use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_classgrid_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_classgrid-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute classgrid-server")
}

fn write_config(dir: &TempDir) -> std::path::PathBuf {
    let home = dir.path().join("home");
    let config_path = dir.path().join("config.yaml");
    let yaml = format!(
        r#"
server:
  home_dir: "{}"
  host: "127.0.0.1"
  port: 8099

database:
  url: "sqlite://database/classgrid.db"

modules:
  scheduling:
    minimum_lead_minutes: 0
    auto_confirm: false
"#,
        home.to_string_lossy().replace('\\', "/")
    );
    std::fs::write(&config_path, yaml).expect("Failed to write config");
    config_path
}

#[test]
fn help_lists_commands_and_options() {
    let output = run_classgrid_server(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("classgrid-server"));
    assert!(stdout.contains("Usage:") || stdout.contains("USAGE:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
}

#[test]
fn version_prints_binary_name() {
    let output = run_classgrid_server(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("classgrid-server"));
}

#[test]
fn check_accepts_valid_config() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir);

    let output = run_classgrid_server(&[
        "--config",
        config_path.to_str().unwrap(),
        "check",
    ]);
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn check_rejects_malformed_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("bad.yaml");
    std::fs::write(&config_path, "server:\n  port: \"not a port\"\n").unwrap();

    let output = run_classgrid_server(&[
        "--config",
        config_path.to_str().unwrap(),
        "check",
    ]);
    assert!(!output.status.success());
}

#[test]
fn print_config_emits_yaml() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir);

    let output = run_classgrid_server(&[
        "--config",
        config_path.to_str().unwrap(),
        "--print-config",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server:"));
    assert!(stdout.contains("port: 8099"));
}
