//! CLI interface tests

use std::process::Command;
use tempfile::TempDir;

fn tra_glossary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tra-glossary"))
}

/// Point the config lookup at an empty directory so a user's own config
/// never leaks into the test.
fn isolated(config_home: &TempDir) -> Command {
    let mut cmd = tra_glossary();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn test_help_command() {
    let output = tra_glossary()
        .arg("--help")
        .output()
        .expect("Failed to run help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("build"), "Should list build command");
    assert!(stdout.contains("check"), "Should list check command");
    assert!(stdout.contains("config"), "Should list config command");
}

#[test]
fn test_version_command() {
    let output = tra_glossary()
        .arg("--version")
        .output()
        .expect("Failed to run version");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tra-glossary"), "Should show program name");
}

#[test]
fn test_build_help() {
    let output = tra_glossary()
        .args(["build", "--help"])
        .output()
        .expect("Failed to run build help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--games"), "Should have games option");
    assert!(stdout.contains("--output"), "Should have output option");
    assert!(
        stdout.contains("--extract-terms"),
        "Should have extract-terms option"
    );
    assert!(
        stdout.contains("--include-stats"),
        "Should have include-stats option"
    );
    assert!(stdout.contains("--patterns"), "Should have patterns option");
}

#[test]
fn test_unknown_game_rejected() {
    let output = tra_glossary()
        .args(["build", "--games", "bg3"])
        .output()
        .expect("Failed to run build");

    assert!(!output.status.success(), "Should reject unknown game");
}

#[test]
fn test_invalid_command() {
    let output = tra_glossary()
        .arg("invalid_command")
        .output()
        .expect("Failed to run invalid command");

    assert!(!output.status.success(), "Should fail on invalid command");
}

#[test]
fn test_missing_input() {
    let output = tra_glossary()
        .arg("check")
        .output()
        .expect("Failed to run check without input");

    assert!(!output.status.success(), "Should fail without input");
}

#[test]
fn test_missing_source_dir() {
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let output = isolated(&config_home)
        .args(["build", "--source-dir"])
        .arg(work.path().join("nowhere"))
        .arg("-o")
        .arg(work.path().join("out.json"))
        .output()
        .expect("Failed to run build");

    assert!(!output.status.success(), "Should fail without TRA files");
    assert!(!work.path().join("out.json").exists());
}

#[test]
#[cfg(target_os = "linux")]
fn test_config_set_and_get() {
    let config_home = TempDir::new().unwrap();

    let output = isolated(&config_home)
        .args(["config", "set", "extraction.min_span_count", "4"])
        .output()
        .expect("Failed to run config set");
    assert!(
        output.status.success(),
        "config set failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        config_home
            .path()
            .join("tra-glossary")
            .join("config.toml")
            .exists()
    );

    let output = isolated(&config_home)
        .args(["config", "get", "extraction.min_span_count"])
        .output()
        .expect("Failed to run config get");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("extraction.min_span_count = 4"));

    let output = isolated(&config_home)
        .args(["config", "get", "general.source_dir"])
        .output()
        .expect("Failed to run config get");
    assert!(String::from_utf8_lossy(&output.stdout).contains("(not set)"));
}

#[test]
fn test_config_unknown_key() {
    let config_home = TempDir::new().unwrap();
    let output = isolated(&config_home)
        .args(["config", "get", "api.openai_api_key"])
        .output()
        .expect("Failed to run config get");

    assert!(!output.status.success(), "Should reject unknown key");
}
