use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn vinohero(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_vinohero"));
    command
        .env("VINOHERO_CONFIG_DIR", config_dir)
        .env_remove("VINOHERO_CONFIG")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn config_where_reports_override_directory() {
    let root = TempDir::new().unwrap();
    let output = vinohero(root.path())
        .args(["config", "where"])
        .output()
        .expect("failed to run vinohero config where");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&root.path().join("vinohero.toml").display().to_string()));
    assert!(stdout.contains("missing"));
}

#[test]
fn config_where_reports_explicit_file() {
    let root = TempDir::new().unwrap();
    let custom = root.path().join("custom.toml");
    fs::write(&custom, "version = 1\n").unwrap();

    let output = vinohero(root.path())
        .args(["config", "where", "--config"])
        .arg(&custom)
        .output()
        .expect("failed to run vinohero config where");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&custom.display().to_string()));
    assert!(stdout.contains("explicit"));
    assert!(stdout.contains("present"));
    assert!(!stdout.contains(&root.path().join("vinohero.toml").display().to_string()));
}

#[test]
fn config_where_honours_config_env() {
    let root = TempDir::new().unwrap();
    let custom = root.path().join("from-env.toml");

    let output = vinohero(root.path())
        .env("VINOHERO_CONFIG", &custom)
        .args(["config", "where"])
        .output()
        .expect("failed to run vinohero config where");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&custom.display().to_string()));
    assert!(stdout.contains("loading will fail"));
}

#[test]
fn config_default_output_passes_check() {
    let root = TempDir::new().unwrap();
    let output = vinohero(root.path())
        .args(["config", "default"])
        .output()
        .expect("failed to run vinohero config default");
    assert!(output.status.success());
    let rendered = String::from_utf8(output.stdout).unwrap();
    assert!(rendered.contains("title = \"VinoCEO\""));

    fs::write(root.path().join("vinohero.toml"), &rendered).unwrap();
    let status = vinohero(root.path())
        .args(["config", "check"])
        .status()
        .expect("failed to run vinohero config check");
    assert!(status.success());
}

#[test]
fn config_check_rejects_invalid_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("broken.toml");
    fs::write(&path, "version = 1\n[gpu]\nframe_latency = 9\n").unwrap();

    let output = vinohero(root.path())
        .args(["config", "check"])
        .arg(&path)
        .output()
        .expect("failed to run vinohero config check");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("frame_latency"));
}

#[test]
fn config_check_without_file_uses_defaults() {
    let root = TempDir::new().unwrap();
    let output = vinohero(root.path())
        .args(["config", "check"])
        .output()
        .expect("failed to run vinohero config check");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("defaults apply"));
}

#[test]
fn still_rejects_zero_size() {
    let root = TempDir::new().unwrap();
    let status = vinohero(root.path())
        .args(["still", "--output"])
        .arg(root.path().join("hero.png"))
        .args(["--size", "0x600"])
        .status()
        .expect("failed to run vinohero still");
    assert!(!status.success());
    assert!(!root.path().join("hero.png").exists());
}
