#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::Command;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/legmux-inspect-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect()
}

#[test]
fn inspect_records_as_json() {
    let dir = unique_temp_dir("records");
    let path = dir.join("leg.bin");
    std::fs::write(&path, [1u8, 2, 3, 4, 5, 6, 3, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0]).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .arg("--format")
        .arg("json")
        .arg("inspect")
        .arg("records")
        .arg(&path)
        .output()
        .expect("inspect should run");

    assert!(output.status.success());
    let rows = json_lines(&output.stdout);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["payload"], "010203040506");
    assert_eq!(rows[0]["repeat"], 3);
    assert_eq!(rows[1]["payload"], "aaaaaaaaaaaa");
    assert_eq!(rows[1]["repeat"], 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_records_respects_limit() {
    let dir = unique_temp_dir("limit");
    let path = dir.join("leg.bin");
    std::fs::write(&path, [7u8; 7 * 5]).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .args(["--format", "json", "inspect", "records"])
        .arg(&path)
        .args(["--limit", "2"])
        .output()
        .expect("inspect should run");

    assert!(output.status.success());
    assert_eq!(json_lines(&output.stdout).len(), 2);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_frames_splits_sections() {
    let dir = unique_temp_dir("frames");
    let path = dir.join("out.bin");
    let mut stream = Vec::new();
    stream.extend_from_slice(&[0x11; 6]);
    stream.extend_from_slice(&[0x22; 6]);
    stream.push(5);
    std::fs::write(&path, &stream).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .args(["--format", "json", "inspect", "frames"])
        .arg(&path)
        .args(["--channels", "2"])
        .output()
        .expect("inspect should run");

    assert!(output.status.success());
    let rows = json_lines(&output.stdout);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["sections"][0], "111111111111");
    assert_eq!(rows[0]["sections"][1], "222222222222");
    assert_eq!(rows[0]["delay"], 5);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_truncated_file_reports_rows_then_fails() {
    let dir = unique_temp_dir("truncated");
    let path = dir.join("leg.bin");
    std::fs::write(&path, [9u8, 9, 9, 9, 9, 9, 1, 4, 4]).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .args(["--format", "json", "inspect", "records"])
        .arg(&path)
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(60));
    assert_eq!(json_lines(&output.stdout).len(), 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_frames_rejects_zero_channels() {
    let dir = unique_temp_dir("zero");
    let path = dir.join("out.bin");
    std::fs::write(&path, b"").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .args(["inspect", "frames"])
        .arg(&path)
        .args(["--channels", "0"])
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(64));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_frames_rejects_oversized_channel_count() {
    let dir = unique_temp_dir("oversized");
    let path = dir.join("out.bin");
    std::fs::write(&path, [0u8; 19]).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .args(["inspect", "frames"])
        .arg(&path)
        .args(["--channels", &usize::MAX.to_string()])
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("maximum composite frame size"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_reports_crate_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_legmux"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("legmux {}", env!("CARGO_PKG_VERSION")));
}
