use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Output};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const HOUR: Duration = Duration::from_secs(3600);

fn run(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_audio-splitter"))
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .env_remove("AUDIO_SPLITTER_DATA_DIR")
        .env_remove("AUDIO_SPLITTER_MAX_UPLOAD_MB")
        .env_remove("AUDIO_SPLITTER_FFPROBE")
        .output()
        .unwrap()
}

fn project(data_dir: &Path, id: &str, age: Duration) {
    let path = data_dir.join("projects").join(id);
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("source.wav"), b"riff").unwrap();
    File::open(&path)
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

#[test]
fn delete_project_reports_missing_ids() {
    let dir = TempDir::new().unwrap();
    project(dir.path(), "keep", HOUR);

    let output = run(dir.path(), &["delete-project", "missing-id"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Project not found"));

    let output = run(dir.path(), &["delete-project", "keep"]);
    assert!(output.status.success());
    assert!(!dir.path().join("projects").join("keep").exists());
}

#[test]
fn cleanup_uses_one_week_by_default() {
    let dir = TempDir::new().unwrap();
    project(dir.path(), "fresh", 24 * HOUR);
    project(dir.path(), "stale", 200 * HOUR);

    let output = run(dir.path(), &["cleanup"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Deleted 1 projects older than 168h"));
    assert!(dir.path().join("projects").join("fresh").exists());
    assert!(!dir.path().join("projects").join("stale").exists());
}

#[test]
fn cleanup_rejects_zero_ttl() {
    let dir = TempDir::new().unwrap();
    project(dir.path(), "p", 24 * HOUR);

    let output = run(dir.path(), &["cleanup", "--older-than-hours", "0"]);
    assert!(!output.status.success());
    assert!(dir.path().join("projects").join("p").exists());
}

#[test]
fn delete_all_and_list() {
    let dir = TempDir::new().unwrap();
    project(dir.path(), "a", HOUR);
    project(dir.path(), "b", HOUR);

    let output = run(dir.path(), &["projects", "--json"]);
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
    assert_eq!(listed[0]["id"], "a");

    let output = run(dir.path(), &["delete-all"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 removed"));
}

#[test]
fn clear_temp_on_fresh_data_dir() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["clear-temp"]);
    assert!(output.status.success());
    assert!(dir.path().join("tmp").is_dir());
}
