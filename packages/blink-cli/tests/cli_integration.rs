use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn blinklab() -> Command {
    Command::cargo_bin("blinklab").unwrap()
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_help() {
    blinklab()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_flag() {
    blinklab()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("blinklab"));
}

#[test]
fn test_help_flag() {
    blinklab()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("blink detection"));
}

// =============================================================================
// TEMPLATE SUBCOMMAND
// =============================================================================

#[test]
fn test_template_subcommand() {
    blinklab()
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains("201"))
        .stdout(predicate::str::contains("peak index"));
}

#[test]
fn test_template_json() {
    blinklab()
        .args(["template", "--json", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"length\":201"))
        .stdout(predicate::str::contains("\"peak_index\":100"));
}

// =============================================================================
// RUN SUBCOMMAND
// =============================================================================

#[test]
fn test_run_missing_file() {
    blinklab()
        .args(["run", "--file", "/nonexistent/recording.txt"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_run_quiet_recording() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# flat baseline recording").unwrap();
    for _ in 0..1500 {
        writeln!(file, "100").unwrap();
    }

    blinklab()
        .args([
            "run",
            "--file",
            file.path().to_str().unwrap(),
            "--quiet",
            "--compact",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_blinks\":0"))
        .stdout(predicate::str::contains("\"samples_processed\":1500"));
}

#[test]
fn test_run_rejects_invalid_tuning() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "100").unwrap();

    blinklab()
        .args([
            "run",
            "--file",
            file.path().to_str().unwrap(),
            "--cutoff",
            "0",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cutoff"));
}

#[test]
fn test_run_corrupt_recording() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "100 banana 102").unwrap();

    blinklab()
        .args(["run", "--file", file.path().to_str().unwrap(), "--quiet"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("parse"));
}

#[test]
fn test_run_writes_output_file() {
    let mut recording = tempfile::NamedTempFile::new().unwrap();
    for _ in 0..1200 {
        writeln!(recording, "250").unwrap();
    }
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("summary.json");

    blinklab()
        .args([
            "run",
            "--file",
            recording.path().to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
            "--quiet",
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("\"samples_processed\": 1200"));
}

// =============================================================================
// SIMULATE SUBCOMMAND
// =============================================================================

#[test]
fn test_simulate_detects_injected_blinks() {
    blinklab()
        .args(["simulate", "--blinks", "2", "--quiet", "--compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blinks_injected\":2"))
        .stdout(predicate::str::contains("\"blinks_detected\":2"));
}

#[test]
fn test_simulate_with_noise_still_detects() {
    blinklab()
        .args([
            "simulate",
            "--blinks",
            "1",
            "--noise",
            "6",
            "--seed",
            "11",
            "--quiet",
            "--compact",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blinks_detected\":1"));
}

#[test]
fn test_simulate_reports_progress_on_stderr() {
    blinklab()
        .args(["simulate", "--blinks", "1", "--compact"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Detected 1/1"));
}
