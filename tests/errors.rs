use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env_remove("BF_CONFIG")
        .env_remove("BF_MAX_STEPS")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", "/nonexistent/bf-test-config");
    cmd
}

fn source_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_unmatched_close_reports_line_and_column() {
    let tf = source_file("+++\n++]");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path())
        .assert()
        .code(65)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("line 2, column 3").and(predicate::str::contains("++]")));
}

#[test]
fn test_unmatched_open_reports_count() {
    let tf = source_file("[[+]");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path())
        .assert()
        .code(65)
        .stderr(predicate::str::contains("found 1 opening bracket"));
}

#[test]
fn test_underflow_points_at_instruction() {
    let tf = source_file("+.\n<");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path())
        .assert()
        .code(1)
        .stdout("\u{1}")
        .stderr(predicate::str::contains("tape underflow at instruction 3").and(predicate::str::contains("   2 | <")));
}

#[test]
fn test_missing_source_is_io_error() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("/no/such/program.bf")
        .assert()
        .code(74)
        .stderr(predicate::str::contains("cannot read source"));
}

#[test]
fn test_zero_tape_size_is_usage_error() {
    let tf = source_file("+");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path()).arg("0")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("cannot allocate 0 bytes of tape"));
}

#[test]
fn test_non_numeric_tape_size_is_usage_error() {
    let tf = source_file("+");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path()).arg("huge")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("invalid tape size"));
}

#[test]
fn test_step_limit_aborts() {
    let tf = source_file("+[]");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg(tf.path()).arg("--max-steps").arg("1000")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Execution aborted: step limit exceeded (1000)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_step_limit_from_env() {
    let tf = source_file("+[]");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env("BF_MAX_STEPS", "50")
        .arg("run").arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_missing_path_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Usage:"));
}
