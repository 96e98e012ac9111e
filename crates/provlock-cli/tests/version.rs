//! Integration tests for `provlock version`.

use std::process::Command;

#[test]
fn test_version_output() {
    let output = Command::new(env!("CARGO"))
        .args(["run", "-p", "provlock-cli", "--bin", "provlock", "--", "version"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("provlock "), "stdout: {stdout}");
}
