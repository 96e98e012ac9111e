//! Integration tests for `provlock hashes`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const H1_DARWIN_ARM64: &str = "h1:okB+CoNSmvUNJC55rmO5wYBu9CBS1Y1/to8Av2lRp68=";
const ZH_DARWIN_ARM64: &str = "5622a0fd03420ed1fa83a1a6e90b65fbe34bc74c251b3b47048f14217e93b086";
const ZH_LINUX_AMD64: &str = "c5f0a44e3a3795cb3ee0abb0076097c738294c241f74c145dfb50f2b9fd71fd2";

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "provlock-cli", "--bin", "provlock", "--"]);
    cmd.env_remove("PROVLOCK_MIRROR_DIR");
    cmd.env_remove("PROVLOCK_REGISTRY_HOST");
    cmd
}

/// Lay out a mirror with one provider version for darwin_arm64 and linux_amd64.
fn write_mirror(root: &Path) {
    let version_dir = root.join("registry.terraform.io/minamijoyo/dummy/3.2.1");
    for platform in ["darwin_arm64", "linux_amd64"] {
        let pkg = version_dir.join(platform);
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("terraform-provider-dummy_v3.2.1"),
            format!("binary-{platform}"),
        )
        .unwrap();
    }
    fs::write(
        version_dir.join("terraform-provider-dummy_3.2.1_SHA256SUMS"),
        format!(
            "{ZH_DARWIN_ARM64}  terraform-provider-dummy_3.2.1_darwin_arm64.zip\n\
             {ZH_LINUX_AMD64}  terraform-provider-dummy_3.2.1_linux_amd64.zip\n"
        ),
    )
    .unwrap();
}

fn run_hashes(dir: &TempDir, extra: &[&str]) -> Output {
    let mirror = dir.path().join("mirror");
    cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .arg("hashes")
        .arg("--mirror")
        .arg(&mirror)
        .args(extra)
        .output()
        .expect("Failed to run hashes command")
}

#[test]
fn test_hashes_json() {
    let dir = TempDir::new().unwrap();
    write_mirror(&dir.path().join("mirror"));

    let output = run_hashes(
        &dir,
        &["--json", "minamijoyo/dummy", "3.2.1", "-p", "darwin_arm64,linux_amd64"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "hashes failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["address"], "minamijoyo/dummy");
    assert_eq!(json["version"], "3.2.1");
    assert_eq!(
        json["platforms"],
        serde_json::json!(["darwin_arm64", "linux_amd64"])
    );
    assert_eq!(json["h1_hashes"]["darwin_arm64"], H1_DARWIN_ARM64);
    assert_eq!(
        json["zh_hashes"]["linux_amd64"],
        format!("zh:{ZH_LINUX_AMD64}")
    );
}

#[test]
fn test_hashes_text() {
    let dir = TempDir::new().unwrap();
    write_mirror(&dir.path().join("mirror"));

    let output = run_hashes(&dir, &["minamijoyo/dummy", "3.2.1", "--platform", "darwin_arm64"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.starts_with("minamijoyo/dummy 3.2.1\n"));
    assert!(stdout.contains(H1_DARWIN_ARM64));
    // The shared set is printed whole, not just the requested platform.
    assert!(stdout.contains(ZH_LINUX_AMD64));
}

#[test]
fn test_hashes_invalid_platform_fails() {
    let dir = TempDir::new().unwrap();
    write_mirror(&dir.path().join("mirror"));

    let output = run_hashes(&dir, &["minamijoyo/dummy", "3.2.1", "-p", "linux"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("LOCK_PLATFORM_INVALID"), "stderr: {stderr}");
}

#[test]
fn test_hashes_missing_package_fails() {
    let dir = TempDir::new().unwrap();
    write_mirror(&dir.path().join("mirror"));

    let output = run_hashes(&dir, &["minamijoyo/dummy", "3.2.1", "-p", "windows_amd64"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("LOCK_DOWNLOAD_FAILED"), "stderr: {stderr}");
}

#[test]
fn test_hashes_without_mirror_fails() {
    let dir = TempDir::new().unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["hashes", "minamijoyo/dummy", "3.2.1", "-p", "linux_amd64"])
        .output()
        .expect("Failed to run hashes command");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("PROVLOCK_MIRROR_DIR"), "stderr: {stderr}");
}

#[test]
fn test_hashes_mirror_from_config_file() {
    let dir = TempDir::new().unwrap();
    write_mirror(&dir.path().join("mirror"));
    fs::write(
        dir.path().join("provlock.json"),
        r#"{ "mirror_dir": "mirror" }"#,
    )
    .unwrap();

    let output = cargo_bin()
        .arg("--cwd")
        .arg(dir.path())
        .args(["hashes", "minamijoyo/dummy", "3.2.1", "-p", "darwin_arm64"])
        .output()
        .expect("Failed to run hashes command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains(H1_DARWIN_ARM64));
}
