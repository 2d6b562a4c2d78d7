use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn self_exe_prints_absolute_path() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level").arg("error").arg("self-exe");

    let output = cmd.output().expect("self-exe should run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    let path = std::path::Path::new(stdout.trim());
    assert!(path.is_absolute(), "not absolute: {}", path.display());
    assert!(path
        .file_stem()
        .is_some_and(|stem| stem.to_string_lossy().starts_with("hostprims")));
}

#[test]
fn ppid_is_the_test_process() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level").arg("error").arg("ppid");

    cmd.assert()
        .success()
        .stdout(format!("{}\n", std::process::id()));
}

#[test]
#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn pinfo_json_describes_the_test_process() {
    let pid = std::process::id();

    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level")
        .arg("error")
        .arg("pinfo")
        .arg(pid.to_string())
        .arg("--json");

    let output = cmd.output().expect("pinfo should run");
    assert!(
        output.status.success(),
        "expected success, stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be json");
    let schema_id = parsed["schema_id"].as_str().expect("schema_id should be present");
    assert!(
        schema_id.contains("process-identity.schema.json"),
        "unexpected schema_id: {schema_id}"
    );
    assert_eq!(parsed["pid"].as_u64(), Some(u64::from(pid)));
    assert!(parsed["name"].as_str().is_some_and(|n| !n.is_empty()));
}

#[test]
fn pinfo_missing_pid_is_not_an_error() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level")
        .arg("error")
        .arg("pinfo")
        .arg("1000000000");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("NAME:   -"));
}

#[test]
fn is_admin_prints_a_bool() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level").arg("error").arg("is-admin");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match("^(true|false)\n$").unwrap());
}

#[test]
#[cfg(not(windows))]
fn enable_long_paths_is_unsupported_here() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level")
        .arg("error")
        .arg("enable-long-paths")
        .arg("--force");

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn info_json_is_a_host_snapshot() {
    let mut cmd = cargo_bin_cmd!("hostprims");
    cmd.arg("--log-level").arg("error").arg("info").arg("--json");

    let output = cmd.output().expect("info should run");
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert!(parsed["schema_id"]
        .as_str()
        .unwrap()
        .contains("host-info.schema.json"));
    assert_eq!(parsed["parent_pid"].as_u64(), Some(u64::from(std::process::id())));
    assert!(parsed["elevated"].is_boolean());
    assert!(parsed["versions"].is_object());
    assert!(parsed["timestamp"].is_string());
}
