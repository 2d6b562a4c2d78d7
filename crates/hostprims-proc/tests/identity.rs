use hostprims_proc::{parent_pid, process_identity, process_name, self_exe_path};
use serde_json::Value;
use std::process::Command;

#[test]
fn exited_child_has_empty_name() {
    // Spawn and reap a child so its PID is known to be gone.
    let mut child = Command::new(self_exe_path().unwrap())
        .arg("--list")
        .spawn()
        .expect("spawn self");
    let pid = child.id();
    child.wait().expect("wait child");

    // PID reuse within this window is possible but vanishingly rare.
    assert_eq!(process_name(pid), "");
}

#[test]
fn parent_has_a_name() {
    let ppid = parent_pid();
    assert_ne!(ppid, 0);
    // The test harness parent may belong to another user on locked-down
    // hosts; only require that the lookup does not panic.
    let _ = process_name(ppid);
}

#[test]
fn identity_serializes_without_absent_fields() {
    let identity = process_identity(1_000_000_000);
    let json: Value = serde_json::to_value(&identity).unwrap();

    assert_eq!(json["pid"].as_u64(), Some(1_000_000_000));
    assert!(json.get("parent_pid").is_none());
    assert!(json.get("name").is_none());
}

#[test]
#[cfg(any(target_os = "linux", target_os = "macos", windows))]
fn identity_of_self_serializes_name() {
    let identity = process_identity(std::process::id());
    let json: Value = serde_json::to_value(&identity).unwrap();

    assert!(json["name"].as_str().is_some_and(|n| !n.is_empty()));
    assert_eq!(json["parent_pid"].as_u64(), Some(parent_pid() as u64));
}

#[test]
fn self_exe_path_is_stable() {
    assert_eq!(self_exe_path().unwrap(), self_exe_path().unwrap());
}
