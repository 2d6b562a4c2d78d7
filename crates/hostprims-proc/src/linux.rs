//! Linux implementation using the /proc filesystem
//!
//! Reads:
//! - `/proc/self/exe` - symlink to the running executable
//! - `/proc/[pid]/status` - first line carries the process name
//! - `/proc/[pid]/stat` - parent PID

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hostprims_core::{HostprimsError, HostprimsResult};

// ============================================================================
// Implementation
// ============================================================================

pub fn self_exe_path_impl() -> HostprimsResult<PathBuf> {
    fs::read_link("/proc/self/exe").map_err(|e| {
        HostprimsError::executable_not_found(format!("cannot read /proc/self/exe: {e}"))
    })
}

pub fn parent_pid_impl() -> u32 {
    // getppid cannot fail.
    unsafe { libc::getppid() as u32 }
}

pub fn process_name_impl(pid: u32) -> HostprimsResult<String> {
    let status = proc_path(pid, "status");
    let content = fs::read_to_string(&status).map_err(|e| map_io_error(e, pid))?;
    parse_status_name(&content).ok_or_else(|| HostprimsError::not_found(pid))
}

pub fn parent_of_impl(pid: u32) -> Option<u32> {
    let content = fs::read_to_string(proc_path(pid, "stat")).ok()?;
    parse_stat_ppid(&content)
}

fn proc_path(pid: u32, file: &str) -> PathBuf {
    Path::new("/proc").join(pid.to_string()).join(file)
}

/// Name from the first line of /proc/[pid]/status.
///
/// Format: `Name:\t<comm>`
fn parse_status_name(content: &str) -> Option<String> {
    let first = content.lines().next()?;
    let name = first.strip_prefix("Name:").unwrap_or(first).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Parent PID from /proc/[pid]/stat.
///
/// Format: pid (comm) state ppid ...
fn parse_stat_ppid(content: &str) -> Option<u32> {
    // comm can contain spaces and parens
    let end_paren = content.rfind(')')?;
    let mut fields = content.get(end_paren + 1..)?.split_whitespace();
    let _state = fields.next()?;
    fields.next()?.parse().ok()
}

fn map_io_error(e: io::Error, pid: u32) -> HostprimsError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => HostprimsError::permission_denied(format!(
            "read /proc/{pid}/status"
        )),
        _ => HostprimsError::not_found(pid),
    }
}
