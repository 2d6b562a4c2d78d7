//! hostprims-proc: Self-location and read-only process identity lookups
//!
//! ## Features
//!
//! - **Self-location**: absolute path of the running executable ([`self_exe_path`])
//! - **Ancestry**: parent of the current process ([`parent_pid`])
//! - **Names**: best-effort display name of any PID ([`process_name`])
//!
//! ## Platform Support
//!
//! | Feature | Linux | macOS | Windows | Other Unix |
//! |---------|-------|-------|---------|------------|
//! | Self path | `/proc/self/exe` | `_NSGetExecutablePath` | `GetModuleFileNameW` | `/proc/self/exe` (`/proc/self/path/a.out` on Solaris) |
//! | Parent PID | `getppid` | `getppid` | Toolhelp32 | `getppid` |
//! | Process name | `/proc/[pid]/status` | `proc_name` | `QueryFullProcessImageNameW` | unavailable |
//!
//! Only [`self_exe_path`] can fail. Lookups about other processes degrade to
//! `0`, `""` or `None`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostprims_proc::{parent_pid, process_name, self_exe_path};
//!
//! let exe = self_exe_path().unwrap();
//! println!("running from {}", exe.display());
//! println!("launched by {} ({})", parent_pid(), process_name(parent_pid()));
//! ```

use std::path::PathBuf;

use hostprims_core::{HostprimsError, HostprimsResult};
use serde::Serialize;
use tracing::debug;

// Platform-specific implementations
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
mod unix;
#[cfg(windows)]
mod windows;

// Re-export the platform implementation
#[cfg(target_os = "linux")]
use linux as platform;
#[cfg(target_os = "macos")]
use macos as platform;
#[cfg(all(unix, not(any(target_os = "linux", target_os = "macos"))))]
use unix as platform;
#[cfg(windows)]
use windows as platform;

/// PIDs above this value become negative `pid_t` on Unix.
pub const MAX_SAFE_PID: u32 = i32::MAX as u32;

// ============================================================================
// Core Types
// ============================================================================

/// What the OS will tell us about one process.
///
/// `parent_pid` and `name` are `None` when the OS cannot resolve them; that
/// is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessIdentity {
    /// Process ID.
    pub pid: u32,

    /// Parent process ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_pid: Option<u32>,

    /// Display name or image path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ============================================================================
// Public API
// ============================================================================

/// Absolute path of the running executable.
///
/// # Errors
///
/// Returns [`HostprimsError::ExecutableNotFound`] if the platform lookup
/// yields nothing usable. Callers generally cannot continue without it.
pub fn self_exe_path() -> HostprimsResult<PathBuf> {
    let raw = platform::self_exe_path_impl()?;
    if raw.as_os_str().is_empty() {
        return Err(HostprimsError::executable_not_found(
            "platform lookup returned an empty path",
        ));
    }

    let path = std::path::absolute(&raw).map_err(|e| {
        HostprimsError::executable_not_found(format!(
            "cannot make '{}' absolute: {e}",
            raw.display()
        ))
    })?;
    debug!(path = %path.display(), "Resolved executable path");
    Ok(path)
}

/// Parent PID of the current process, or `0` if it cannot be determined.
pub fn parent_pid() -> u32 {
    platform::parent_pid_impl()
}

/// Best-effort display name for `pid`.
///
/// Returns an empty string when the process does not exist, has exited, or
/// cannot be queried.
pub fn process_name(pid: u32) -> String {
    if pid > MAX_SAFE_PID {
        debug!(pid, "PID exceeds maximum safe value");
        return String::new();
    }

    match platform::process_name_impl(pid) {
        Ok(name) => name.trim().to_string(),
        Err(err) => {
            debug!(pid, error = %err, "Could not read process name");
            String::new()
        }
    }
}

/// Combined parent and name lookup for an arbitrary PID.
pub fn process_identity(pid: u32) -> ProcessIdentity {
    let parent_pid = if pid > MAX_SAFE_PID {
        None
    } else {
        platform::parent_of_impl(pid)
    };
    let name = Some(process_name(pid)).filter(|n| !n.is_empty());

    ProcessIdentity {
        pid,
        parent_pid,
        name,
    }
}
