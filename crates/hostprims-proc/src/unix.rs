//! Fallback for Unix platforms without a dedicated implementation
//! (FreeBSD, NetBSD, OpenBSD, Solaris, illumos, ...).
//!
//! Only the executable path and our own parent are resolved. Per-PID
//! lookups are not available here, so names degrade to `""` and parents
//! to `None` at the public API.

use std::fs;
use std::path::PathBuf;

use hostprims_core::{get_platform, HostprimsError, HostprimsResult};

#[cfg(any(target_os = "solaris", target_os = "illumos"))]
const SELF_EXE_LINK: &str = "/proc/self/path/a.out";
#[cfg(not(any(target_os = "solaris", target_os = "illumos")))]
const SELF_EXE_LINK: &str = "/proc/self/exe";

pub fn self_exe_path_impl() -> HostprimsResult<PathBuf> {
    fs::read_link(SELF_EXE_LINK).map_err(|e| {
        HostprimsError::executable_not_found(format!("cannot read {SELF_EXE_LINK}: {e}"))
    })
}

pub fn parent_pid_impl() -> u32 {
    // getppid cannot fail.
    unsafe { libc::getppid() as u32 }
}

pub fn process_name_impl(_pid: u32) -> HostprimsResult<String> {
    Err(HostprimsError::not_supported("process name lookup", get_platform()))
}

pub fn parent_of_impl(_pid: u32) -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_name_is_unsupported() {
        let err = process_name_impl(std::process::id()).unwrap_err();
        assert!(matches!(err, HostprimsError::NotSupported { .. }));
    }

    #[test]
    fn parent_pid_is_positive() {
        assert!(parent_pid_impl() > 0);
    }

    #[test]
    fn parent_of_is_unknown() {
        assert_eq!(parent_of_impl(std::process::id()), None);
    }
}
