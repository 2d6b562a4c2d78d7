//! macOS implementation using dyld and libproc
//!
//! Uses the following APIs:
//! - `_NSGetExecutablePath()` - path of the running executable
//! - `proc_name()` - process name
//! - `proc_pidinfo()` with `PROC_PIDTBSDINFO` - parent PID

use std::ffi::{CStr, OsStr};
use std::mem;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use hostprims_core::{HostprimsError, HostprimsResult};
use libc::{c_char, c_int, c_void, uid_t};

// ============================================================================
// FFI Bindings
// ============================================================================

const PROC_PIDTBSDINFO: c_int = 3;
const MAXCOMLEN: usize = 16;
const MAXPATHLEN: usize = 1024;

/// BSD info structure returned by proc_pidinfo with PROC_PIDTBSDINFO
#[repr(C)]
#[derive(Debug, Default)]
#[allow(dead_code)]
struct ProcBsdInfo {
    pbi_flags: u32,
    pbi_status: u32,
    pbi_xstatus: u32,
    pbi_pid: u32,
    pbi_ppid: u32,
    pbi_uid: uid_t,
    pbi_gid: u32,
    pbi_ruid: uid_t,
    pbi_rgid: u32,
    pbi_svuid: uid_t,
    pbi_svgid: u32,
    _rfu_1: u32,
    pbi_comm: [u8; MAXCOMLEN],
    pbi_name: [u8; 2 * MAXCOMLEN],
    pbi_nfiles: u32,
    pbi_pgid: u32,
    pbi_pjobc: u32,
    e_tdev: u32,
    e_tpgid: u32,
    pbi_nice: i32,
    pbi_start_tvsec: u64,
    pbi_start_tvusec: u64,
}

extern "C" {
    fn _NSGetExecutablePath(buf: *mut c_char, bufsize: *mut u32) -> c_int;

    fn proc_pidinfo(
        pid: c_int,
        flavor: c_int,
        arg: u64,
        buffer: *mut c_void,
        buffersize: c_int,
    ) -> c_int;

    fn proc_name(pid: c_int, buffer: *mut c_void, buffersize: u32) -> c_int;
}

// ============================================================================
// Implementation
// ============================================================================

/// Query dyld into a `PATH_MAX` buffer, retrying once with the size it asks for.
pub fn self_exe_path_impl() -> HostprimsResult<PathBuf> {
    let mut size = libc::PATH_MAX as u32;
    let mut buffer = vec![0u8; size as usize];

    let mut result = unsafe { _NSGetExecutablePath(buffer.as_mut_ptr() as *mut c_char, &mut size) };
    if result == -1 {
        // `size` now holds the required capacity.
        buffer.resize(size as usize, 0);
        result = unsafe { _NSGetExecutablePath(buffer.as_mut_ptr() as *mut c_char, &mut size) };
    }
    if result != 0 {
        return Err(HostprimsError::executable_not_found(format!(
            "_NSGetExecutablePath needs {size} bytes"
        )));
    }

    let path = CStr::from_bytes_until_nul(&buffer)
        .map_err(|_| HostprimsError::executable_not_found("unterminated executable path"))?;
    Ok(PathBuf::from(OsStr::from_bytes(path.to_bytes())))
}

pub fn parent_pid_impl() -> u32 {
    // getppid cannot fail.
    unsafe { libc::getppid() as u32 }
}

pub fn process_name_impl(pid: u32) -> HostprimsResult<String> {
    let mut buffer = [0u8; MAXPATHLEN];

    let result = unsafe {
        proc_name(
            pid as c_int,
            buffer.as_mut_ptr() as *mut c_void,
            MAXPATHLEN as u32,
        )
    };

    if result <= 0 {
        return Err(HostprimsError::last_os_error(format!(
            "proc_name({pid}) failed"
        )));
    }

    let name = CStr::from_bytes_until_nul(&buffer)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(HostprimsError::not_found(pid));
    }
    Ok(name)
}

pub fn parent_of_impl(pid: u32) -> Option<u32> {
    let mut info: ProcBsdInfo = unsafe { mem::zeroed() };
    let size = mem::size_of::<ProcBsdInfo>() as c_int;

    let result = unsafe {
        proc_pidinfo(
            pid as c_int,
            PROC_PIDTBSDINFO,
            0,
            &mut info as *mut _ as *mut c_void,
            size,
        )
    };

    if result < size {
        return None;
    }
    Some(info.pbi_ppid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_exe_path() {
        let path = self_exe_path_impl().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_self_parent_matches_getppid() {
        assert_eq!(parent_of_impl(std::process::id()), Some(parent_pid_impl()));
    }

    #[test]
    fn test_nonexistent_pid_name() {
        assert!(process_name_impl(99_999_999).is_err());
    }
}
