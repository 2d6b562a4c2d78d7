//! Windows implementation using Toolhelp32 and Win32 APIs
//!
//! Uses the following APIs:
//! - `GetModuleFileNameW` - path of the running executable
//! - `CreateToolhelp32Snapshot` / `Process32FirstW/NextW` - parent PID lookup
//! - `OpenProcess` / `QueryFullProcessImageNameW` - process image path

use std::ffi::OsString;
use std::mem;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;

use hostprims_core::{HostprimsError, HostprimsResult};
use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, INVALID_HANDLE_VALUE, MAX_PATH};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleFileNameW;
use windows_sys::Win32::System::Threading::{
    GetCurrentProcessId, OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};

/// Capacity for `QueryFullProcessImageNameW`, in UTF-16 units.
const IMAGE_NAME_CAPACITY: usize = 1024;

// ============================================================================
// Implementation
// ============================================================================

/// Double the buffer until the returned length stops filling it.
pub fn self_exe_path_impl() -> HostprimsResult<PathBuf> {
    let mut buffer: Vec<u16> = vec![0; MAX_PATH as usize];

    loop {
        let len = unsafe { GetModuleFileNameW(0, buffer.as_mut_ptr(), buffer.len() as u32) };
        if len == 0 {
            return Err(HostprimsError::executable_not_found(format!(
                "GetModuleFileNameW failed: {}",
                unsafe { GetLastError() }
            )));
        }
        if (len as usize) < buffer.len() {
            buffer.truncate(len as usize);
            return Ok(PathBuf::from(OsString::from_wide(&buffer)));
        }
        // Truncated: the returned size equals the capacity.
        let grown = buffer.len() * 2;
        buffer.resize(grown, 0);
    }
}

pub fn parent_pid_impl() -> u32 {
    let pid = unsafe { GetCurrentProcessId() };
    parent_of_impl(pid).unwrap_or(0)
}

pub fn process_name_impl(pid: u32) -> HostprimsResult<String> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle == 0 {
            return Err(HostprimsError::system(
                format!("OpenProcess({pid}) failed"),
                GetLastError() as i32,
            ));
        }

        let mut buffer = [0u16; IMAGE_NAME_CAPACITY];
        let mut size = IMAGE_NAME_CAPACITY as u32;
        let ok = QueryFullProcessImageNameW(handle, PROCESS_NAME_WIN32, buffer.as_mut_ptr(), &mut size);
        let error = GetLastError();
        CloseHandle(handle);

        if ok == 0 {
            return Err(HostprimsError::system(
                format!("QueryFullProcessImageNameW({pid}) failed"),
                error as i32,
            ));
        }

        Ok(String::from_utf16_lossy(&buffer[..size as usize]))
    }
}

/// Walk a process snapshot for the entry whose PID is `pid`.
pub fn parent_of_impl(pid: u32) -> Option<u32> {
    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return None;
        }

        let mut entry: PROCESSENTRY32W = mem::zeroed();
        entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

        let mut parent = None;
        if Process32FirstW(snapshot, &mut entry) != 0 {
            loop {
                if entry.th32ProcessID == pid {
                    parent = Some(entry.th32ParentProcessID);
                    break;
                }
                if Process32NextW(snapshot, &mut entry) == 0 {
                    break;
                }
            }
        }

        CloseHandle(snapshot);
        parent
    }
}
