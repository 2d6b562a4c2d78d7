//! Windows implementation: shell elevation and the registry flag.
//!
//! Uses the following APIs:
//! - `IsUserAnAdmin` - elevated-token check
//! - `ShellExecuteExW` with the `runas` verb - interactive elevation
//! - `RegOpenKeyExW` / `RegQueryValueExW` / `RegSetValueExW` - `LongPathsEnabled`

use std::ffi::OsStr;
use std::iter;
use std::mem;
use std::os::windows::ffi::OsStrExt;
use std::ptr;

use hostprims_core::{HostprimsError, HostprimsResult};
use tracing::warn;
use windows_sys::Win32::Foundation::{CloseHandle, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY, HKEY_LOCAL_MACHINE,
    KEY_QUERY_VALUE, KEY_SET_VALUE, REG_DWORD, REG_SAM_FLAGS,
};
use windows_sys::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject, INFINITE};
use windows_sys::Win32::UI::Shell::{
    IsUserAnAdmin, ShellExecuteExW, SEE_MASK_NOASYNC, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW,
};
use windows_sys::Win32::UI::WindowsAndMessaging::SW_HIDE;

use crate::CapabilityFlag;

const FILESYSTEM_KEY: &str = r"SYSTEM\CurrentControlSet\Control\FileSystem";
const LONG_PATHS_VALUE: &str = "LongPathsEnabled";

/// NUL-terminated UTF-16 for Win32 string parameters.
fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(iter::once(0)).collect()
}

// ============================================================================
// Elevation
// ============================================================================

pub fn is_elevated_impl() -> bool {
    unsafe { IsUserAnAdmin() != 0 }
}

pub fn request_elevation_impl(executable: &str, arguments: &str) -> bool {
    let verb = wide("runas");
    let file = wide(executable);
    let parameters = wide(arguments);

    unsafe {
        let mut info: SHELLEXECUTEINFOW = mem::zeroed();
        info.cbSize = mem::size_of::<SHELLEXECUTEINFOW>() as u32;
        info.fMask = SEE_MASK_NOCLOSEPROCESS | SEE_MASK_NOASYNC;
        info.lpVerb = verb.as_ptr();
        info.lpFile = file.as_ptr();
        info.lpParameters = parameters.as_ptr();
        info.lpDirectory = ptr::null();
        info.nShow = SW_HIDE as i32;

        if ShellExecuteExW(&mut info) == 0 || info.hProcess == 0 {
            warn!(executable, "Could not start process as admin.");
            return false;
        }

        WaitForSingleObject(info.hProcess, INFINITE);
        let mut exit_code: u32 = 0;
        let got_code = GetExitCodeProcess(info.hProcess, &mut exit_code) != 0;
        CloseHandle(info.hProcess);

        if !got_code || exit_code != 0 {
            warn!(executable, exit_code, "Process exited with code != 0.");
            return false;
        }
    }
    true
}

// ============================================================================
// Registry Flag
// ============================================================================

/// Open registry key, closed on drop.
struct RegKey(HKEY);

impl RegKey {
    fn open_local_machine(path: &str, access: REG_SAM_FLAGS) -> HostprimsResult<RegKey> {
        let path_w = wide(path);
        let mut hkey: HKEY = 0;
        let status = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, path_w.as_ptr(), 0, access, &mut hkey) };
        if status != ERROR_SUCCESS {
            return Err(HostprimsError::system(
                format!("RegOpenKeyExW(HKLM\\{path}) failed"),
                status as i32,
            ));
        }
        Ok(RegKey(hkey))
    }

    fn get_dword(&self, name: &str) -> HostprimsResult<u32> {
        let name_w = wide(name);
        let mut kind = 0;
        let mut value: u32 = 0;
        let mut size = mem::size_of::<u32>() as u32;

        let status = unsafe {
            RegQueryValueExW(
                self.0,
                name_w.as_ptr(),
                ptr::null(),
                &mut kind,
                &mut value as *mut u32 as *mut u8,
                &mut size,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(HostprimsError::system(
                format!("RegQueryValueExW({name}) failed"),
                status as i32,
            ));
        }
        if kind != REG_DWORD {
            return Err(HostprimsError::internal(format!(
                "{name} is not a REG_DWORD (type {kind})"
            )));
        }
        Ok(value)
    }

    fn set_dword(&self, name: &str, value: u32) -> HostprimsResult<()> {
        let name_w = wide(name);
        let status = unsafe {
            RegSetValueExW(
                self.0,
                name_w.as_ptr(),
                0,
                REG_DWORD,
                &value as *const u32 as *const u8,
                mem::size_of::<u32>() as u32,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(HostprimsError::system(
                format!("RegSetValueExW({name}) failed"),
                status as i32,
            ));
        }
        Ok(())
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

/// `HKLM\SYSTEM\CurrentControlSet\Control\FileSystem\LongPathsEnabled`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongPathsRegistryFlag;

impl CapabilityFlag for LongPathsRegistryFlag {
    fn read(&self) -> HostprimsResult<u32> {
        RegKey::open_local_machine(FILESYSTEM_KEY, KEY_QUERY_VALUE)?.get_dword(LONG_PATHS_VALUE)
    }

    fn write(&self, value: u32) -> HostprimsResult<()> {
        RegKey::open_local_machine(FILESYSTEM_KEY, KEY_SET_VALUE)?.set_dword(LONG_PATHS_VALUE, value)
    }

    fn elevated_write_command(&self, value: u32) -> (String, String) {
        (
            "reg.exe".to_string(),
            format!(
                "ADD HKEY_LOCAL_MACHINE\\{FILESYSTEM_KEY} /v {LONG_PATHS_VALUE} /d {value} /t REG_DWORD /f"
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_is_nul_terminated() {
        assert_eq!(wide("ab"), vec![b'a' as u16, b'b' as u16, 0]);
    }

    #[test]
    fn elevated_command_targets_long_paths_value() {
        let (exe, args) = LongPathsRegistryFlag.elevated_write_command(1);
        assert_eq!(exe, "reg.exe");
        assert_eq!(
            args,
            "ADD HKEY_LOCAL_MACHINE\\SYSTEM\\CurrentControlSet\\Control\\FileSystem \
             /v LongPathsEnabled /d 1 /t REG_DWORD /f"
        );
    }

    #[test]
    fn flag_is_readable_on_supported_hosts() {
        // Present on every Windows 10+ install; absent keys are a valid outcome elsewhere.
        if let Ok(value) = LongPathsRegistryFlag.read() {
            assert!(value <= 1);
        }
    }
}
