//! Windows console setup: code pages and wide conversion.

use std::ptr;

use tracing::{debug, warn};
use windows_sys::Win32::Globalization::WideCharToMultiByte;
use windows_sys::Win32::System::Console::{
    GetConsoleCP, GetConsoleOutputCP, SetConsoleCP, SetConsoleOutputCP,
};

use crate::convert::{NativeConverter, WideConverter};
use crate::{CodePages, ConsoleGuard, CP_UTF8};

pub fn setup_impl() -> ConsoleGuard {
    let saved = current_code_pages_impl();
    match saved {
        Some(pages) => {
            debug!(input = pages.input, output = pages.output, "Saved console code pages");
            set_code_pages(CodePages {
                input: CP_UTF8,
                output: CP_UTF8,
            });
        }
        None => debug!("No console attached; code pages left alone"),
    }
    ConsoleGuard {
        saved,
        locale: None,
    }
}

pub fn restore_impl(pages: CodePages) {
    set_code_pages(pages);
    debug!(input = pages.input, output = pages.output, "Restored console code pages");
}

pub fn current_code_pages_impl() -> Option<CodePages> {
    // SAFETY: both calls take no arguments and return 0 when no console exists.
    let (input, output) = unsafe { (GetConsoleCP(), GetConsoleOutputCP()) };
    if input == 0 && output == 0 {
        return None;
    }
    Some(CodePages { input, output })
}

fn set_code_pages(pages: CodePages) {
    // SAFETY: plain value arguments.
    let ok = unsafe { SetConsoleCP(pages.input) != 0 && SetConsoleOutputCP(pages.output) != 0 };
    if !ok {
        warn!(
            input = pages.input,
            output = pages.output,
            error = %std::io::Error::last_os_error(),
            "Failed to set console code pages"
        );
    }
}

impl WideConverter for NativeConverter {
    fn required_len(&self, wide: &[u16]) -> usize {
        let Ok(len) = i32::try_from(wide.len()) else {
            return 0;
        };
        // SAFETY: wide is valid for len units; a null output buffer asks for the size.
        let size = unsafe {
            WideCharToMultiByte(
                CP_UTF8,
                0,
                wide.as_ptr(),
                len,
                ptr::null_mut(),
                0,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        usize::try_from(size).unwrap_or(0)
    }

    fn convert(&self, wide: &[u16], out: &mut [u8]) -> usize {
        let (Ok(len), Ok(cap)) = (i32::try_from(wide.len()), i32::try_from(out.len())) else {
            return 0;
        };
        // SAFETY: both buffers are valid for the lengths passed.
        let written = unsafe {
            WideCharToMultiByte(
                CP_UTF8,
                0,
                wide.as_ptr(),
                len,
                out.as_mut_ptr(),
                cap,
                ptr::null(),
                ptr::null_mut(),
            )
        };
        usize::try_from(written).unwrap_or(0)
    }
}
