//! Wide (UTF-16) to UTF-8 conversion.

use hostprims_core::{HostprimsError, HostprimsResult};
use tracing::error;

/// The two OS calls behind [`to_utf8`].
pub trait WideConverter {
    /// Bytes of UTF-8 needed for `wide`. `0` means the text cannot be converted.
    fn required_len(&self, wide: &[u16]) -> usize;

    /// Convert into `out`, returning the number of bytes written.
    fn convert(&self, wide: &[u16], out: &mut [u8]) -> usize;
}

impl<C: WideConverter + ?Sized> WideConverter for &C {
    fn required_len(&self, wide: &[u16]) -> usize {
        (**self).required_len(wide)
    }

    fn convert(&self, wide: &[u16], out: &mut [u8]) -> usize {
        (**self).convert(wide, out)
    }
}

/// The platform converter: `WideCharToMultiByte` on Windows, a UTF-16
/// decoder elsewhere. Unpaired surrogates become U+FFFD on both.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConverter;

#[cfg(not(windows))]
impl WideConverter for NativeConverter {
    fn required_len(&self, wide: &[u16]) -> usize {
        char::decode_utf16(wide.iter().copied())
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER).len_utf8())
            .sum()
    }

    fn convert(&self, wide: &[u16], out: &mut [u8]) -> usize {
        let mut written = 0;
        for c in char::decode_utf16(wide.iter().copied()) {
            let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
            let len = c.len_utf8();
            if written + len > out.len() {
                break;
            }
            c.encode_utf8(&mut out[written..]);
            written += len;
        }
        written
    }
}

/// Convert native wide text to UTF-8.
///
/// # Errors
///
/// [`HostprimsError::Conversion`] when the OS reports no output size for
/// non-empty input.
pub fn to_utf8(wide: &[u16]) -> HostprimsResult<String> {
    to_utf8_with(&NativeConverter, wide)
}

/// [`to_utf8`] with an explicit converter.
///
/// Empty input returns an empty string without calling the converter.
pub fn to_utf8_with<C: WideConverter + ?Sized>(
    converter: &C,
    wide: &[u16],
) -> HostprimsResult<String> {
    if wide.is_empty() {
        return Ok(String::new());
    }

    let size = converter.required_len(wide);
    if size == 0 {
        let os_error = std::io::Error::last_os_error();
        error!(error = %os_error, "Failed to convert string to UTF-8");
        return Err(HostprimsError::conversion(format!(
            "no output size for {} UTF-16 units",
            wide.len()
        )));
    }

    let mut output = vec![0u8; size];
    let written = converter.convert(wide, &mut output);
    if written != size {
        return Err(HostprimsError::internal(format!(
            "UTF-8 conversion wrote {written} bytes, expected {size}"
        )));
    }

    String::from_utf8(output).map_err(|e| HostprimsError::conversion(e.to_string()))
}
