//! hostprims-console: Console UTF-8 setup with guaranteed restore.
//!
//! This crate provides:
//! - [`setup`] - switch the console to UTF-8 and remember what it was
//! - [`teardown`] - put it back
//! - [`to_utf8`] - convert native wide text to UTF-8
//!
//! # State Ownership
//!
//! [`setup`] returns a [`ConsoleGuard`] that owns the saved state. The saved
//! code pages are captured once, when the guard is built, and restored at
//! most once: by [`teardown`] or, failing that, when the guard drops.
//!
//! | Platform | setup | teardown |
//! |----------|-------|----------|
//! | Windows | save input/output code pages, set both to UTF-8 | restore saved pages |
//! | Unix | adopt the first accepted UTF-8 locale, export `LC_ALL` | no-op |
//!
//! Call [`setup`] once near process start and [`teardown`] once near exit,
//! from one thread.
//!
//! # Example
//!
//! ```no_run
//! let console = hostprims_console::setup();
//! // ... program output ...
//! hostprims_console::teardown(console);
//! ```

use std::io::{self, BufWriter, Stdout};

mod convert;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform;
#[cfg(windows)]
use windows as platform;

pub use convert::{to_utf8, to_utf8_with, NativeConverter, WideConverter};

/// UTF-8 locales tried by [`setup`] on Unix, in priority order.
pub const UTF8_LOCALES: [&str; 3] = ["C.UTF-8", "POSIX.UTF-8", "en_US.UTF-8"];

/// Capacity of [`buffered_stdout`], large enough that multi-byte sequences
/// are not split across console writes.
pub const OUTPUT_BUFFER_BYTES: usize = 1000;

/// Windows code page identifier for UTF-8.
pub const CP_UTF8: u32 = 65001;

/// Console input and output code pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePages {
    pub input: u32,
    pub output: u32,
}

/// Console state captured by [`setup`].
#[derive(Debug)]
#[must_use = "dropping the guard restores the console immediately"]
pub struct ConsoleGuard {
    saved: Option<CodePages>,
    locale: Option<&'static str>,
}

impl ConsoleGuard {
    /// Whether setup captured code pages that teardown will restore.
    pub fn captured(&self) -> bool {
        self.saved.is_some()
    }

    /// Code pages in effect before [`setup`] (Windows only).
    pub fn saved_code_pages(&self) -> Option<CodePages> {
        self.saved
    }

    /// Locale adopted by [`setup`] (Unix only).
    pub fn locale(&self) -> Option<&'static str> {
        self.locale
    }

    fn restore(&mut self) {
        if let Some(pages) = self.saved.take() {
            platform::restore_impl(pages);
        }
    }
}

impl Drop for ConsoleGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Switch the console to UTF-8.
pub fn setup() -> ConsoleGuard {
    platform::setup_impl()
}

/// Restore the state saved by [`setup`].
pub fn teardown(mut guard: ConsoleGuard) {
    guard.restore();
}

/// Current console code pages, `None` where the concept does not exist.
pub fn current_code_pages() -> Option<CodePages> {
    platform::current_code_pages_impl()
}

/// Stdout wrapped in a [`BufWriter`] of [`OUTPUT_BUFFER_BYTES`].
pub fn buffered_stdout() -> BufWriter<Stdout> {
    BufWriter::with_capacity(OUTPUT_BUFFER_BYTES, io::stdout())
}
