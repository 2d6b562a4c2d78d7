//! hostprims-core: Core types, errors, and platform detection
//!
//! This crate provides the foundational types used across all hostprims modules:
//! - The canonical error type [`HostprimsError`]
//! - Schema ID constants for JSON output contracts
//! - Platform detection and the [`OsFamily`] enum shared by the probes
//!
//! ## Error Handling
//!
//! Only two failures are hard errors in hostprims: resolving the running
//! executable and converting native wide text. Everything else degrades to an
//! empty string, a sentinel, or `false`, plus a log line in the calling crate.
//! See the [`error`] module.

use std::env::consts::OS;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod schema;

// Re-export canonical error type at crate root
pub use error::{HostprimsError, HostprimsResult};

// ============================================================================
// Platform Detection
// ============================================================================

/// Get the current platform identifier.
///
/// Returns one of: "linux", "macos", "windows", "freebsd", etc.
///
/// This is a pure function with no side effects.
#[inline]
pub fn get_platform() -> &'static str {
    OS
}

/// Check if running on a Unix-like platform.
#[inline]
#[cfg(unix)]
pub const fn is_unix() -> bool {
    true
}

#[inline]
#[cfg(not(unix))]
pub const fn is_unix() -> bool {
    false
}

/// Check if running on Windows.
#[inline]
#[cfg(windows)]
pub const fn is_windows() -> bool {
    true
}

#[inline]
#[cfg(not(windows))]
pub const fn is_windows() -> bool {
    false
}

// ============================================================================
// OS Families
// ============================================================================

/// The three operating-system families hostprims knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    Windows,
    Macos,
    Linux,
}

impl OsFamily {
    /// All families, in probe order.
    pub const ALL: [OsFamily; 3] = [OsFamily::Windows, OsFamily::Macos, OsFamily::Linux];

    /// Family of the build target, or `None` for other platforms (e.g. FreeBSD).
    pub fn current() -> Option<OsFamily> {
        Self::from_platform(get_platform())
    }

    /// Map a `std::env::consts::OS` style identifier to a family.
    pub fn from_platform(platform: &str) -> Option<OsFamily> {
        match platform {
            "windows" => Some(OsFamily::Windows),
            "macos" => Some(OsFamily::Macos),
            "linux" => Some(OsFamily::Linux),
            _ => None,
        }
    }

    /// The platform identifier for this family.
    pub const fn as_str(self) -> &'static str {
        match self {
            OsFamily::Windows => "windows",
            OsFamily::Macos => "macos",
            OsFamily::Linux => "linux",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsFamily {
    type Err = HostprimsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(OsFamily::Windows),
            "macos" | "osx" | "darwin" => Ok(OsFamily::Macos),
            "linux" => Ok(OsFamily::Linux),
            other => Err(HostprimsError::invalid_argument(format!(
                "unknown OS family '{other}'"
            ))),
        }
    }
}
