//! hostprims-privilege: Elevation checks and the long-path capability.
//!
//! This crate provides:
//! - Elevated-identity detection ([`is_elevated`])
//! - Interactive elevation through the shell (`request_elevation`, Windows only)
//! - Enabling the system-wide long-path flag (`enable_long_path_support`,
//!   Windows only)
//!
//! None of these return errors. Refusals, declined prompts and failed writes
//! are logged and reported as `false`.
//!
//! # Long-path flow
//!
//! [`LongPathToggle`] holds the whole decision sequence and talks to the OS
//! only through three seams: [`CapabilityFlag`], [`Elevator`] and
//! [`ConsentPrompt`]. The Windows entry point wires in the registry, the
//! shell and a terminal prompt.

use hostprims_core::HostprimsResult;
use tracing::{debug, info, warn};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
use unix as platform;
#[cfg(windows)]
use windows as platform;

/// Oldest Windows major version with the long-path flag.
pub const LONG_PATHS_MIN_MAJOR: u64 = 10;

/// Oldest Windows build with the long-path flag (the 2016 Anniversary Update).
pub const LONG_PATHS_MIN_BUILD: u64 = 14352;

/// Value of the capability flag when enabled.
pub const FLAG_ENABLED: u32 = 1;

// ============================================================================
// Seams
// ============================================================================

/// A persistent system-wide boolean setting.
pub trait CapabilityFlag {
    /// Current value. `Err` when the entry is absent or unreadable.
    fn read(&self) -> HostprimsResult<u32>;

    /// Write the value with the caller's own privileges.
    fn write(&self, value: u32) -> HostprimsResult<()>;

    /// Executable and arguments that write `value` when run elevated.
    fn elevated_write_command(&self, value: u32) -> (String, String);
}

/// Privilege checks and elevation.
pub trait Elevator {
    fn is_elevated(&self) -> bool;

    /// Run `executable arguments` elevated and wait; `true` only on exit code 0.
    fn request_elevation(&self, executable: &str, arguments: &str) -> bool;
}

/// Asks the operator a yes/no question.
pub trait ConsentPrompt {
    fn confirm(&self, question: &str) -> bool;
}

impl<F: CapabilityFlag + ?Sized> CapabilityFlag for &F {
    fn read(&self) -> HostprimsResult<u32> {
        (**self).read()
    }

    fn write(&self, value: u32) -> HostprimsResult<()> {
        (**self).write(value)
    }

    fn elevated_write_command(&self, value: u32) -> (String, String) {
        (**self).elevated_write_command(value)
    }
}

impl<E: Elevator + ?Sized> Elevator for &E {
    fn is_elevated(&self) -> bool {
        (**self).is_elevated()
    }

    fn request_elevation(&self, executable: &str, arguments: &str) -> bool {
        (**self).request_elevation(executable, arguments)
    }
}

impl<C: ConsentPrompt + ?Sized> ConsentPrompt for &C {
    fn confirm(&self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

/// [`Elevator`] for the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemElevator;

impl Elevator for SystemElevator {
    fn is_elevated(&self) -> bool {
        is_elevated()
    }

    #[cfg(windows)]
    fn request_elevation(&self, executable: &str, arguments: &str) -> bool {
        request_elevation(executable, arguments)
    }

    #[cfg(not(windows))]
    fn request_elevation(&self, executable: &str, _arguments: &str) -> bool {
        warn!(
            executable,
            platform = hostprims_core::get_platform(),
            "Interactive elevation is not supported on this platform"
        );
        false
    }
}

/// [`ConsentPrompt`] on the controlling terminal, defaulting to "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConsent;

impl ConsentPrompt for TerminalConsent {
    fn confirm(&self, question: &str) -> bool {
        match dialoguer::Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                debug!(error = %err, "Consent prompt unavailable, treating as declined");
                false
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Whether the current process runs with elevated privileges.
///
/// Unix: effective uid or gid is 0. Windows: `IsUserAnAdmin`.
pub fn is_elevated() -> bool {
    platform::is_elevated_impl()
}

/// Launch `executable arguments` through the shell with the `runas` verb.
///
/// Blocks until the elevated process exits. Returns `true` only when it
/// exits with code 0.
#[cfg(windows)]
pub fn request_elevation(executable: &str, arguments: &str) -> bool {
    platform::request_elevation_impl(executable, arguments)
}

/// Enable `LongPathsEnabled` under `HKLM\SYSTEM\CurrentControlSet\Control\FileSystem`.
///
/// With `force` (or when already elevated) the value is written directly.
/// Otherwise the operator is asked before `reg.exe` runs elevated.
#[cfg(windows)]
pub fn enable_long_path_support(force: bool) -> bool {
    let toggle = LongPathToggle::new(
        windows::LongPathsRegistryFlag,
        SystemElevator,
        TerminalConsent,
    );
    toggle.enable(&hostprims_version::windows_version(), force)
}

/// Whether a Windows `major.minor.build` version can carry the long-path flag.
///
/// Requires major ≥ 10 and build ≥ 14352. Unparseable versions are not
/// eligible.
pub fn long_paths_eligible(windows_version: &str) -> bool {
    let parts: Vec<&str> = windows_version.split('.').collect();
    if parts.len() < 3 {
        return false;
    }
    match (parts[0].parse::<u64>(), parts[2].parse::<u64>()) {
        (Ok(major), Ok(build)) => major >= LONG_PATHS_MIN_MAJOR && build >= LONG_PATHS_MIN_BUILD,
        _ => false,
    }
}

// ============================================================================
// Long-path Toggle
// ============================================================================

/// The long-path enable sequence over injectable seams.
#[derive(Debug, Clone)]
pub struct LongPathToggle<F, E, C> {
    flag: F,
    elevator: E,
    consent: C,
}

impl<F: CapabilityFlag, E: Elevator, C: ConsentPrompt> LongPathToggle<F, E, C> {
    pub fn new(flag: F, elevator: E, consent: C) -> Self {
        Self {
            flag,
            elevator,
            consent,
        }
    }

    /// Enable the flag on a host reporting `windows_version`.
    ///
    /// Returns `true` when the flag reads back as enabled.
    pub fn enable(&self, windows_version: &str, force: bool) -> bool {
        if !long_paths_eligible(windows_version) {
            warn!(
                version = windows_version,
                "Not setting long path registry key; Windows version must be at least 10 \
                 with the fall 2016 \"Anniversary update\" or newer."
            );
            return false;
        }

        match self.flag.read() {
            Ok(FLAG_ENABLED) => {
                info!("Windows long-path support already enabled.");
                return true;
            }
            Ok(current) => debug!(current, "Long-path flag currently disabled"),
            Err(err) => {
                info!(error = %err, "No LongPathsEnabled key detected.");
                return false;
            }
        }

        if force || self.elevator.is_elevated() {
            if let Err(err) = self.flag.write(FLAG_ENABLED) {
                warn!(error = %err, "Could not write LongPathsEnabled.");
                return false;
            }
        } else {
            if !self
                .consent
                .confirm("Enter admin mode to enable long paths support?")
            {
                warn!("Did not enable long paths support.");
                return false;
            }
            let (executable, arguments) = self.flag.elevated_write_command(FLAG_ENABLED);
            if !self.elevator.request_elevation(&executable, &arguments) {
                return false;
            }
        }

        match self.flag.read() {
            Ok(FLAG_ENABLED) => {
                info!("Windows long-path support enabled.");
                true
            }
            _ => {
                warn!("Changing registry value did not succeed.");
                false
            }
        }
    }
}
