//! hostprims-version: Host OS version probes.
//!
//! One probe per OS family, each with the same shape:
//!
//! 1. A non-empty override variable wins, verbatim, with no command run.
//! 2. On a host of a different family the probe returns `""`.
//! 3. Otherwise a fixed diagnostic command runs (blocking, no timeout) and its
//!    output is parsed by the family grammar in [`grammar`].
//!
//! | Family | Override | Command | Parse failure |
//! |--------|----------|---------|---------------|
//! | windows | `CONDA_OVERRIDE_WIN` | `%COMSPEC% /c ver` | `"0.0.0"` |
//! | macos | `CONDA_OVERRIDE_OSX` | `sw_vers -productVersion` | n/a (trim only) |
//! | linux | `CONDA_OVERRIDE_LINUX` | `uname -r` | `""` |
//!
//! The `"0.0.0"` sentinel and the empty string are different signals and are
//! kept apart: empty means "unknown or not this family", the sentinel means
//! "windows, but `ver` printed something unrecognizable".
//!
//! ## Example
//!
//! ```rust,no_run
//! use hostprims_version::{linux_version, VersionProbe};
//!
//! // Process environment and real subprocesses
//! println!("kernel: {}", linux_version());
//!
//! // Or build a probe once and ask it for everything
//! let versions = VersionProbe::new().host_versions();
//! println!("{versions:?}");
//! ```

use std::collections::HashMap;

use hostprims_core::OsFamily;
use serde::Serialize;
use tracing::{debug, warn};

pub mod command;
pub mod grammar;

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};

/// Override variable for the windows probe.
pub const OVERRIDE_WINDOWS: &str = "CONDA_OVERRIDE_WIN";
/// Override variable for the macos probe.
pub const OVERRIDE_MACOS: &str = "CONDA_OVERRIDE_OSX";
/// Override variable for the linux probe.
pub const OVERRIDE_LINUX: &str = "CONDA_OVERRIDE_LINUX";

/// Returned by the windows probe when `ver` output cannot be parsed.
pub const VERSION_SENTINEL: &str = "0.0.0";

/// Command interpreter used when `COMSPEC` is unset.
const DEFAULT_COMSPEC: &str = "cmd.exe";

/// Name of the override variable for `family`.
pub const fn override_var(family: OsFamily) -> &'static str {
    match family {
        OsFamily::Windows => OVERRIDE_WINDOWS,
        OsFamily::Macos => OVERRIDE_MACOS,
        OsFamily::Linux => OVERRIDE_LINUX,
    }
}

// ============================================================================
// Environment Lookup
// ============================================================================

/// Where probes read override signals (and `COMSPEC`) from.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] backed by the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

// ============================================================================
// Probe
// ============================================================================

/// All three probe results for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostVersions {
    pub windows: String,
    pub macos: String,
    pub linux: String,
}

/// A version prober with an injectable command runner and environment.
///
/// Nothing is cached: every call re-reads the override and re-runs the
/// command.
#[derive(Debug, Clone)]
pub struct VersionProbe<R = SystemCommandRunner, E = ProcessEnv> {
    runner: R,
    env: E,
    host: Option<OsFamily>,
}

impl VersionProbe {
    /// Probe the build host with real subprocesses and the process environment.
    pub fn new() -> Self {
        Self::with_parts(SystemCommandRunner, ProcessEnv, OsFamily::current())
    }
}

impl Default for VersionProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner, E: EnvSource> VersionProbe<R, E> {
    /// Assemble a probe from its parts.
    ///
    /// `host` is the family the probe believes it runs on; `None` makes every
    /// probe without an override return `""`.
    pub fn with_parts(runner: R, env: E, host: Option<OsFamily>) -> Self {
        Self { runner, env, host }
    }

    /// Windows version as `major.minor.build`, or an override, `""`, or `"0.0.0"`.
    pub fn windows_version(&self) -> String {
        debug!(family = "windows", "Probing OS version");
        if let Some(value) = self.override_for(OsFamily::Windows) {
            return value;
        }
        if self.host != Some(OsFamily::Windows) {
            return String::new();
        }

        let comspec = self
            .env
            .var("COMSPEC")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COMSPEC.to_string());

        let output = match self.runner.run(&comspec, &["/c", "ver"]) {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "Could not find Windows version by calling 'ver'");
                return String::new();
            }
        };

        match grammar::parse_windows_ver(&output.stdout) {
            Some(version) => {
                debug!(%version, "Windows version found");
                version
            }
            None => {
                debug!(stdout = %output.stdout.trim(), "Windows version not found");
                VERSION_SENTINEL.to_string()
            }
        }
    }

    /// macOS product version, trimmed, or an override or `""`.
    pub fn macos_version(&self) -> String {
        debug!(family = "macos", "Probing OS version");
        if let Some(value) = self.override_for(OsFamily::Macos) {
            return value;
        }
        if self.host != Some(OsFamily::Macos) {
            return String::new();
        }

        let output = match self.runner.run("sw_vers", &["-productVersion"]) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    error = %err,
                    "Could not find macOS version by calling 'sw_vers -productVersion'"
                );
                return String::new();
            }
        };

        let version = grammar::parse_macos_product_version(&output.stdout).unwrap_or_default();
        debug!(%version, "macOS version found");
        version
    }

    /// Linux kernel release as `major.minor.patch`, or an override or `""`.
    pub fn linux_version(&self) -> String {
        debug!(family = "linux", "Probing OS version");
        if let Some(value) = self.override_for(OsFamily::Linux) {
            return value;
        }
        if self.host != Some(OsFamily::Linux) {
            return String::new();
        }

        let output = match self.runner.run("uname", &["-r"]) {
            Ok(output) => output,
            Err(err) => {
                debug!(error = %err, "Could not find linux version by calling 'uname -r' (skipped)");
                return String::new();
            }
        };

        match grammar::parse_linux_release(&output.stdout) {
            Some(version) => {
                debug!(%version, "linux version found");
                version
            }
            None => {
                debug!(stdout = %output.stdout.trim(), "linux version not found");
                String::new()
            }
        }
    }

    /// Dispatch to the probe for `family`.
    pub fn version_for(&self, family: OsFamily) -> String {
        match family {
            OsFamily::Windows => self.windows_version(),
            OsFamily::Macos => self.macos_version(),
            OsFamily::Linux => self.linux_version(),
        }
    }

    /// Run all three probes.
    pub fn host_versions(&self) -> HostVersions {
        HostVersions {
            windows: self.windows_version(),
            macos: self.macos_version(),
            linux: self.linux_version(),
        }
    }

    fn override_for(&self, family: OsFamily) -> Option<String> {
        let key = override_var(family);
        let value = self.env.var(key).filter(|v| !v.is_empty())?;
        debug!(variable = key, %value, "Using version override");
        Some(value)
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Windows version of this host. See [`VersionProbe::windows_version`].
pub fn windows_version() -> String {
    VersionProbe::new().windows_version()
}

/// macOS version of this host. See [`VersionProbe::macos_version`].
pub fn macos_version() -> String {
    VersionProbe::new().macos_version()
}

/// Linux kernel version of this host. See [`VersionProbe::linux_version`].
pub fn linux_version() -> String {
    VersionProbe::new().linux_version()
}

/// All three versions of this host.
pub fn host_versions() -> HostVersions {
    VersionProbe::new().host_versions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostprims_core::{HostprimsError, HostprimsResult};
    use std::cell::RefCell;
    use std::io;

    /// Records every invocation and replays a canned result.
    struct FakeRunner {
        stdout: Option<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn printing(stdout: &'static str) -> Self {
            Self {
                stdout: Some(stdout),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn missing() -> Self {
            Self {
                stdout: None,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str]) -> HostprimsResult<CommandOutput> {
            let mut line = program.to_string();
            for arg in args {
                line.push(' ');
                line.push_str(arg);
            }
            self.calls.borrow_mut().push(line);

            match self.stdout {
                Some(stdout) => Ok(CommandOutput {
                    status: Some(0),
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
                None => Err(HostprimsError::command_failed(
                    program,
                    io::Error::new(io::ErrorKind::NotFound, "not found"),
                )),
            }
        }
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn probe<'a>(
        runner: &'a FakeRunner,
        pairs: &[(&str, &str)],
        host: Option<OsFamily>,
    ) -> VersionProbe<&'a FakeRunner, HashMap<String, String>> {
        VersionProbe::with_parts(runner, env(pairs), host)
    }

    #[test]
    fn override_is_returned_verbatim_without_running_anything() {
        for family in OsFamily::ALL {
            let runner = FakeRunner::printing("ignored");
            let p = probe(&runner, &[(override_var(family), "7.7 custom")], Some(family));
            assert_eq!(p.version_for(family), "7.7 custom");
            assert!(runner.calls().is_empty(), "{family} probe ran a command");
        }
    }

    #[test]
    fn empty_override_falls_through_to_probe() {
        let runner = FakeRunner::printing("5.15.0-76-generic\n");
        let p = probe(&runner, &[(OVERRIDE_LINUX, "")], Some(OsFamily::Linux));
        assert_eq!(p.linux_version(), "5.15.0");
        assert_eq!(runner.calls(), vec!["uname -r"]);
    }

    #[test]
    fn other_family_returns_empty_without_running_anything() {
        let runner = FakeRunner::printing("whatever");
        let p = probe(&runner, &[], Some(OsFamily::Linux));
        assert_eq!(p.windows_version(), "");
        assert_eq!(p.macos_version(), "");

        let p = probe(&runner, &[], None);
        assert_eq!(p.linux_version(), "");
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn windows_uses_comspec() {
        let runner = FakeRunner::printing("Microsoft Windows [Version 10.0.19041]");
        let p = probe(
            &runner,
            &[("COMSPEC", r"C:\Windows\system32\cmd.exe")],
            Some(OsFamily::Windows),
        );
        assert_eq!(p.windows_version(), "10.0.19041");
        assert_eq!(runner.calls(), vec![r"C:\Windows\system32\cmd.exe /c ver"]);
    }

    #[test]
    fn windows_falls_back_to_cmd_exe() {
        let runner = FakeRunner::printing("Microsoft Windows [Version 10.0.22631.2861]");
        let p = probe(&runner, &[], Some(OsFamily::Windows));
        assert_eq!(p.windows_version(), "10.0.22631");
        assert_eq!(runner.calls(), vec!["cmd.exe /c ver"]);
    }

    #[test]
    fn windows_parse_failure_is_sentinel() {
        let runner = FakeRunner::printing("garbage");
        let p = probe(&runner, &[], Some(OsFamily::Windows));
        assert_eq!(p.windows_version(), VERSION_SENTINEL);
    }

    #[test]
    fn linux_parse_failure_is_empty_not_sentinel() {
        let runner = FakeRunner::printing("5.15.0");
        let p = probe(&runner, &[], Some(OsFamily::Linux));
        assert_eq!(p.linux_version(), "");
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn linux_parse_failure_is_logged() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let runner = FakeRunner::printing("not-a-release\n");
        let p = probe(&runner, &[], Some(OsFamily::Linux));
        let version = tracing::subscriber::with_default(subscriber, || p.linux_version());

        assert_eq!(version, "");
        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("linux version not found"), "log was: {text}");
        assert!(text.contains("not-a-release"), "log was: {text}");
    }

    #[test]
    fn macos_output_is_trimmed() {
        let runner = FakeRunner::printing("12.4\n");
        let p = probe(&runner, &[], Some(OsFamily::Macos));
        assert_eq!(p.macos_version(), "12.4");
        assert_eq!(runner.calls(), vec!["sw_vers -productVersion"]);
    }

    #[test]
    fn missing_command_degrades_to_empty() {
        for family in OsFamily::ALL {
            let runner = FakeRunner::missing();
            let p = probe(&runner, &[], Some(family));
            assert_eq!(p.version_for(family), "", "{family}");
            assert_eq!(runner.calls().len(), 1);
        }
    }

    #[test]
    fn every_call_reprobes() {
        let runner = FakeRunner::printing("6.1.0-13-amd64");
        let p = probe(&runner, &[], Some(OsFamily::Linux));
        assert_eq!(p.linux_version(), "6.1.0");
        assert_eq!(p.linux_version(), "6.1.0");
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn host_versions_collects_all_families() {
        let runner = FakeRunner::printing("6.1.0-13-amd64");
        let p = probe(
            &runner,
            &[(OVERRIDE_WINDOWS, "10.0.1"), (OVERRIDE_MACOS, "13.0")],
            Some(OsFamily::Linux),
        );
        assert_eq!(
            p.host_versions(),
            HostVersions {
                windows: "10.0.1".into(),
                macos: "13.0".into(),
                linux: "6.1.0".into(),
            }
        );
    }
}
