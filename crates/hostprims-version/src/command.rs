//! Blocking invocation of external diagnostic commands.
//!
//! Probes never set a timeout: a hung `uname` hangs the caller. Callers that
//! need a deadline implement [`CommandRunner`] themselves and hand it to
//! [`crate::VersionProbe::with_parts`].

use std::process::{Command, Stdio};

use hostprims_core::{HostprimsError, HostprimsResult};

/// Captured result of one subprocess run. Never cached, never retried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

/// Runs a program to completion and captures its output.
///
/// An `Err` means the program could not be launched at all. A program that
/// starts and exits nonzero is still `Ok`.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> HostprimsResult<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, program: &str, args: &[&str]) -> HostprimsResult<CommandOutput> {
        (**self).run(program, args)
    }
}

/// [`CommandRunner`] backed by `std::process::Command`.
///
/// Inherits the environment, attaches a null stdin and pipes stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> HostprimsResult<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| HostprimsError::command_failed(program, e))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
