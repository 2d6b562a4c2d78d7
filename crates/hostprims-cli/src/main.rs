use std::collections::BTreeMap;
use std::io::Write;

use clap::{Parser, Subcommand};
use hostprims_core::schema::{HOST_INFO_V1, OS_VERSIONS_V1, PROCESS_IDENTITY_V1};
use hostprims_core::{get_platform, HostprimsError, OsFamily};
use hostprims_proc::ProcessIdentity;
use hostprims_version::{HostVersions, VersionProbe};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Host introspection: OS versions, executable identity, and privileges.
#[derive(Parser, Debug)]
#[command(name = "hostprims", version, about, long_about = None)]
struct Cli {
    /// The format for log output.
    #[arg(long, value_name = "FORMAT", default_value = "text", env = "HOSTPRIMS_LOG_FORMAT")]
    log_format: LogFormat,

    /// The minimum log level to display.
    #[arg(long, value_name = "LEVEL", default_value = "info", env = "HOSTPRIMS_LOG_LEVEL")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the OS version of this host.
    ///
    /// Each family honors its override variable (CONDA_OVERRIDE_WIN,
    /// CONDA_OVERRIDE_OSX, CONDA_OVERRIDE_LINUX) before probing.
    Version(VersionArgs),

    /// Print the absolute path of this executable.
    SelfExe,

    /// Print the parent process ID.
    Ppid,

    /// Display the parent and name of a process.
    Pinfo(PinfoArgs),

    /// Print whether this process runs elevated.
    IsAdmin,

    /// Enable the Windows long-path capability flag.
    ///
    /// Without --force and without elevation, asks before relaunching
    /// reg.exe elevated.
    EnableLongPaths(EnableLongPathsArgs),

    /// Display a snapshot of everything hostprims knows about this host.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct VersionArgs {
    /// Probe a single family (windows, macos, linux).
    #[arg(long, value_name = "FAMILY")]
    family: Option<OsFamily>,

    /// Output JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct PinfoArgs {
    /// Target process ID.
    #[arg(value_name = "PID")]
    pid: u32,

    /// Output JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct EnableLongPathsArgs {
    /// Write the flag directly, without asking.
    #[arg(long)]
    force: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Output JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum LogFormat {
    /// Human-readable text format.
    Text,
    /// Machine-readable JSON format.
    Json,
}

/// Exit codes.
///
/// - 0: Success
/// - 1: Error, or the requested change was refused
mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

fn main() {
    let cli = Cli::parse();

    // Initialize the tracing subscriber
    let filter = EnvFilter::from_default_env().add_directive(cli.log_level.into());

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    }

    let console = hostprims_console::setup();
    info!("Initialization complete. Starting main logic.");

    let mut out = hostprims_console::buffered_stdout();
    let exit_code = match run(cli.command, &mut out) {
        Ok(code) => code,
        Err(err) => {
            let _ = out.flush();
            eprintln!("Error: {err}");
            exit_codes::FAILURE
        }
    };
    if let Err(err) = out.flush() {
        eprintln!("Error: {err}");
    }

    info!("Main logic finished.");
    hostprims_console::teardown(console);
    std::process::exit(exit_code);
}

fn run(command: Option<Command>, out: &mut impl Write) -> Result<i32, HostprimsError> {
    let Some(command) = command else {
        writeln!(out, "Platform: {}", get_platform())?;
        return Ok(exit_codes::SUCCESS);
    };

    match command {
        Command::Version(args) => run_version(args, out),
        Command::SelfExe => {
            let path = hostprims_proc::self_exe_path()?;
            writeln!(out, "{}", path.display())?;
            Ok(exit_codes::SUCCESS)
        }
        Command::Ppid => {
            writeln!(out, "{}", hostprims_proc::parent_pid())?;
            Ok(exit_codes::SUCCESS)
        }
        Command::Pinfo(args) => run_pinfo(args, out),
        Command::IsAdmin => {
            writeln!(out, "{}", hostprims_privilege::is_elevated())?;
            Ok(exit_codes::SUCCESS)
        }
        Command::EnableLongPaths(args) => run_enable_long_paths(args),
        Command::Info(args) => run_info(args, out),
    }
}

/// `version --json` document. Keys are family names.
#[derive(Serialize, Debug)]
struct OsVersionsJson {
    schema_id: &'static str,
    timestamp: String,
    versions: BTreeMap<&'static str, String>,
}

fn run_version(args: VersionArgs, out: &mut impl Write) -> Result<i32, HostprimsError> {
    let probe = VersionProbe::new();
    let families: Vec<OsFamily> = match args.family {
        Some(family) => vec![family],
        None => OsFamily::ALL.to_vec(),
    };
    let versions: BTreeMap<&'static str, String> = families
        .iter()
        .map(|family| (family.as_str(), probe.version_for(*family)))
        .collect();

    if args.json {
        let doc = OsVersionsJson {
            schema_id: OS_VERSIONS_V1,
            timestamp: current_timestamp(),
            versions,
        };
        write_json(out, &doc)?;
        return Ok(exit_codes::SUCCESS);
    }

    match args.family {
        Some(family) => writeln!(out, "{}", versions[family.as_str()])?,
        None => {
            for family in OsFamily::ALL {
                writeln!(out, "{:<8} {}", family.as_str(), versions[family.as_str()])?;
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}

/// `pinfo --json` document.
#[derive(Serialize, Debug)]
struct ProcessIdentityJson {
    schema_id: &'static str,
    timestamp: String,
    #[serde(flatten)]
    identity: ProcessIdentity,
}

fn run_pinfo(args: PinfoArgs, out: &mut impl Write) -> Result<i32, HostprimsError> {
    let identity = hostprims_proc::process_identity(args.pid);

    if args.json {
        let doc = ProcessIdentityJson {
            schema_id: PROCESS_IDENTITY_V1,
            timestamp: current_timestamp(),
            identity,
        };
        write_json(out, &doc)?;
        return Ok(exit_codes::SUCCESS);
    }

    writeln!(out, "PID:    {}", identity.pid)?;
    writeln!(out, "PPID:   {}", display_opt(identity.parent_pid))?;
    writeln!(out, "NAME:   {}", display_opt(identity.name))?;
    Ok(exit_codes::SUCCESS)
}

#[cfg(windows)]
fn run_enable_long_paths(args: EnableLongPathsArgs) -> Result<i32, HostprimsError> {
    if hostprims_privilege::enable_long_path_support(args.force) {
        Ok(exit_codes::SUCCESS)
    } else {
        Ok(exit_codes::FAILURE)
    }
}

#[cfg(not(windows))]
fn run_enable_long_paths(_args: EnableLongPathsArgs) -> Result<i32, HostprimsError> {
    Err(HostprimsError::not_supported(
        "long path support",
        get_platform(),
    ))
}

/// `info` snapshot.
#[derive(Serialize, Debug)]
struct HostInfo {
    schema_id: &'static str,
    timestamp: String,
    platform: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    family: Option<OsFamily>,
    versions: HostVersions,
    #[serde(skip_serializing_if = "Option::is_none")]
    executable: Option<String>,
    parent_pid: u32,
    elevated: bool,
}

fn collect_host_info() -> HostInfo {
    let executable = match hostprims_proc::self_exe_path() {
        Ok(path) => Some(path.display().to_string()),
        Err(err) => {
            warn!(error = %err, "Executable path unavailable");
            None
        }
    };

    HostInfo {
        schema_id: HOST_INFO_V1,
        timestamp: current_timestamp(),
        platform: get_platform(),
        family: OsFamily::current(),
        versions: hostprims_version::host_versions(),
        executable,
        parent_pid: hostprims_proc::parent_pid(),
        elevated: hostprims_privilege::is_elevated(),
    }
}

fn run_info(args: InfoArgs, out: &mut impl Write) -> Result<i32, HostprimsError> {
    let host = collect_host_info();

    if args.json {
        write_json(out, &host)?;
        return Ok(exit_codes::SUCCESS);
    }

    writeln!(out, "Platform:    {}", host.platform)?;
    writeln!(out, "Windows:     {}", host.versions.windows)?;
    writeln!(out, "macOS:       {}", host.versions.macos)?;
    writeln!(out, "Linux:       {}", host.versions.linux)?;
    writeln!(out, "Executable:  {}", display_opt(host.executable))?;
    writeln!(out, "Parent PID:  {}", host.parent_pid)?;
    writeln!(out, "Elevated:    {}", host.elevated)?;
    Ok(exit_codes::SUCCESS)
}

fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), HostprimsError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| HostprimsError::internal(format!("JSON serialization failed: {e}")))?;
    writeln!(out, "{text}")?;
    Ok(())
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Current timestamp in RFC 3339 format.
fn current_timestamp() -> String {
    use time::format_description::well_known::Rfc3339;
    use time::OffsetDateTime;

    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
