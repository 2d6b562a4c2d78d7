//! Error types for hostprims operations.
//!
//! - [`HostprimsError`] - Canonical error type for all hostprims operations
//!
//! ## Design Principles
//!
//! - **Structured**: Errors carry typed context (pid, command, feature) not just messages
//! - **Machine-friendly**: Every variant maps to a stable numeric code
//! - **ABI-aligned**: Uses `u32` for PIDs (unsigned for cross-platform consistency)
//!
//! Most hostprims queries never return these: probes degrade to empty values.
//! The fatal paths are [`HostprimsError::ExecutableNotFound`] and
//! [`HostprimsError::Conversion`].

use std::io;
use thiserror::Error;

// ============================================================================
// Canonical Error Type
// ============================================================================

/// Canonical error type for all hostprims operations.
///
/// ## Error Code Mapping
///
/// | Variant | Code |
/// |---------|------|
/// | `InvalidArgument` | 1 |
/// | `CommandFailed` | 2 |
/// | `ExecutableNotFound` | 3 |
/// | `PermissionDenied` | 4 |
/// | `NotFound` | 5 |
/// | `NotSupported` | 6 |
/// | `Conversion` | 7 |
/// | `System` | 8 |
/// | `Internal` | 99 |
#[derive(Debug, Error)]
pub enum HostprimsError {
    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of what was invalid.
        message: String,
    },

    /// An external command could not be launched.
    #[error("Failed to run '{command}': {source}")]
    CommandFailed {
        /// The program that was invoked.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The running executable could not be located.
    ///
    /// Callers cannot proceed without their own path, so this is fatal.
    #[error("Could not resolve the location of the running executable: {reason}")]
    ExecutableNotFound {
        /// What the platform lookup reported.
        reason: String,
    },

    /// Permission denied for the operation.
    #[error("Permission denied for '{operation}'")]
    PermissionDenied {
        /// The operation that was denied.
        operation: String,
    },

    /// Target process not found.
    #[error("Process {pid} not found")]
    NotFound {
        /// The process ID that was not found.
        pid: u32,
    },

    /// Operation not supported on the current platform.
    #[error("Operation '{feature}' not supported on {platform}")]
    NotSupported {
        /// The feature that is not supported.
        feature: String,
        /// The platform where it's not supported.
        platform: String,
    },

    /// Native text could not be converted to UTF-8.
    #[error("Failed to convert string to UTF-8: {message}")]
    Conversion {
        /// Description of the failure.
        message: String,
    },

    /// System-level error with errno/GetLastError context.
    #[error("System error: {message} (errno: {errno})")]
    System {
        /// Description of the error.
        message: String,
        /// The errno value (Unix) or GetLastError (Windows).
        errno: i32,
    },

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl HostprimsError {
    /// Get the numeric error code for this error.
    pub fn error_code(&self) -> i32 {
        match self {
            HostprimsError::InvalidArgument { .. } => 1,
            HostprimsError::CommandFailed { .. } => 2,
            HostprimsError::ExecutableNotFound { .. } => 3,
            HostprimsError::PermissionDenied { .. } => 4,
            HostprimsError::NotFound { .. } => 5,
            HostprimsError::NotSupported { .. } => 6,
            HostprimsError::Conversion { .. } => 7,
            HostprimsError::System { .. } => 8,
            HostprimsError::Internal { .. } => 99,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl HostprimsError {
    /// Create an `InvalidArgument` error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        HostprimsError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a `CommandFailed` error from an IO error.
    pub fn command_failed(command: impl Into<String>, source: io::Error) -> Self {
        HostprimsError::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an `ExecutableNotFound` error.
    pub fn executable_not_found(reason: impl Into<String>) -> Self {
        HostprimsError::ExecutableNotFound {
            reason: reason.into(),
        }
    }

    /// Create a `PermissionDenied` error.
    pub fn permission_denied(operation: impl Into<String>) -> Self {
        HostprimsError::PermissionDenied {
            operation: operation.into(),
        }
    }

    /// Create a `NotFound` error.
    pub fn not_found(pid: u32) -> Self {
        HostprimsError::NotFound { pid }
    }

    /// Create a `NotSupported` error.
    pub fn not_supported(feature: impl Into<String>, platform: impl Into<String>) -> Self {
        HostprimsError::NotSupported {
            feature: feature.into(),
            platform: platform.into(),
        }
    }

    /// Create a `Conversion` error.
    pub fn conversion(message: impl Into<String>) -> Self {
        HostprimsError::Conversion {
            message: message.into(),
        }
    }

    /// Create a `System` error.
    pub fn system(message: impl Into<String>, errno: i32) -> Self {
        HostprimsError::System {
            message: message.into(),
            errno,
        }
    }

    /// Create a `System` error from the last OS error.
    pub fn last_os_error(message: impl Into<String>) -> Self {
        let os_error = io::Error::last_os_error();
        HostprimsError::System {
            message: format!("{}: {}", message.into(), os_error),
            errno: os_error.raw_os_error().unwrap_or(0),
        }
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        HostprimsError::Internal {
            message: message.into(),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<io::Error> for HostprimsError {
    fn from(source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => HostprimsError::PermissionDenied {
                operation: source.to_string(),
            },
            _ => HostprimsError::System {
                errno: source.raw_os_error().unwrap_or(0),
                message: source.to_string(),
            },
        }
    }
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for hostprims operations.
pub type HostprimsResult<T> = Result<T, HostprimsError>;

// ============================================================================
// Tests
// ============================================================================
