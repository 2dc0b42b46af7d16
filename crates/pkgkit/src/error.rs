//! Error types for package-manager detection, selection and execution.
//!
//! Errors are categorized so the CLI can print actionable guidance: a
//! detection failure is fixed by configuration, a typo in a manager name
//! by checking the list of known managers.

use crate::id::PackageManagerId;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for pkgkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors, used to pick advice for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The platform or distribution could not be mapped to a manager
    Detection,
    /// The manager name is unknown, or known without a backend
    Manager,
    /// A package-manager command failed
    Command,
    /// The verb was invoked with the wrong arguments
    Usage,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Detection => "Package manager detection failed",
            Self::Manager => "Package manager not available",
            Self::Command => "Package manager command failed",
            Self::Usage => "Invalid package operation",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Detection => {
                "Set package_manager in the configuration file, or pass --manager"
            }
            Self::Manager => "Pass --manager with one of the supported package managers",
            Self::Command => "Check the package manager output above",
            Self::Usage => "See --help for the arguments each operation takes",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur in pkgkit.
#[derive(Debug, Error)]
pub enum Error {
    /// The name is not in the known set at all
    #[error("unknown package manager '{name}'")]
    UnknownManager {
        /// The name as given
        name: String,
    },

    /// Known identifier, but no backend has been written for it
    #[error("package manager {id} is not supported yet")]
    UnsupportedManager {
        /// The identifier without a backend
        id: PackageManagerId,
    },

    /// Linux, but none of the distribution marker files exist
    #[error("unknown Linux distribution")]
    UnknownDistribution,

    /// A recognized platform that has no package management support
    #[error("package management under {platform} is not yet supported")]
    PlatformNotSupported {
        /// Kernel/OS name as reported by the system
        platform: String,
    },

    /// A platform name we have never heard of
    #[error("unknown platform '{platform}'")]
    UnrecognizedPlatform {
        /// Kernel/OS name as reported by the system
        platform: String,
    },

    /// A package-manager command exited unsuccessfully
    #[error("command failed ({status}): {command}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Exit status description
        status: String,
    },

    /// The verb needs package names and none were given
    #[error("{verb} requires at least one package name")]
    MissingPackages {
        /// The verb, e.g. "install"
        verb: &'static str,
    },

    /// The verb takes no package names and some were given
    #[error("{verb} takes no package names")]
    ExtraArguments {
        /// The verb, e.g. "update"
        verb: &'static str,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Get the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownDistribution
            | Self::PlatformNotSupported { .. }
            | Self::UnrecognizedPlatform { .. } => ErrorCategory::Detection,
            Self::UnknownManager { .. } | Self::UnsupportedManager { .. } => {
                ErrorCategory::Manager
            }
            Self::CommandFailed { .. } => ErrorCategory::Command,
            Self::MissingPackages { .. } | Self::ExtraArguments { .. } => ErrorCategory::Usage,
            Self::Io(_) => ErrorCategory::Other,
        }
    }

    /// Whether this is a detection failure the operator can override.
    #[must_use]
    pub fn is_detection(&self) -> bool {
        self.category() == ErrorCategory::Detection
    }
}
