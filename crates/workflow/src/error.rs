use std::io;
use std::path::PathBuf;

use case::CaseError;
use engine::ShortTermError;
use relocate::RelocationReport;
use thiserror::Error;
use transport::{TransportError, TransportMode};

use crate::exit_code::ExitCode;

/// Failures that abort an archive command.
///
/// Each variant maps to one [`ExitCode`] through [`ArchiveError::exit_code`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A case variable or the archive specification is missing or invalid.
    #[error(transparent)]
    Case(#[from] CaseError),
    /// The case is configured in a way the command cannot work with.
    #[error("{message}")]
    Configuration {
        /// What is wrong and which variable to fix.
        message: String,
    },
    /// The command is not allowed to run yet.
    #[error("{message}")]
    PreconditionNotMet {
        /// Which precondition failed.
        message: String,
    },
    /// A required external tool is missing or refused access.
    #[error("{tool} is unavailable: {reason}")]
    TransportUnavailable {
        /// Tool that could not be used.
        tool: String,
        /// What went wrong and how to fix it.
        reason: String,
    },
    /// Some files were not relocated.
    #[error("{phase} incomplete: {}", .report.summary())]
    PartialRelocation {
        /// Phase or destination the failures belong to.
        phase: String,
        /// Per-file outcome.
        report: RelocationReport,
    },
    /// The configured long-term mode names no known transport.
    #[error("unrecognized long-term archive mode '{mode}'; expected one of {}", TransportMode::NAMES.join(", "))]
    UnrecognizedMode {
        /// Mode string as configured.
        mode: String,
    },
    /// The run directory holds no coupler restart files.
    #[error("cannot find a {case}.cpl.r.*.nc file in directory '{}'", .rundir.display())]
    NoRestartFilesFound {
        /// Case name used in the search.
        case: String,
        /// Directory that was searched.
        rundir: PathBuf,
    },
    /// The transfer tool ran and reported failure.
    #[error("long-term transfer failed: {0}")]
    TransferFailed(#[source] TransportError),
    /// A filesystem operation outside the per-file loop failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// Writing a listing to the caller's output failed.
    #[error("failed to write listing: {0}")]
    Output(#[source] io::Error),
}

impl ArchiveError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionNotMet {
            message: message.into(),
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Exit code the command should terminate with.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Case(_) | Self::Configuration { .. } => ExitCode::Configuration,
            Self::PreconditionNotMet { .. } => ExitCode::PreconditionNotMet,
            Self::TransportUnavailable { .. } => ExitCode::TransportUnavailable,
            Self::PartialRelocation { .. } => ExitCode::PartialRelocation,
            Self::UnrecognizedMode { .. } => ExitCode::UnrecognizedMode,
            Self::NoRestartFilesFound { .. } => ExitCode::NoRestartFiles,
            Self::TransferFailed(_) => ExitCode::TransferFailed,
            Self::Io { .. } | Self::Output(_) => ExitCode::FileIo,
        }
    }
}

impl From<ShortTermError> for ArchiveError {
    fn from(error: ShortTermError) -> Self {
        match error {
            ShortTermError::Case(error) => Self::Case(error),
            ShortTermError::MissingRunDir { path } => Self::configuration(format!(
                "run directory '{}' does not exist; check RUNDIR",
                path.display()
            )),
            ShortTermError::NoRestartFiles { case, rundir } => {
                Self::NoRestartFilesFound { case, rundir }
            }
            error @ ShortTermError::Pattern { .. } => Self::configuration(error.to_string()),
            ShortTermError::Io {
                action,
                path,
                source,
            } => Self::Io {
                action,
                path,
                source,
            },
            ShortTermError::Walk(error) => {
                let path = error.path().to_path_buf();
                Self::io("walk", path, error.into_io_error())
            }
        }
    }
}

impl From<TransportError> for ArchiveError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::UnrecognizedMode { mode } => Self::UnrecognizedMode { mode },
            TransportError::Unavailable { tool, reason } => {
                Self::TransportUnavailable { tool, reason }
            }
            TransportError::Spawn { program, source } => Self::TransportUnavailable {
                tool: program,
                reason: source.to_string(),
            },
            error @ (TransportError::MissingSetting { .. }
            | TransportError::MissingSource { .. }) => Self::configuration(error.to_string()),
            TransportError::Partial {
                destination,
                report,
            } => Self::PartialRelocation {
                phase: format!("transfer to {destination}"),
                report,
            },
            TransportError::Io {
                action,
                path,
                source,
            } => Self::Io {
                action,
                path,
                source,
            },
            error @ TransportError::CommandFailed { .. } => Self::TransferFailed(error),
        }
    }
}
