use std::io;
use std::path::PathBuf;

use case::CaseError;
use thiserror::Error;
use walk::WalkError;

/// Result alias for short-term archive operations.
pub type ShortTermResult<T> = Result<T, ShortTermError>;

/// Failures that stop short-term processing before any per-file work runs.
///
/// Individual move, copy, and delete failures are not represented here; they
/// accumulate in a [`relocate::RelocationReport`] so sibling files keep
/// processing.
#[derive(Debug, Error)]
pub enum ShortTermError {
    /// A required case variable is missing or malformed.
    #[error(transparent)]
    Case(#[from] CaseError),
    /// The run directory does not exist.
    #[error("cannot open run directory '{}'", .path.display())]
    MissingRunDir {
        /// Configured `RUNDIR`.
        path: PathBuf,
    },
    /// The run directory holds no coupler restart files.
    #[error("cannot find a {case}.cpl.r.*.nc file in directory '{}'", .rundir.display())]
    NoRestartFiles {
        /// Case name used in the search pattern.
        case: String,
        /// Directory that was searched.
        rundir: PathBuf,
    },
    /// A generated file-name pattern failed to compile.
    #[error("invalid file-name pattern '{pattern}': {source}")]
    Pattern {
        /// Pattern text after substitution.
        pattern: String,
        /// Regex compiler diagnostic.
        #[source]
        source: regex::Error,
    },
    /// A directory could not be listed or created.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Directory involved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// The archive tree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),
}

impl ShortTermError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
