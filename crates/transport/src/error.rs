use std::io;
use std::path::PathBuf;

use relocate::RelocationReport;
use thiserror::Error;

/// Failures reported by a [`Transport`](crate::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured mode names no known transport.
    #[error("unrecognized long-term archive mode '{mode}'; expected one of {}", crate::TransportMode::NAMES.join(", "))]
    UnrecognizedMode {
        /// Mode string as configured.
        mode: String,
    },
    /// A required external tool is missing or refused access.
    #[error("{tool} is unavailable: {reason}")]
    Unavailable {
        /// Tool that could not be used.
        tool: String,
        /// What went wrong and how to fix it.
        reason: String,
    },
    /// A required setting was not provided.
    #[error("{name} must be set for {transport} transfers")]
    MissingSetting {
        /// Case variable that is missing.
        name: &'static str,
        /// Transport that needed it.
        transport: &'static str,
    },
    /// The source tree does not exist.
    #[error("source directory '{}' does not exist", .path.display())]
    MissingSource {
        /// Source root.
        path: PathBuf,
    },
    /// A subprocess could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// A subprocess exited unsuccessfully.
    #[error("command `{command}` failed with {status}{}", render_stderr(.stderr))]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
    /// A local filesystem operation outside the per-entry loop failed.
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
    /// Some entries did not transfer.
    #[error("transfer to {destination} incomplete: {}", .report.summary())]
    Partial {
        /// Destination description.
        destination: String,
        /// Per-entry outcome.
        report: RelocationReport,
    },
}

impl TransportError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

fn render_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}
