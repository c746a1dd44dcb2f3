use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::policy::{Operation, RelocationPolicy};

/// A single file operation that did not complete.
#[derive(Debug, Error)]
#[error("failed to {} '{}': {source}", .action.verb(), .path.display())]
pub struct RelocationFailure {
    action: Operation,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl RelocationFailure {
    /// Records that `action` failed for `path`.
    pub fn new(
        action: impl Into<Operation>,
        path: impl Into<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self {
            action: action.into(),
            path: path.into(),
            source,
        }
    }

    /// Operation that failed.
    #[must_use]
    pub const fn action(&self) -> Operation {
        self.action
    }

    /// Source path of the failed operation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying I/O failure.
    #[must_use]
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }
}

/// Outcome of a batch of relocations.
///
/// Successful operations are counted per policy; failures are kept in the
/// order they occurred so the aggregated message reads like the run log.
#[derive(Debug, Default)]
pub struct RelocationReport {
    moved: usize,
    copied: usize,
    deleted: usize,
    failures: Vec<RelocationFailure>,
}

impl RelocationReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one successful operation.
    pub fn record_success(&mut self, policy: RelocationPolicy) {
        match policy {
            RelocationPolicy::Move => self.moved += 1,
            RelocationPolicy::Copy => self.copied += 1,
            RelocationPolicy::Delete => self.deleted += 1,
        }
    }

    /// Stores a failed operation.
    pub fn record_failure(&mut self, failure: RelocationFailure) {
        tracing::warn!(target: "archive::relocate", "{failure}");
        self.failures.push(failure);
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: Self) {
        self.moved += other.moved;
        self.copied += other.copied;
        self.deleted += other.deleted;
        self.failures.extend(other.failures);
    }

    /// Number of successful moves.
    #[must_use]
    pub const fn moved(&self) -> usize {
        self.moved
    }

    /// Number of successful copies.
    #[must_use]
    pub const fn copied(&self) -> usize {
        self.copied
    }

    /// Number of successful deletions.
    #[must_use]
    pub const fn deleted(&self) -> usize {
        self.deleted
    }

    /// Total number of successful operations.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.moved + self.copied + self.deleted
    }

    /// Failed operations in the order they occurred.
    #[must_use]
    pub fn failures(&self) -> &[RelocationFailure] {
        &self.failures
    }

    /// Consumes the report, returning its failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<RelocationFailure> {
        self.failures
    }

    /// True when no operation failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Aggregated, multi-line description of every failure.
    #[must_use]
    pub fn summary(&self) -> String {
        let attempted = self.completed() + self.failures.len();
        let mut message = format!(
            "{} of {attempted} file operation{} failed",
            self.failures.len(),
            if attempted == 1 { "" } else { "s" }
        );
        for failure in &self.failures {
            let _ = write!(message, "\n  {failure}");
        }
        message
    }
}
