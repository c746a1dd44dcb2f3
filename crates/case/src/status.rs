//! Append-only `CaseStatus` log.
//!
//! Each phase of a case appends a timestamped marker line. Progression checks
//! scan the log for those markers; nothing ever rewrites existing lines.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use time::macros::format_description;

use crate::error::{CaseError, CaseResult};

/// File name of the status log inside a case root.
pub const CASE_STATUS_FILE: &str = "CaseStatus";

/// Marker written by the model when a run finishes cleanly.
pub const RUN_SUCCESSFUL: &str = "Run SUCCESSFUL";
/// Marker appended when short-term archiving begins.
pub const ST_ARCHIVE_STARTING: &str = "st_archiving starting";
/// Marker appended when short-term archiving finishes without failures.
pub const ST_ARCHIVE_COMPLETED: &str = "st_archiving completed";
/// Marker appended when long-term archiving begins.
pub const LT_ARCHIVE_STARTING: &str = "lt_archive starting";
/// Marker appended when long-term archiving finishes.
pub const LT_ARCHIVE_COMPLETED: &str = "lt_archive completed";

/// Handle on a case's status log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseStatus {
    path: PathBuf,
}

impl CaseStatus {
    /// Status log located at `<caseroot>/CaseStatus`.
    #[must_use]
    pub fn in_caseroot(caseroot: &Path) -> Self {
        Self::at(caseroot.join(CASE_STATUS_FILE))
    }

    /// Status log at an explicit path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `message` prefixed with the local timestamp.
    pub fn append(&self, message: &str) -> CaseResult<()> {
        let line = format!("{}: {message}\n", timestamp());
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|source| CaseError::StatusWrite {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(target: "archive::status", "{message}");
        Ok(())
    }

    /// Full log contents. A missing log reads as empty.
    pub fn contents(&self) -> CaseResult<String> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(CaseError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Reports whether any line contains `marker`.
    pub fn contains(&self, marker: &str) -> CaseResult<bool> {
        Ok(self.contents()?.contains(marker))
    }

    /// Reports whether the model run finished successfully.
    pub fn run_successful(&self) -> CaseResult<bool> {
        self.contains(RUN_SUCCESSFUL)
    }

    /// Reports whether the most recent mention of a process is its completion
    /// marker.
    ///
    /// The log is scanned for lines containing either marker; the process is
    /// complete only when the last such line carries `completed`. A log that
    /// never mentions the process reports `false`.
    pub fn is_last_process_complete(&self, completed: &str, started: &str) -> CaseResult<bool> {
        let contents = self.contents()?;
        let last = contents.lines().rev().find_map(|line| {
            if line.contains(completed) {
                Some(true)
            } else if line.contains(started) {
                Some(false)
            } else {
                None
            }
        });
        Ok(last.unwrap_or(false))
    }

    /// Reports whether short-term archiving last ran to completion.
    pub fn short_term_complete(&self) -> CaseResult<bool> {
        self.is_last_process_complete(ST_ARCHIVE_COMPLETED, ST_ARCHIVE_STARTING)
    }
}

fn timestamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(&format)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_in(dir: &tempfile::TempDir) -> CaseStatus {
        CaseStatus::in_caseroot(dir.path())
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let status = status_in(&dir);
        assert_eq!(status.contents().unwrap(), "");
        assert!(!status.run_successful().unwrap());
    }

    #[test]
    fn append_adds_timestamped_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let status = status_in(&dir);
        status.append(ST_ARCHIVE_STARTING).unwrap();
        status.append(ST_ARCHIVE_COMPLETED).unwrap();

        let contents = status.contents().unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": st_archiving starting"));
        assert!(lines[1].ends_with(": st_archiving completed"));
        assert!(lines[0].as_bytes()[4] == b'-', "line starts with a date: {}", lines[0]);
    }

    #[test]
    fn run_successful_scans_for_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(CASE_STATUS_FILE),
            "2001-01-01 00:00:00: case.run starting\n2001-01-01 01:00:00: Run SUCCESSFUL\n",
        )
        .unwrap();
        assert!(status_in(&dir).run_successful().unwrap());
    }

    #[test]
    fn last_marker_decides_completion() {
        let dir = tempfile::tempdir().expect("tempdir");
        let status = status_in(&dir);
        assert!(!status.short_term_complete().unwrap());

        status.append(ST_ARCHIVE_STARTING).unwrap();
        assert!(!status.short_term_complete().unwrap());

        status.append(ST_ARCHIVE_COMPLETED).unwrap();
        assert!(status.short_term_complete().unwrap());

        status.append(ST_ARCHIVE_STARTING).unwrap();
        assert!(
            !status.short_term_complete().unwrap(),
            "a restarted archive that never finished is incomplete"
        );
    }
}
