//! Restart-set discovery.
//!
//! Coupler restart files (`<case>.cpl.r.<datename>.nc`) mark every checkpoint
//! the run produced. Their datenames, in lexical file-name order, drive the
//! archive process.

use std::fs;
use std::path::Path;

use crate::error::{ShortTermError, ShortTermResult};

/// Ordered, duplicate-free checkpoint identifiers found in a run directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestartSet {
    datenames: Vec<String>,
}

impl RestartSet {
    /// Builds a set from identifiers already in discovery order.
    ///
    /// Repeated identifiers keep their first position.
    pub fn new<I, S>(datenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for datename in datenames {
            let datename = datename.into();
            if !unique.contains(&datename) {
                unique.push(datename);
            }
        }
        Self { datenames: unique }
    }

    /// Identifiers in discovery order.
    #[must_use]
    pub fn datenames(&self) -> &[String] {
        &self.datenames
    }

    /// The checkpoint whose files stay resumable in the run directory.
    #[must_use]
    pub fn most_recent(&self) -> Option<&str> {
        self.datenames.last().map(String::as_str)
    }

    /// Yields each identifier with a flag marking the most recent one.
    pub fn checkpoints(&self) -> impl Iterator<Item = (&str, bool)> {
        let last = self.datenames.len().saturating_sub(1);
        self.datenames
            .iter()
            .enumerate()
            .map(move |(index, datename)| (datename.as_str(), index == last))
    }

    /// Number of checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.datenames.len()
    }

    /// True when no checkpoint was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datenames.is_empty()
    }
}

/// Scans `rundir` for `<case>.cpl.r*.nc` files and extracts their datenames.
///
/// The datename is the second-to-last dot-separated segment of the file name.
pub fn discover_datenames(rundir: &Path, case: &str) -> ShortTermResult<RestartSet> {
    if !rundir.is_dir() {
        return Err(ShortTermError::MissingRunDir {
            path: rundir.to_path_buf(),
        });
    }

    let prefix = format!("{case}.cpl.r");
    let entries =
        fs::read_dir(rundir).map_err(|error| ShortTermError::io("list", rundir, error))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| ShortTermError::io("list", rundir, error))?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with(&prefix) && name.ends_with(".nc") {
            names.push(name);
        }
    }

    if names.is_empty() {
        return Err(ShortTermError::NoRestartFiles {
            case: case.to_owned(),
            rundir: rundir.to_path_buf(),
        });
    }

    names.sort();
    let set = RestartSet::new(names.iter().filter_map(|name| datename_of(name)));
    for datename in set.datenames() {
        tracing::debug!(target: "archive::restart", %datename, "cpl datename");
    }
    Ok(set)
}

fn datename_of(file_name: &str) -> Option<&str> {
    let mut segments = file_name.rsplit('.');
    segments.next()?;
    segments.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").expect("touch");
    }

    #[test]
    fn datenames_follow_lexical_file_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "case.cpl.r.2001-01-02.nc");
        touch(temp.path(), "case.cpl.r.2001-01-01.nc");
        touch(temp.path(), "case.cam.r.2001-01-01.nc");

        let set = discover_datenames(temp.path(), "case").expect("discover");
        assert_eq!(set.datenames(), ["2001-01-01", "2001-01-02"]);
        assert_eq!(set.most_recent(), Some("2001-01-02"));
    }

    #[test]
    fn checkpoints_flag_only_the_last() {
        let set = RestartSet::new(["a", "b", "c"]);
        let flags: Vec<_> = set.checkpoints().collect();
        assert_eq!(flags, vec![("a", false), ("b", false), ("c", true)]);
    }

    #[test]
    fn duplicate_datenames_keep_first_position() {
        let set = RestartSet::new(["0001-01-01", "0002-01-01", "0001-01-01"]);
        assert_eq!(set.datenames(), ["0001-01-01", "0002-01-01"]);
    }

    #[test]
    fn other_cases_are_ignored() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "case.cpl.r.0001-01-06-00000.nc");
        touch(temp.path(), "other.cpl.r.0001-01-07-00000.nc");
        touch(temp.path(), "case.cpl.r.0001-01-08-00000.nc.partial");

        let set = discover_datenames(temp.path(), "case").expect("discover");
        assert_eq!(set.datenames(), ["0001-01-06-00000"]);
    }

    #[test]
    fn missing_run_directory_is_a_configuration_problem() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = discover_datenames(&temp.path().join("run"), "case").expect_err("missing");
        assert!(matches!(error, ShortTermError::MissingRunDir { .. }));
    }

    #[test]
    fn empty_run_directory_has_no_restart_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(temp.path(), "case.cpl.h.0001-01-01.nc");
        let error = discover_datenames(temp.path(), "case").expect_err("none");
        assert!(matches!(error, ShortTermError::NoRestartFiles { .. }));
        assert!(error.to_string().contains("case.cpl.r.*.nc"));
    }
}
