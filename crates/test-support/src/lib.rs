#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Fixtures for tests that need a case directory on disk.
//!
//! [`CaseFixture`] lays out a temporary case root, run directory, and archive
//! root, and writes the `env_case.toml`, `env_archive.toml`, and `CaseStatus`
//! files the archivers read. [`FileTree`] lists what ended up where.
//!
//! ```
//! use test_support::CaseFixture;
//!
//! let fixture = CaseFixture::new("b40");
//! fixture.touch_run("b40.cpl.r.0001-01-02-00000.nc");
//! assert_eq!(fixture.run_files(), vec!["b40.cpl.r.0001-01-02-00000.nc"]);
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Assert that a `Result` is an error matching a pattern.
///
/// ```
/// # use test_support::assert_error_matches;
/// let result: Result<(), std::io::ErrorKind> = Err(std::io::ErrorKind::NotFound);
/// assert_error_matches!(result, std::io::ErrorKind::NotFound);
/// ```
#[macro_export]
macro_rules! assert_error_matches {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err($pattern) => (),
            Err(other) => panic!(
                "expected error matching {}, got {:?}",
                stringify!($pattern),
                other
            ),
            Ok(_) => panic!("expected error matching {}, got Ok", stringify!($pattern)),
        }
    };
}

/// A temporary directory removed when dropped.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temporary directory"),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
        FileTree::write(&self.path().join(relative), contents)
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Helpers for writing and inspecting directory trees.
pub struct FileTree;

impl FileTree {
    /// Writes `contents` to `path`, creating parent directories.
    pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(path, contents).expect("write fixture file");
        path.to_path_buf()
    }

    /// Sorted names of the regular files directly inside `dir`.
    ///
    /// A missing directory has no files.
    pub fn file_names(dir: &Path) -> Vec<String> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.expect("directory entry"))
            .filter(|entry| entry.file_type().expect("file type").is_file())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Sorted paths of every regular file below `root`, relative to it.
    pub fn relative_files(root: &Path) -> Vec<PathBuf> {
        fn visit(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = fs::read_dir(dir) else {
                return;
            };
            for entry in entries {
                let entry = entry.expect("directory entry");
                let file_type = entry.file_type().expect("file type");
                if file_type.is_dir() {
                    visit(root, &entry.path(), out);
                } else if file_type.is_file() {
                    let path = entry.path();
                    out.push(path.strip_prefix(root).expect("below root").to_path_buf());
                }
            }
        }
        let mut files = Vec::new();
        visit(root, root, &mut files);
        files.sort();
        files
    }
}

/// A case root, run directory, and archive root inside one temporary
/// directory.
///
/// The archive root is not created; short-term archiving creates it.
pub struct CaseFixture {
    dir: TestDir,
    case_name: String,
}

impl CaseFixture {
    /// Lays out `caseroot/` and `run/` for `case_name`.
    pub fn new(case_name: &str) -> Self {
        let fixture = Self {
            dir: TestDir::new(),
            case_name: case_name.to_owned(),
        };
        fs::create_dir_all(fixture.caseroot()).expect("create caseroot");
        fs::create_dir_all(fixture.rundir()).expect("create rundir");
        fixture
    }

    /// Case name.
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Temporary directory holding everything.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Case root holding the configuration files and `CaseStatus`.
    pub fn caseroot(&self) -> PathBuf {
        self.path().join("caseroot")
    }

    /// Run directory.
    pub fn rundir(&self) -> PathBuf {
        self.path().join("run")
    }

    /// Short-term archive root.
    pub fn archive_root(&self) -> PathBuf {
        self.path().join("archive")
    }

    /// Creates a file in the run directory whose content is its own name.
    pub fn touch_run(&self, name: &str) -> PathBuf {
        FileTree::write(&self.rundir().join(name), name)
    }

    /// Sorted file names in the run directory.
    pub fn run_files(&self) -> Vec<String> {
        FileTree::file_names(&self.rundir())
    }

    /// Sorted file names in `relative` below the archive root.
    pub fn archive_files(&self, relative: impl AsRef<Path>) -> Vec<String> {
        FileTree::file_names(&self.archive_root().join(relative))
    }

    /// Writes `env_case.toml` with `CASE`, `RUNDIR`, and `DOUT_S_ROOT`
    /// pointing into the fixture, followed by `extra` string variables.
    pub fn write_env_case(&self, extra: &[(&str, &str)]) -> PathBuf {
        let mut text = String::new();
        let _ = writeln!(text, "CASE = {}", toml_string(&self.case_name));
        let _ = writeln!(
            text,
            "RUNDIR = {}",
            toml_string(&self.rundir().to_string_lossy())
        );
        let _ = writeln!(
            text,
            "DOUT_S_ROOT = {}",
            toml_string(&self.archive_root().to_string_lossy())
        );
        for (name, value) in extra {
            let _ = writeln!(text, "{name} = {}", toml_string(value));
        }
        FileTree::write(&self.caseroot().join("env_case.toml"), text)
    }

    /// Writes `env_archive.toml` verbatim.
    pub fn write_env_archive(&self, toml: &str) -> PathBuf {
        FileTree::write(&self.caseroot().join("env_archive.toml"), toml)
    }

    /// Replaces `CaseStatus` with `lines`.
    pub fn write_status(&self, lines: &[&str]) -> PathBuf {
        let mut text = String::new();
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        FileTree::write(&self.caseroot().join("CaseStatus"), text)
    }

    /// Current `CaseStatus` contents, empty when absent.
    pub fn status_text(&self) -> String {
        fs::read_to_string(self.caseroot().join("CaseStatus")).unwrap_or_default()
    }
}

/// Quotes `value` as a TOML basic string.
pub fn toml_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_lays_out_case_and_run_directories() {
        let fixture = CaseFixture::new("b40");
        assert!(fixture.caseroot().is_dir());
        assert!(fixture.rundir().is_dir());
        assert!(!fixture.archive_root().exists());
        assert!(fixture.archive_files("rest").is_empty());
    }

    #[test]
    fn env_case_quotes_values() {
        let fixture = CaseFixture::new("b40");
        let path = fixture.write_env_case(&[("DOUT_L_MODE", "copy_dirs_local")]);
        let text = fs::read_to_string(path).expect("read");
        assert!(text.starts_with("CASE = \"b40\"\n"));
        assert!(text.contains("DOUT_L_MODE = \"copy_dirs_local\"\n"));
    }

    #[test]
    fn toml_strings_escape_quotes_and_backslashes() {
        assert_eq!(toml_string(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn relative_files_recurse_in_sorted_order() {
        let dir = TestDir::new();
        dir.write("b/two.nc", "2");
        dir.write("a/one.nc", "1");
        assert_eq!(
            FileTree::relative_files(dir.path()),
            vec![PathBuf::from("a/one.nc"), PathBuf::from("b/two.nc")]
        );
    }
}
