use std::path::Path;
use std::process::{Command, Output};

use case::{RUN_SUCCESSFUL, ST_ARCHIVE_COMPLETED};
use test_support::CaseFixture;

const ST_ARCHIVE: &str = env!("CARGO_BIN_EXE_st-archive");
const LT_ARCHIVE: &str = env!("CARGO_BIN_EXE_lt-archive");

fn binary_output(path: &str, args: &[&str]) -> Output {
    Command::new(path)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|error| panic!("failed to run {path}: {error}"))
}

fn in_case(path: &str, caseroot: &Path, args: &[&str]) -> Output {
    let caseroot = caseroot.to_string_lossy().into_owned();
    let mut full = vec!["--caseroot", caseroot.as_str()];
    full.extend_from_slice(args);
    binary_output(path, &full)
}

fn combined_utf8(output: &Output) -> String {
    let mut data = output.stdout.clone();
    data.extend_from_slice(&output.stderr);
    String::from_utf8(data).expect("binary output should be valid UTF-8")
}

#[test]
fn st_archive_help_lists_usage() {
    let output = binary_output(ST_ARCHIVE, &["--help"]);
    assert!(output.status.success(), "--help should succeed");
    assert!(output.stderr.is_empty(), "help output should not write to stderr");
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("st-archive"));
    assert!(stdout.contains("--output"));
}

#[test]
fn lt_archive_help_lists_usage() {
    let output = binary_output(LT_ARCHIVE, &["-h"]);
    assert!(output.status.success(), "-h should succeed");
    let stdout = String::from_utf8(output.stdout).expect("stdout is UTF-8");
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--dry-run"));
}

#[test]
fn conflicting_modes_exit_with_the_syntax_status() {
    let output = binary_output(ST_ARCHIVE, &["--input", "--output"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_utf8(&output).contains("--input"));
}

#[test]
fn missing_case_configuration_exits_with_the_configuration_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = in_case(LT_ARCHIVE, dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
    let combined = combined_utf8(&output);
    assert!(combined.contains("lt-archive: error:"), "{combined}");
    assert!(combined.contains("env_case.toml"), "{combined}");
}

#[test]
fn st_archive_moves_history_files_into_the_archive() {
    let fixture = CaseFixture::new("b40");
    fixture.write_env_case(&[("COMPSET_COMPONENTS", "cam")]);
    fixture.write_env_archive(
        r#"
[[component]]
name = "cam"
rootdir = "atm"

[[component.file_extension]]
regex_suffix = '\.h0\.'
subdir = "hist"

[[component]]
name = "cpl"
rootdir = "cpl"

[[component.file_extension]]
regex_suffix = '\.r\.'
subdir = "rest"
"#,
    );
    fixture.write_status(&[RUN_SUCCESSFUL]);
    fixture.touch_run("b40.cpl.r.0001-01-02-00000.nc");
    fixture.touch_run("b40.cam.h0.0001-01.nc");

    let output = in_case(ST_ARCHIVE, &fixture.caseroot(), &[]);

    assert!(output.status.success(), "{}", combined_utf8(&output));
    assert_eq!(fixture.archive_files("atm/hist"), ["b40.cam.h0.0001-01.nc"]);
    assert_eq!(fixture.run_files(), ["b40.cpl.r.0001-01-02-00000.nc"]);
    assert!(fixture.status_text().contains(ST_ARCHIVE_COMPLETED));
}
