//! `st-archive` against a case laid out on disk.

use std::path::PathBuf;

use case::{ArchiveSpec, CaseConfig, RUN_SUCCESSFUL, ST_ARCHIVE_COMPLETED, ST_ARCHIVE_STARTING};
use test_support::{CaseFixture, assert_error_matches};
use workflow::{ArchiveError, ExitCode, ShortTermArchive, ShortTermMode, ShortTermOutcome};

const ENV_ARCHIVE: &str = r#"
[[component]]
name = "cam"
rootdir = "atm"

[[component.file_extension]]
regex_suffix = '\.h0\.'
subdir = "hist"

[[component.file_extension]]
regex_suffix = '\.r\.'
subdir = "rest"

[[component]]
name = "cpl"
rootdir = "cpl"

[[component.file_extension]]
regex_suffix = '\.r\.'
subdir = "rest"
"#;

fn case_with_two_checkpoints() -> CaseFixture {
    let fixture = CaseFixture::new("b40");
    fixture.write_env_case(&[
        ("COMPSET_COMPONENTS", "cam"),
        ("DOUT_S_SAVE_INTERIM_RESTART_FILES", "TRUE"),
    ]);
    fixture.write_env_archive(ENV_ARCHIVE);
    for name in [
        "b40.cpl.r.0001-01-02-00000.nc",
        "b40.cpl.r.0001-01-03-00000.nc",
        "b40.cam.r.0001-01-02-00000.nc",
        "b40.cam.r.0001-01-03-00000.nc",
        "b40.cam.h0.0001-01.nc",
    ] {
        fixture.touch_run(name);
    }
    fixture
}

fn run(fixture: &CaseFixture, mode: ShortTermMode) -> (Result<ShortTermOutcome, ArchiveError>, String) {
    let mut out = Vec::new();
    let result = ShortTermArchive::load(fixture.caseroot())
        .expect("load case")
        .run(mode, &mut out);
    (result, String::from_utf8(out).expect("utf-8 listing"))
}

#[test]
fn archiving_requires_a_successful_run() {
    let fixture = case_with_two_checkpoints();

    let (result, _) = run(&fixture, ShortTermMode::Archive);

    assert_error_matches!(result, ArchiveError::PreconditionNotMet { .. });
    assert!(!fixture.status_text().contains(ST_ARCHIVE_STARTING));
    assert_eq!(fixture.run_files().len(), 5);
}

#[test]
fn archiving_relocates_files_and_marks_completion() {
    let fixture = case_with_two_checkpoints();
    fixture.write_status(&[RUN_SUCCESSFUL]);

    let (result, _) = run(&fixture, ShortTermMode::Archive);

    match result.expect("archive") {
        ShortTermOutcome::Archived { checkpoints, report } => {
            assert_eq!(checkpoints, 2);
            assert!(report.is_success());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(fixture.archive_files("atm/hist"), ["b40.cam.h0.0001-01.nc"]);
    assert_eq!(
        fixture.archive_files("rest/0001-01-02-00000"),
        ["b40.cam.r.0001-01-02-00000.nc", "b40.cpl.r.0001-01-02-00000.nc"]
    );
    assert_eq!(
        fixture.archive_files("rest/0001-01-03-00000"),
        ["b40.cam.r.0001-01-03-00000.nc", "b40.cpl.r.0001-01-03-00000.nc"]
    );
    assert_eq!(
        fixture.run_files(),
        ["b40.cam.r.0001-01-03-00000.nc", "b40.cpl.r.0001-01-03-00000.nc"]
    );

    let status = fixture.status_text();
    let started = status.find(ST_ARCHIVE_STARTING).expect("starting marker");
    let completed = status.find(ST_ARCHIVE_COMPLETED).expect("completed marker");
    assert!(started < completed);
}

#[test]
fn archiving_twice_leaves_the_same_tree() {
    let fixture = case_with_two_checkpoints();
    fixture.write_status(&[RUN_SUCCESSFUL]);

    run(&fixture, ShortTermMode::Archive).0.expect("first run");
    let first = test_support::FileTree::relative_files(&fixture.archive_root());
    run(&fixture, ShortTermMode::Archive).0.expect("second run");

    assert_eq!(test_support::FileTree::relative_files(&fixture.archive_root()), first);
}

#[test]
fn missing_coupler_restarts_abort_without_completion() {
    let fixture = CaseFixture::new("b40");
    fixture.write_env_case(&[]);
    fixture.write_env_archive(ENV_ARCHIVE);
    fixture.write_status(&[RUN_SUCCESSFUL]);
    fixture.touch_run("b40.cam.h0.0001-01.nc");

    let (result, _) = run(&fixture, ShortTermMode::Archive);

    let error = result.expect_err("no restarts");
    assert_eq!(error.exit_code(), ExitCode::NoRestartFiles);
    let status = fixture.status_text();
    assert!(status.contains(ST_ARCHIVE_STARTING));
    assert!(!status.contains(ST_ARCHIVE_COMPLETED));
    assert_eq!(fixture.run_files(), ["b40.cam.h0.0001-01.nc"]);
}

#[test]
fn run_check_creates_the_archive_root() {
    let fixture = case_with_two_checkpoints();
    assert!(!fixture.archive_root().exists());

    let check = ShortTermArchive::load(fixture.caseroot())
        .expect("load")
        .check_run()
        .expect("check");

    assert!(fixture.archive_root().is_dir());
    assert_eq!(check.archive_root, fixture.archive_root());
    assert!(!check.run_complete);
}

#[test]
fn run_check_requires_an_archive_root() {
    let fixture = CaseFixture::new("b40");
    let config = CaseConfig::new()
        .with("CASE", "b40")
        .with("RUNDIR", fixture.rundir())
        .with("DOUT_S_ROOT", "UNSET");
    let spec = ArchiveSpec::from_components(Vec::new()).expect("empty spec");

    let error = ShortTermArchive::from_parts(fixture.caseroot(), config, spec)
        .check_run()
        .expect_err("missing root");

    assert_eq!(error.exit_code(), ExitCode::Configuration);
    assert!(error.to_string().contains("DOUT_S_ROOT"));
}

#[test]
fn input_listing_describes_every_component() {
    let fixture = case_with_two_checkpoints();

    let (result, listing) = run(&fixture, ShortTermMode::InputListing);

    assert!(matches!(result.expect("listing"), ShortTermOutcome::InputListed));
    assert!(listing.contains("component name = cam\n"), "{listing}");
    assert!(listing.contains("component name = cpl\n"), "{listing}");
    let hist = fixture.archive_root().join("atm").join("hist");
    assert!(listing.contains(&format!("  subdir = {}\n", hist.display())), "{listing}");
}

#[test]
fn output_listing_needs_a_complete_run_and_lists_archived_files() {
    let fixture = case_with_two_checkpoints();

    let (result, _) = run(&fixture, ShortTermMode::OutputListing);
    assert_error_matches!(result, ArchiveError::PreconditionNotMet { .. });

    fixture.write_status(&[RUN_SUCCESSFUL]);
    run(&fixture, ShortTermMode::Archive).0.expect("archive");
    let (result, listing) = run(&fixture, ShortTermMode::OutputListing);

    match result.expect("listing") {
        ShortTermOutcome::OutputListed { files } => assert_eq!(files, 5),
        other => panic!("unexpected outcome: {other:?}"),
    }
    let hist: PathBuf = fixture.archive_root().join("atm/hist/b40.cam.h0.0001-01.nc");
    assert!(listing.lines().any(|line| line == hist.display().to_string()), "{listing}");
}

#[test]
fn undo_returns_moved_files_to_the_run_directory() {
    let fixture = case_with_two_checkpoints();
    fixture.write_status(&[RUN_SUCCESSFUL]);
    run(&fixture, ShortTermMode::Archive).0.expect("archive");

    let (result, _) = run(&fixture, ShortTermMode::Undo);

    assert!(matches!(result.expect("undo"), ShortTermOutcome::Restored { .. }));
    assert_eq!(
        fixture.run_files(),
        [
            "b40.cam.h0.0001-01.nc",
            "b40.cam.r.0001-01-02-00000.nc",
            "b40.cam.r.0001-01-03-00000.nc",
            "b40.cpl.r.0001-01-02-00000.nc",
            "b40.cpl.r.0001-01-03-00000.nc",
        ]
    );
}
