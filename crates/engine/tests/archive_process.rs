//! Short-term archive processing against a run directory on disk.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use case::{ArchiveSpec, ComponentSpec, FileExtensionRule};
use engine::{
    ArchiveContext, RestartInspector, ShortTermArchiver, discover_datenames,
};
use relocate::Operation;
use test_support::{CaseFixture, FileTree};

/// Answers restart-variable queries from a table keyed by restart file name.
#[derive(Default)]
struct TableInspector {
    entries: BTreeMap<String, Vec<String>>,
    queried: RefCell<Vec<PathBuf>>,
}

impl TableInspector {
    fn with(mut self, restart: &str, files: &[&str]) -> Self {
        self.entries.insert(
            restart.to_owned(),
            files.iter().map(|name| (*name).to_owned()).collect(),
        );
        self
    }
}

impl RestartInspector for TableInspector {
    fn auxiliary_files(&self, restart: &Path, _varname: &str) -> io::Result<Vec<String>> {
        self.queried.borrow_mut().push(restart.to_path_buf());
        let name = restart
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        Ok(self.entries.get(name).cloned().unwrap_or_default())
    }
}

fn cam_spec() -> ArchiveSpec {
    ArchiveSpec::from_components(vec![
        ComponentSpec::new("cam", "atm")
            .with_rule(FileExtensionRule::new(r"\.h0\.", "hist", false))
            .with_rule(FileExtensionRule::new(r"\.h1\.", "hist", true))
            .with_rule(FileExtensionRule::new(r"\.log\.", "logs", false))
            .with_rule(FileExtensionRule::new(r"\.r\.", "rest", false))
            .with_pointer_template("casename.cam.r.datename.nc"),
        ComponentSpec::new("cpl", "cpl").with_rule(FileExtensionRule::new(r"\.r\.", "rest", false)),
        ComponentSpec::new("clm", "lnd").with_rule(FileExtensionRule::new(r"\.h0\.", "hist", false)),
    ])
    .expect("spec")
}

fn context(fixture: &CaseFixture, retain: bool) -> ArchiveContext {
    ArchiveContext::new(fixture.case_name(), fixture.rundir(), fixture.archive_root())
        .with_components(["cam"])
        .save_interim_restarts(retain)
}

fn two_checkpoints(fixture: &CaseFixture) {
    for name in [
        "case.cpl.r.2001-01-01.nc",
        "case.cpl.r.2001-01-02.nc",
        "case.cam.r.2001-01-01.nc",
        "case.cam.r.2001-01-02.nc",
        "rpointer.atm",
        "rpointer.drv",
    ] {
        fixture.touch_run(name);
    }
}

#[test]
fn intermediate_restarts_move_and_most_recent_restarts_copy() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    let spec = cam_spec();
    let context = context(&fixture, true);
    let inspector = TableInspector::default();

    let restarts = discover_datenames(&fixture.rundir(), "case").expect("discover");
    assert_eq!(restarts.datenames(), ["2001-01-01", "2001-01-02"]);

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .archive(&restarts)
        .expect("archive");
    assert!(report.is_success(), "{}", report.summary());

    assert_eq!(
        fixture.archive_files("rest/2001-01-01"),
        ["case.cam.r.2001-01-01.nc", "case.cpl.r.2001-01-01.nc", "rpointer.atm"]
    );
    assert_eq!(
        fs::read_to_string(fixture.archive_root().join("rest/2001-01-01/rpointer.atm")).unwrap(),
        "case.cam.r.2001-01-01.nc\n"
    );

    assert_eq!(
        fixture.archive_files("rest/2001-01-02"),
        [
            "case.cam.r.2001-01-02.nc",
            "case.cpl.r.2001-01-02.nc",
            "rpointer.atm",
            "rpointer.drv"
        ]
    );
    assert_eq!(
        fs::read_to_string(fixture.archive_root().join("rest/2001-01-02/rpointer.atm")).unwrap(),
        "rpointer.atm"
    );

    assert_eq!(
        fixture.run_files(),
        [
            "case.cam.r.2001-01-02.nc",
            "case.cpl.r.2001-01-02.nc",
            "rpointer.atm",
            "rpointer.drv"
        ]
    );
}

#[test]
fn intermediate_restarts_are_deleted_without_retention() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    let spec = cam_spec();
    let context = context(&fixture, false);
    let inspector = TableInspector::default();

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("2001-01-01", false)
        .expect("process");

    assert!(report.is_success());
    assert_eq!(report.deleted(), 2);
    assert!(fixture.archive_files("rest/2001-01-01").is_empty());
    assert!(!fixture.rundir().join("case.cam.r.2001-01-01.nc").exists());
    assert!(!fixture.rundir().join("case.cpl.r.2001-01-01.nc").exists());
    assert!(fixture.rundir().join("case.cam.r.2001-01-02.nc").exists());
}

#[test]
fn deleting_an_intermediate_checkpoint_spares_other_alternatives() {
    let fixture = CaseFixture::new("case");
    for name in [
        "case.cam.r.2001-01-01.nc",
        "case.cam.r.2001-01-02.nc",
        "case.cam.rs.2001-01-02.nc",
        "other.rs.junk",
    ] {
        fixture.touch_run(name);
    }
    let spec = ArchiveSpec::from_components(vec![ComponentSpec::new("cam", "atm").with_rule(
        FileExtensionRule::new(r"\.r\.|\.rs\.", "rest", false),
    )])
    .expect("spec");
    let context = context(&fixture, false);
    let inspector = TableInspector::default();

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("2001-01-01", false)
        .expect("process");

    assert!(report.is_success());
    assert_eq!(report.deleted(), 1);
    assert_eq!(
        fixture.run_files(),
        ["case.cam.r.2001-01-02.nc", "case.cam.rs.2001-01-02.nc", "other.rs.junk"]
    );
}

#[test]
fn keep_last_leaves_newest_history_file_in_run_directory() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    for name in [
        "case.cam.h0.0001-01.nc",
        "case.cam.h0.0001-02.nc",
        "case.cam.h1.0001-01-01.nc",
        "case.cam.h1.0001-01-02.nc",
        "case.cam.h1.0001-01-03.nc",
        "atm.log.170101-000000",
        "case.clm.h0.0001-01.nc",
    ] {
        fixture.touch_run(name);
    }
    let spec = cam_spec();
    let context = context(&fixture, true);
    let inspector = TableInspector::default();

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("2001-01-02", true)
        .expect("process");
    assert!(report.is_success(), "{}", report.summary());

    assert_eq!(
        fixture.archive_files("atm/hist"),
        [
            "case.cam.h0.0001-01.nc",
            "case.cam.h0.0001-02.nc",
            "case.cam.h1.0001-01-01.nc",
            "case.cam.h1.0001-01-02.nc",
            "case.cam.h1.0001-01-03.nc",
        ]
    );
    assert_eq!(fixture.archive_files("atm/logs"), ["atm.log.170101-000000"]);

    let run = fixture.run_files();
    assert!(run.contains(&"case.cam.h1.0001-01-03.nc".to_owned()));
    assert!(!run.contains(&"case.cam.h1.0001-01-02.nc".to_owned()));
    assert!(!run.contains(&"case.cam.h0.0001-02.nc".to_owned()));
    assert!(!run.contains(&"atm.log.170101-000000".to_owned()));

    // clm is not part of this case
    assert!(run.contains(&"case.clm.h0.0001-01.nc".to_owned()));
    assert!(fixture.archive_files("lnd/hist").is_empty());
}

#[test]
fn reprocessing_a_checkpoint_is_idempotent() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    let spec = cam_spec();
    let context = context(&fixture, true);
    let inspector = TableInspector::default();
    let archiver = ShortTermArchiver::new(&spec, &context, &inspector);

    for _ in 0..2 {
        let report = archiver.process("2001-01-01", false).expect("process");
        assert!(report.is_success(), "{}", report.summary());
        let report = archiver.process("2001-01-02", true).expect("process");
        assert!(report.is_success(), "{}", report.summary());
    }

    let pointer = fs::read_to_string(fixture.archive_root().join("rest/2001-01-01/rpointer.atm"))
        .expect("pointer");
    assert_eq!(pointer.lines().count(), 1);
    assert_eq!(
        fixture.archive_files("rest/2001-01-01"),
        ["case.cam.r.2001-01-01.nc", "case.cpl.r.2001-01-01.nc", "rpointer.atm"]
    );
}

#[test]
fn each_instance_gets_its_own_pointer_file() {
    let fixture = CaseFixture::new("case");
    for name in [
        "case.cpl.r.0001-01-06-00000.nc",
        "case.cam_0000.r.0001-01-06-00000.nc",
        "case.cam_0001.r.0001-01-06-00000.nc",
    ] {
        fixture.touch_run(name);
    }
    let spec = cam_spec();
    let context = context(&fixture, true).with_instances("atm", 2);
    let inspector = TableInspector::default();

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("0001-01-06-00000", false)
        .expect("process");
    assert!(report.is_success(), "{}", report.summary());

    assert_eq!(
        fixture.archive_files("rest/0001-01-06-00000"),
        [
            "case.cam_0000.r.0001-01-06-00000.nc",
            "case.cam_0001.r.0001-01-06-00000.nc",
            "case.cpl.r.0001-01-06-00000.nc",
            "rpointer.atm_0000",
            "rpointer.atm_0001",
        ]
    );
}

#[test]
fn auxiliary_history_files_follow_their_restart() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    fixture.touch_run("case.cam.h0.0001-01.nc");
    let spec = ArchiveSpec::from_components(vec![
        ComponentSpec::new("cam", "atm")
            .with_rule(FileExtensionRule::new(r"\.h0\.", "hist", false))
            .with_rule(FileExtensionRule::new(r"\.r\.", "rest", false))
            .with_restart_varname("nhfil"),
    ])
    .expect("spec");
    let context = context(&fixture, true);
    let inspector = TableInspector::default().with(
        "case.cam.r.2001-01-01.nc",
        &["case.cam.h0.0001-01.nc", "case.cam.h0.0009-01.nc"],
    );

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("2001-01-01", false)
        .expect("process");

    assert_eq!(
        inspector.queried.borrow().as_slice(),
        [fixture.archive_root().join("rest/2001-01-01/case.cam.r.2001-01-01.nc")]
    );
    // found in the history archive after the history pass moved it
    assert!(
        fixture
            .archive_root()
            .join("rest/2001-01-01/case.cam.h0.0001-01.nc")
            .exists()
    );
    assert!(
        fixture
            .archive_root()
            .join("atm/hist/case.cam.h0.0001-01.nc")
            .exists()
    );

    assert_eq!(report.failures().len(), 1);
    let failure = &report.failures()[0];
    assert_eq!(failure.action(), Operation::Copy);
    assert_eq!(failure.io_error().kind(), io::ErrorKind::NotFound);
    assert!(failure.path().ends_with("case.cam.h0.0009-01.nc"));
}

#[test]
fn a_failed_move_withholds_the_pointer_but_not_sibling_files() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    let spec = cam_spec();
    let context = context(&fixture, true);
    let inspector = TableInspector::default();

    // a directory where the restart file should land makes the move fail
    fs::create_dir_all(
        fixture
            .archive_root()
            .join("rest/2001-01-01/case.cam.r.2001-01-01.nc/blocker"),
    )
    .expect("blocker");

    let report = ShortTermArchiver::new(&spec, &context, &inspector)
        .process("2001-01-01", false)
        .expect("process");

    assert_eq!(report.failures().len(), 1);
    assert!(report.summary().starts_with("1 of 2 file operations failed"));
    assert!(fixture.rundir().join("case.cam.r.2001-01-01.nc").exists());
    assert!(!fixture.archive_root().join("rest/2001-01-01/rpointer.atm").exists());
    assert!(
        fixture
            .archive_root()
            .join("rest/2001-01-01/case.cpl.r.2001-01-01.nc")
            .is_file()
    );
}

#[test]
fn archive_tree_matches_expected_layout() {
    let fixture = CaseFixture::new("case");
    two_checkpoints(&fixture);
    fixture.touch_run("case.cam.h0.0001-01.nc");
    let spec = cam_spec();
    let context = context(&fixture, true);
    let inspector = TableInspector::default();

    let restarts = discover_datenames(&fixture.rundir(), "case").expect("discover");
    ShortTermArchiver::new(&spec, &context, &inspector)
        .archive(&restarts)
        .expect("archive");

    assert_eq!(
        FileTree::relative_files(&fixture.archive_root()),
        [
            "atm/hist/case.cam.h0.0001-01.nc",
            "rest/2001-01-01/case.cam.r.2001-01-01.nc",
            "rest/2001-01-01/case.cpl.r.2001-01-01.nc",
            "rest/2001-01-01/rpointer.atm",
            "rest/2001-01-02/case.cam.r.2001-01-02.nc",
            "rest/2001-01-02/case.cpl.r.2001-01-02.nc",
            "rest/2001-01-02/rpointer.atm",
            "rest/2001-01-02/rpointer.drv",
        ]
        .map(PathBuf::from)
    );
}
