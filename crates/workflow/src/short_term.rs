use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use case::{
    ArchiveSpec, CaseConfig, CaseStatus, CaseValues, ST_ARCHIVE_COMPLETED, ST_ARCHIVE_STARTING,
};
use engine::{
    ArchiveContext, NcdumpInspector, RestartInspector, ShortTermArchiver, discover_datenames,
    undo_archive, write_input_listing, write_output_listing,
};
use relocate::RelocationReport;

use crate::error::ArchiveError;

/// What `st-archive` was asked to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShortTermMode {
    /// Archive every checkpoint in the run directory.
    #[default]
    Archive,
    /// Print the archive specification as it applies to this case.
    InputListing,
    /// Print every file already in the short-term archive.
    OutputListing,
    /// Move archived files back into the run directory.
    Undo,
}

/// Result of a successful short-term command.
#[derive(Debug)]
pub enum ShortTermOutcome {
    /// The archive specification was listed.
    InputListed,
    /// The archive tree was listed.
    OutputListed {
        /// Number of files printed.
        files: usize,
    },
    /// Checkpoints were archived.
    Archived {
        /// Number of checkpoints processed.
        checkpoints: usize,
        /// Per-file outcome; contains no failures.
        report: RelocationReport,
    },
    /// Archived files were restored.
    Restored {
        /// Per-file outcome; contains no failures.
        report: RelocationReport,
    },
}

/// What [`ShortTermArchive::check_run`] found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunCheck {
    /// Short-term archive root, created if it was missing.
    pub archive_root: PathBuf,
    /// Whether the model run finished successfully.
    pub run_complete: bool,
}

/// The `st-archive` command for one case.
pub struct ShortTermArchive {
    caseroot: PathBuf,
    config: CaseConfig,
    spec: ArchiveSpec,
    inspector: Box<dyn RestartInspector>,
}

impl ShortTermArchive {
    /// Loads `env_case.toml` and `env_archive.toml` from `caseroot`.
    pub fn load(caseroot: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let caseroot = caseroot.into();
        let config = CaseConfig::load(&caseroot)?;
        let spec = ArchiveSpec::load(&caseroot)?;
        Ok(Self::from_parts(caseroot, config, spec))
    }

    /// Uses an already loaded configuration and specification.
    pub fn from_parts(caseroot: impl Into<PathBuf>, config: CaseConfig, spec: ArchiveSpec) -> Self {
        Self {
            caseroot: caseroot.into(),
            config,
            spec,
            inspector: Box::new(NcdumpInspector::new()),
        }
    }

    /// Reads restart history variables through `inspector` instead of
    /// `ncdump`.
    #[must_use]
    pub fn with_inspector(mut self, inspector: impl RestartInspector + 'static) -> Self {
        self.inspector = Box::new(inspector);
        self
    }

    fn status(&self) -> CaseStatus {
        CaseStatus::in_caseroot(&self.caseroot)
    }

    /// Validates the archive root and reports whether the run finished.
    ///
    /// `DOUT_S_ROOT` must be set and is created when missing. A warning is
    /// logged when interim restart sets will be deleted because the run
    /// writes restarts more often than it stops.
    pub fn check_run(&self) -> Result<RunCheck, ArchiveError> {
        let archive_root = self.config.path("DOUT_S_ROOT").ok_or_else(|| {
            ArchiveError::configuration("DOUT_S_ROOT is required for short-term archiving")
        })?;
        if !archive_root.is_dir() {
            fs::create_dir_all(&archive_root)
                .map_err(|error| ArchiveError::io("create directory", &archive_root, error))?;
        }

        if !self.config.flag("DOUT_S_SAVE_INTERIM_RESTART_FILES")? {
            let rest_n = self.config.integer("REST_N")?;
            let stop_n = self.config.integer("STOP_N")?;
            if let (Some(rest_n), Some(stop_n)) = (rest_n, stop_n)
                && rest_n < stop_n
            {
                tracing::warn!(
                    target: "archive::restart",
                    "restart files from the end of the run will be saved; interim restart files will be deleted"
                );
            }
        }

        let run_complete = self.status().run_successful()?;
        Ok(RunCheck {
            archive_root,
            run_complete,
        })
    }

    /// Runs `mode`, writing listings to `out`.
    pub fn run(&self, mode: ShortTermMode, out: &mut dyn Write) -> Result<ShortTermOutcome, ArchiveError> {
        let check = self.check_run()?;
        match mode {
            ShortTermMode::InputListing => {
                let context = ArchiveContext::from_case(&self.config, &self.spec)?;
                write_input_listing(out, &self.spec, &context).map_err(ArchiveError::Output)?;
                Ok(ShortTermOutcome::InputListed)
            }
            ShortTermMode::OutputListing => {
                require_complete_run(&check, "output listing")?;
                let files = write_output_listing(out, &check.archive_root)?;
                Ok(ShortTermOutcome::OutputListed { files })
            }
            ShortTermMode::Undo => {
                let context = ArchiveContext::from_case(&self.config, &self.spec)?;
                let report = undo_archive(&context)?;
                if !report.is_success() {
                    return Err(ArchiveError::PartialRelocation {
                        phase: "undo".to_owned(),
                        report,
                    });
                }
                Ok(ShortTermOutcome::Restored { report })
            }
            ShortTermMode::Archive => {
                require_complete_run(&check, "short term archiving")?;
                self.archive()
            }
        }
    }

    fn archive(&self) -> Result<ShortTermOutcome, ArchiveError> {
        let context = ArchiveContext::from_case(&self.config, &self.spec)?;
        let status = self.status();
        status.append(ST_ARCHIVE_STARTING)?;

        let restarts = discover_datenames(context.rundir(), context.case_name())?;
        tracing::info!(
            target: "archive::restart",
            "archiving {} checkpoint(s) of {}",
            restarts.len(),
            context.case_name()
        );
        let report = ShortTermArchiver::new(&self.spec, &context, self.inspector.as_ref())
            .archive(&restarts)?;

        if !report.is_success() {
            return Err(ArchiveError::PartialRelocation {
                phase: "short term archiving".to_owned(),
                report,
            });
        }
        status.append(ST_ARCHIVE_COMPLETED)?;
        Ok(ShortTermOutcome::Archived {
            checkpoints: restarts.len(),
            report,
        })
    }

    /// Case root this command operates on.
    #[must_use]
    pub fn caseroot(&self) -> &Path {
        &self.caseroot
    }
}

fn require_complete_run(check: &RunCheck, what: &str) -> Result<(), ArchiveError> {
    if check.run_complete {
        Ok(())
    } else {
        Err(ArchiveError::precondition(format!(
            "{what} not performed: the run is not complete (no \"{}\" in CaseStatus)",
            case::RUN_SUCCESSFUL
        )))
    }
}
