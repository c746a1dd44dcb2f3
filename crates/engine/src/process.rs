use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use case::{ArchiveSpec, ComponentSpec};
use relocate::{
    LocalDirectory, Operation, RelocationFailure, RelocationPolicy, RelocationReport, Relocator,
};

use crate::context::ArchiveContext;
use crate::datenames::RestartSet;
use crate::error::{ShortTermError, ShortTermResult};
use crate::pattern::FilePattern;
use crate::pointer::{pointer_file_name, render_pointer, run_pointer_files, write_pointer};
use crate::restart_vars::RestartInspector;

/// Relocates run-directory output into the short-term archive.
///
/// One call to [`process`](Self::process) handles a single checkpoint for
/// every component that is both active in the case and described by the
/// archive specification. Per-file failures are collected in the returned
/// [`RelocationReport`]; only problems that make the whole checkpoint
/// impossible (an unreadable run directory, an invalid pattern) abort.
pub struct ShortTermArchiver<'a> {
    spec: &'a ArchiveSpec,
    context: &'a ArchiveContext,
    inspector: &'a dyn RestartInspector,
}

impl<'a> ShortTermArchiver<'a> {
    /// Creates an archiver over a loaded specification and case context.
    pub fn new(
        spec: &'a ArchiveSpec,
        context: &'a ArchiveContext,
        inspector: &'a dyn RestartInspector,
    ) -> Self {
        Self {
            spec,
            context,
            inspector,
        }
    }

    /// Processes every checkpoint in discovery order, the last one flagged as
    /// most recent.
    pub fn archive(&self, restarts: &RestartSet) -> ShortTermResult<RelocationReport> {
        let mut report = RelocationReport::new();
        for (datename, most_recent) in restarts.checkpoints() {
            report.merge(self.process(datename, most_recent)?);
        }
        Ok(report)
    }

    /// Processes one checkpoint.
    pub fn process(&self, datename: &str, most_recent: bool) -> ShortTermResult<RelocationReport> {
        tracing::debug!(target: "archive::restart", %datename, most_recent, "archive process");
        let mut report = RelocationReport::new();
        for component in self.active_components() {
            tracing::info!(
                target: "archive::history",
                "doing short term archiving for {} ({})",
                component.name(),
                component.rootdir()
            );
            self.archive_categories(component, &mut report)?;
            self.archive_restarts(component, datename, most_recent, &mut report)?;
        }
        Ok(report)
    }

    fn active_components(&self) -> impl Iterator<Item = &'a ComponentSpec> {
        self.spec
            .components()
            .iter()
            .filter(|component| self.context.is_active(component.base_name()))
    }

    fn archive_categories(
        &self,
        component: &ComponentSpec,
        report: &mut RelocationReport,
    ) -> ShortTermResult<()> {
        let rundir = self.context.rundir();
        let instances = self.context.instance_suffixes(component.rootdir());

        for rule in component.archive_rules() {
            let destination =
                LocalDirectory::new(self.context.category_dir(component.rootdir(), rule.subdir()));
            let relocator = Relocator::new(&destination);

            for instance in &instances {
                let pattern =
                    FilePattern::for_category(self.context.case_name(), component, instance, rule)?;
                let files = pattern.matching_files(rundir)?;
                tracing::debug!(
                    target: "archive::history",
                    pattern = pattern.as_str(),
                    matches = files.len(),
                );
                let Some((newest, older)) = files.split_last() else {
                    continue;
                };

                if rule.keep_last_in_rundir() {
                    relocator.apply_all(
                        older.iter().map(|name| rundir.join(name)),
                        RelocationPolicy::Move,
                        report,
                    );
                    relocator.apply(&rundir.join(newest), RelocationPolicy::Copy, report);
                } else {
                    relocator.apply_all(
                        files.iter().map(|name| rundir.join(name)),
                        RelocationPolicy::Move,
                        report,
                    );
                }
            }
        }
        Ok(())
    }

    fn archive_restarts(
        &self,
        component: &ComponentSpec,
        datename: &str,
        most_recent: bool,
        report: &mut RelocationReport,
    ) -> ShortTermResult<()> {
        let rundir = self.context.rundir();
        let restart_dir = self.context.restart_dir(datename);
        fs::create_dir_all(&restart_dir)
            .map_err(|error| ShortTermError::io("create", &restart_dir, error))?;

        let policy = if most_recent {
            RelocationPolicy::Copy
        } else if self.context.retains_interim_restarts() {
            RelocationPolicy::Move
        } else {
            RelocationPolicy::Delete
        };
        let destination = LocalDirectory::new(&restart_dir);
        let relocator = Relocator::new(&destination);
        let mut archived = Vec::new();

        for instance in self.context.instance_suffixes(component.rootdir()) {
            let mut matched = 0_usize;
            let mut complete = true;
            for rule in component.restart_rules() {
                let pattern = FilePattern::for_restart(
                    self.context.case_name(),
                    component,
                    &instance,
                    rule,
                    datename,
                )?;
                for name in pattern.matching_files(rundir)? {
                    matched += 1;
                    if relocator.apply(&rundir.join(&name), policy, report) {
                        if policy != RelocationPolicy::Delete {
                            archived.push(restart_dir.join(&name));
                        }
                    } else {
                        complete = false;
                    }
                }
            }
            tracing::debug!(
                target: "archive::restart",
                component = component.name(),
                instance = instance.as_str(),
                %datename,
                matched,
                policy = policy.verb(),
            );

            if policy == RelocationPolicy::Move && matched > 0 && complete {
                self.write_instance_pointer(component, &instance, datename, &restart_dir, report);
            }
        }

        if most_recent && !archived.is_empty() {
            let pointers = run_pointer_files(rundir)
                .map_err(|error| ShortTermError::io("list", rundir, error))?;
            relocator.apply_all(pointers, RelocationPolicy::Copy, report);
        }

        if let Some(varname) = component.restart_varname()
            && !archived.is_empty()
        {
            self.collect_auxiliary_files(component, varname, &archived, &relocator, report);
        }
        Ok(())
    }

    fn write_instance_pointer(
        &self,
        component: &ComponentSpec,
        instance: &str,
        datename: &str,
        restart_dir: &Path,
        report: &mut RelocationReport,
    ) {
        let Some(template) = component.pointer_template() else {
            return;
        };
        let name = pointer_file_name(component.rootdir(), instance);
        let content = render_pointer(template, datename, self.context.case_name());
        if let Err(error) = write_pointer(restart_dir, &name, &content) {
            report.record_failure(RelocationFailure::new(
                Operation::Write,
                restart_dir.join(&name),
                error,
            ));
        }
    }

    fn collect_auxiliary_files(
        &self,
        component: &ComponentSpec,
        varname: &str,
        restarts: &[PathBuf],
        relocator: &Relocator<'_>,
        report: &mut RelocationReport,
    ) {
        let mut wanted: Vec<String> = Vec::new();
        for restart in restarts {
            match self.inspector.auxiliary_files(restart, varname) {
                Ok(names) => {
                    for name in names {
                        if !wanted.contains(&name) {
                            wanted.push(name);
                        }
                    }
                }
                Err(error) => {
                    report.record_failure(RelocationFailure::new(Operation::Inspect, restart, error));
                }
            }
        }

        let Some(restart_dir) = restarts.first().and_then(|path| path.parent()) else {
            return;
        };
        for name in wanted {
            if restart_dir.join(&name).exists() {
                continue;
            }
            match self.locate_auxiliary(component, &name) {
                Some(source) => {
                    tracing::debug!(
                        target: "archive::restart",
                        source = %source.display(),
                        "auxiliary restart file"
                    );
                    relocator.apply(&source, RelocationPolicy::Copy, report);
                }
                None => report.record_failure(RelocationFailure::new(
                    Operation::Copy,
                    self.context.rundir().join(&name),
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "auxiliary restart file is in neither the run directory nor the archive",
                    ),
                )),
            }
        }
    }

    fn locate_auxiliary(&self, component: &ComponentSpec, name: &str) -> Option<PathBuf> {
        let in_rundir = self.context.rundir().join(name);
        if in_rundir.is_file() {
            return Some(in_rundir);
        }
        component
            .archive_rules()
            .map(|rule| {
                self.context
                    .category_dir(component.rootdir(), rule.subdir())
                    .join(name)
            })
            .find(|candidate| candidate.is_file())
    }
}
