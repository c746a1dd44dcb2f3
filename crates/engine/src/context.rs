use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use case::{ArchiveSpec, CaseValues, RESTART_SUBDIR};

use crate::error::ShortTermResult;

/// Component always archived, whatever the compset lists.
pub const COUPLER: &str = "cpl";

/// Case metadata the archive process reads.
///
/// Built once per invocation from the case variables; the archive process
/// never consults the variable table directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveContext {
    case_name: String,
    rundir: PathBuf,
    archive_root: PathBuf,
    components: Vec<String>,
    save_interim_restarts: bool,
    instances: BTreeMap<String, usize>,
}

impl ArchiveContext {
    /// Creates a context with the coupler as the only active component.
    pub fn new(
        case_name: impl Into<String>,
        rundir: impl Into<PathBuf>,
        archive_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            rundir: rundir.into(),
            archive_root: archive_root.into(),
            components: vec![COUPLER.to_owned()],
            save_interim_restarts: false,
            instances: BTreeMap::new(),
        }
    }

    /// Reads `CASE`, `RUNDIR`, `DOUT_S_ROOT`, `COMPSET_COMPONENTS`,
    /// `DOUT_S_SAVE_INTERIM_RESTART_FILES`, and `NINST_<ROOTDIR>` for every
    /// root directory the archive specification names.
    pub fn from_case(case: &impl CaseValues, spec: &ArchiveSpec) -> ShortTermResult<Self> {
        let mut context = Self::new(
            case.require_text("CASE")?,
            case.require_path("RUNDIR")?,
            case.require_path("DOUT_S_ROOT")?,
        )
        .with_components(case.list("COMPSET_COMPONENTS"))
        .save_interim_restarts(case.flag("DOUT_S_SAVE_INTERIM_RESTART_FILES")?);

        for component in spec.components() {
            let rootdir = component.rootdir();
            let name = format!("NINST_{}", rootdir.to_ascii_uppercase());
            if let Some(count) = case.integer(&name)? {
                context = context.with_instances(rootdir, usize::try_from(count).unwrap_or(1));
            }
        }
        Ok(context)
    }

    /// Adds active components. The coupler stays active.
    #[must_use]
    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for component in components {
            let component = component.into();
            if !self.components.contains(&component) {
                self.components.push(component);
            }
        }
        self
    }

    /// Sets whether intermediate restart sets are archived or deleted.
    #[must_use]
    pub fn save_interim_restarts(mut self, save: bool) -> Self {
        self.save_interim_restarts = save;
        self
    }

    /// Sets the instance count for a component root directory.
    #[must_use]
    pub fn with_instances(mut self, rootdir: impl Into<String>, count: usize) -> Self {
        self.instances.insert(rootdir.into(), count.max(1));
        self
    }

    /// Case name used as the file-name prefix.
    #[must_use]
    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    /// Run directory holding model output.
    #[must_use]
    pub fn rundir(&self) -> &Path {
        &self.rundir
    }

    /// Short-term archive root (`DOUT_S_ROOT`).
    #[must_use]
    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    /// Active component names, coupler included.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether `component` takes part in this case.
    #[must_use]
    pub fn is_active(&self, component: &str) -> bool {
        self.components.iter().any(|name| name == component)
    }

    /// Whether intermediate restart sets are archived rather than deleted.
    #[must_use]
    pub const fn retains_interim_restarts(&self) -> bool {
        self.save_interim_restarts
    }

    /// Instance count for `rootdir`, 1 when not configured.
    #[must_use]
    pub fn instances(&self, rootdir: &str) -> usize {
        self.instances.get(rootdir).copied().unwrap_or(1)
    }

    /// Per-instance file-name suffixes for `rootdir`.
    ///
    /// A single instance has an empty suffix; ensembles use `_0000`, `_0001`,
    /// and so on.
    #[must_use]
    pub fn instance_suffixes(&self, rootdir: &str) -> Vec<String> {
        let count = self.instances(rootdir);
        if count > 1 {
            (0..count).map(|index| format!("_{index:04}")).collect()
        } else {
            vec![String::new()]
        }
    }

    /// Destination for non-restart files of `rootdir`.
    #[must_use]
    pub fn category_dir(&self, rootdir: &str, subdir: &str) -> PathBuf {
        self.archive_root.join(rootdir).join(subdir)
    }

    /// Destination for the restart set of `datename`.
    #[must_use]
    pub fn restart_dir(&self, datename: &str) -> PathBuf {
        self.archive_root.join(RESTART_SUBDIR).join(datename)
    }
}
