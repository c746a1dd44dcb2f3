//! Archive specification provider.
//!
//! The specification lists, per model component, the file-extension rules
//! that decide where run-directory files go in the short-term archive. It is
//! read from `<caseroot>/env_archive.toml`:
//!
//! ```toml
//! [[component]]
//! name = "cam"
//! rootdir = "atm"
//! rpointer_content = "casename.cam.r.datename.nc"
//! restart_history_varname = "nhfil"
//!
//! [[component.file_extension]]
//! regex_suffix = "\\.h0\\..*\\.nc$"
//! subdir = "hist"
//! keep_last_in_rundir = false
//! ```
//!
//! Every suffix is compiled once at load time so a malformed rule fails the
//! invocation before any file is touched.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{CaseError, CaseResult};

/// File name of the archive specification inside a case root.
pub const ENV_ARCHIVE_FILE: &str = "env_archive.toml";

/// Subdirectory marker identifying restart rules.
pub const RESTART_SUBDIR: &str = "rest";

/// Subdirectory used for log files, which are named after the component class.
pub const LOGS_SUBDIR: &str = "logs";

/// Restart variable name meaning "no auxiliary files".
pub const UNSET_VARNAME: &str = "unset";

/// One file-name rule of a component.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileExtensionRule {
    regex_suffix: String,
    subdir: String,
    #[serde(default)]
    keep_last_in_rundir: bool,
}

impl FileExtensionRule {
    /// Creates a rule.
    pub fn new(
        regex_suffix: impl Into<String>,
        subdir: impl Into<String>,
        keep_last_in_rundir: bool,
    ) -> Self {
        Self {
            regex_suffix: regex_suffix.into(),
            subdir: subdir.into(),
            keep_last_in_rundir,
        }
    }

    /// Regular-expression fragment matched after the component prefix.
    #[must_use]
    pub fn regex_suffix(&self) -> &str {
        &self.regex_suffix
    }

    /// Archive subdirectory receiving matching files.
    #[must_use]
    pub fn subdir(&self) -> &str {
        &self.subdir
    }

    /// Whether the newest match stays in the run directory.
    #[must_use]
    pub const fn keep_last_in_rundir(&self) -> bool {
        self.keep_last_in_rundir
    }

    /// Whether the rule describes restart files.
    #[must_use]
    pub fn is_restart(&self) -> bool {
        self.subdir == RESTART_SUBDIR
    }

    /// Whether the rule describes log files.
    #[must_use]
    pub fn is_logs(&self) -> bool {
        self.subdir == LOGS_SUBDIR
    }
}

/// Archiving rules for one model component.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    name: String,
    rootdir: String,
    #[serde(default)]
    rpointer_content: Option<String>,
    #[serde(default)]
    restart_history_varname: Option<String>,
    #[serde(rename = "file_extension", default)]
    rules: Vec<FileExtensionRule>,
}

impl ComponentSpec {
    /// Creates a component with no rules.
    pub fn new(name: impl Into<String>, rootdir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rootdir: rootdir.into(),
            rpointer_content: None,
            restart_history_varname: None,
            rules: Vec::new(),
        }
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: FileExtensionRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the pointer-file content template.
    #[must_use]
    pub fn with_pointer_template(mut self, template: impl Into<String>) -> Self {
        self.rpointer_content = Some(template.into());
        self
    }

    /// Sets the restart variable that lists auxiliary files.
    #[must_use]
    pub fn with_restart_varname(mut self, varname: impl Into<String>) -> Self {
        self.restart_history_varname = Some(varname.into());
        self
    }

    /// Component name as written in the archive specification.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component name with any bracketed qualifier (`cam[_0001]`) removed.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.name
            .split_once('[')
            .map_or(self.name.as_str(), |(base, _)| base)
    }

    /// Component class (`atm`, `lnd`, ...) naming the archive root directory.
    #[must_use]
    pub fn rootdir(&self) -> &str {
        &self.rootdir
    }

    /// Pointer-file content template, if the component writes pointer files.
    #[must_use]
    pub fn pointer_template(&self) -> Option<&str> {
        self.rpointer_content
            .as_deref()
            .filter(|template| !template.trim().is_empty())
    }

    /// Restart variable listing auxiliary files, unless unset.
    #[must_use]
    pub fn restart_varname(&self) -> Option<&str> {
        self.restart_history_varname
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != UNSET_VARNAME)
    }

    /// All rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[FileExtensionRule] {
        &self.rules
    }

    /// Rules targeting the restart subdirectory.
    pub fn restart_rules(&self) -> impl Iterator<Item = &FileExtensionRule> {
        self.rules.iter().filter(|rule| rule.is_restart())
    }

    /// Rules targeting any other subdirectory.
    pub fn archive_rules(&self) -> impl Iterator<Item = &FileExtensionRule> {
        self.rules.iter().filter(|rule| !rule.is_restart())
    }

    fn validate(&self) -> CaseResult<()> {
        for rule in &self.rules {
            Regex::new(rule.regex_suffix()).map_err(|source| CaseError::InvalidPattern {
                component: self.name.clone(),
                suffix: rule.regex_suffix().to_owned(),
                source,
            })?;
        }
        Ok(())
    }
}

/// The full archive specification.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ArchiveSpec {
    #[serde(rename = "component", default)]
    components: Vec<ComponentSpec>,
}

impl ArchiveSpec {
    /// Builds a specification from components, validating every rule.
    pub fn from_components(components: Vec<ComponentSpec>) -> CaseResult<Self> {
        let spec = Self { components };
        spec.validate()?;
        Ok(spec)
    }

    /// Loads `env_archive.toml` from the supplied case root.
    pub fn load(caseroot: &Path) -> CaseResult<Self> {
        Self::from_path(&caseroot.join(ENV_ARCHIVE_FILE))
    }

    /// Loads a specification from an explicit file.
    pub fn from_path(path: &Path) -> CaseResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Parses a specification. `origin` is only used in diagnostics.
    pub fn from_toml_str(text: &str, origin: &Path) -> CaseResult<Self> {
        let spec: Self = toml::from_str(text).map_err(|source| CaseError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        spec.validate()?;
        tracing::debug!(
            target: "archive::status",
            path = %origin.display(),
            components = spec.components.len(),
            "loaded archive specification"
        );
        Ok(spec)
    }

    /// Components in declaration order.
    #[must_use]
    pub fn components(&self) -> &[ComponentSpec] {
        &self.components
    }

    /// Looks up a component by its (unqualified) name.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentSpec> {
        self.components
            .iter()
            .find(|component| component.base_name() == name)
    }

    fn validate(&self) -> CaseResult<()> {
        self.components.iter().try_for_each(ComponentSpec::validate)
    }
}
