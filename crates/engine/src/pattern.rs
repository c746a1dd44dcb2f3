use std::fs;
use std::path::Path;

use case::{ComponentSpec, FileExtensionRule};
use regex::Regex;

use crate::error::{ShortTermError, ShortTermResult};

/// A compiled file-name rule for one component instance.
///
/// Patterns are anchored at the start of the file name only; whatever
/// follows the rule suffix (dates, `.nc`) is left unconstrained. The suffix
/// is grouped, so alternations in it stay behind the prefix.
#[derive(Clone, Debug)]
pub struct FilePattern {
    regex: Regex,
}

impl FilePattern {
    /// Pattern for history and log files.
    ///
    /// Logs are named after the component class (`atm.log...`); everything
    /// else carries the case and component names.
    pub fn for_category(
        case: &str,
        component: &ComponentSpec,
        instance: &str,
        rule: &FileExtensionRule,
    ) -> ShortTermResult<Self> {
        let prefix = if rule.is_logs() {
            regex::escape(component.rootdir())
        } else {
            format!(
                "{}\\.{}",
                regex::escape(case),
                regex::escape(component.base_name())
            )
        };
        Self::compile(format!(
            "^{prefix}{}(?:{})",
            regex::escape(instance),
            rule.regex_suffix()
        ))
    }

    /// Pattern for the restart files of one checkpoint.
    pub fn for_restart(
        case: &str,
        component: &ComponentSpec,
        instance: &str,
        rule: &FileExtensionRule,
        datename: &str,
    ) -> ShortTermResult<Self> {
        Self::compile(format!(
            "^{}\\.{}{}(?:{}){}",
            regex::escape(case),
            regex::escape(component.base_name()),
            regex::escape(instance),
            rule.regex_suffix(),
            regex::escape(datename)
        ))
    }

    fn compile(pattern: String) -> ShortTermResult<Self> {
        match Regex::new(&pattern) {
            Ok(regex) => Ok(Self { regex }),
            Err(source) => Err(ShortTermError::Pattern { pattern, source }),
        }
    }

    /// Pattern text after substitution.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether `file_name` matches.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

    /// Names of regular files in `dir` that match, sorted lexically.
    pub fn matching_files(&self, dir: &Path) -> ShortTermResult<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|error| ShortTermError::io("list", dir, error))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| ShortTermError::io("list", dir, error))?;
            let is_file = entry
                .file_type()
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string()
                && self.matches(&name)
            {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam() -> ComponentSpec {
        ComponentSpec::new("cam", "atm")
    }

    #[test]
    fn history_pattern_includes_case_and_component() {
        let rule = FileExtensionRule::new(r"\.h0\.", "hist", false);
        let pattern = FilePattern::for_category("b40.1850", &cam(), "", &rule).expect("pattern");
        assert!(pattern.matches("b40.1850.cam.h0.0001-01.nc"));
        assert!(!pattern.matches("b40X1850.cam.h0.0001-01.nc"));
        assert!(!pattern.matches("b40.1850.clm2.h0.0001-01.nc"));
        assert!(!pattern.matches("old.b40.1850.cam.h0.0001-01.nc"));
    }

    #[test]
    fn log_pattern_uses_component_class() {
        let rule = FileExtensionRule::new(r"\.log\.", "logs", false);
        let pattern = FilePattern::for_category("case", &cam(), "_0001", &rule).expect("pattern");
        assert!(pattern.matches("atm_0001.log.170101-120000"));
        assert!(!pattern.matches("atm_0002.log.170101-120000"));
    }

    #[test]
    fn bracketed_qualifier_is_stripped_from_component() {
        let component = ComponentSpec::new("cam[_0001]", "atm");
        let rule = FileExtensionRule::new(r"\.h0\.", "hist", false);
        let pattern = FilePattern::for_category("case", &component, "", &rule).expect("pattern");
        assert!(pattern.matches("case.cam.h0.0001-01.nc"));
    }

    #[test]
    fn restart_pattern_pins_the_datename() {
        let rule = FileExtensionRule::new(r"\.r\.", "rest", false);
        let pattern = FilePattern::for_restart("case", &cam(), "", &rule, "0001-01-02-00000")
            .expect("pattern");
        assert!(pattern.matches("case.cam.r.0001-01-02-00000.nc"));
        assert!(!pattern.matches("case.cam.r.0001-01-03-00000.nc"));
        assert!(!pattern.matches("case.cam.rs.0001-01-02-00000.nc"));
    }

    #[test]
    fn alternation_in_suffix_stays_anchored() {
        let rule = FileExtensionRule::new(r"\.r\.|\.rs\.", "rest", false);
        let history =
            FilePattern::for_category("case", &cam(), "", &rule).expect("category pattern");
        assert!(history.matches("case.cam.rs.2001-01-02.nc"));
        assert!(!history.matches("other.rs.junk"));

        let restart = FilePattern::for_restart("case", &cam(), "", &rule, "2001-01-01")
            .expect("restart pattern");
        assert!(restart.matches("case.cam.r.2001-01-01.nc"));
        assert!(restart.matches("case.cam.rs.2001-01-01.nc"));
        assert!(!restart.matches("case.cam.r.2001-01-02.nc"));
        assert!(!restart.matches("case.cam.rs.2001-01-02.nc"));
        assert!(!restart.matches("other.rs.junk"));
    }

    #[test]
    fn invalid_suffix_reports_the_pattern() {
        let rule = FileExtensionRule::new("(", "hist", false);
        let error = FilePattern::for_category("case", &cam(), "", &rule).expect_err("invalid");
        assert!(matches!(error, ShortTermError::Pattern { .. }));
    }

    #[test]
    fn matching_files_are_sorted_and_skip_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("case.cam.h0.0001-02.nc"), b"").expect("b");
        fs::write(temp.path().join("case.cam.h0.0001-01.nc"), b"").expect("a");
        fs::create_dir(temp.path().join("case.cam.h0.dir")).expect("dir");
        fs::write(temp.path().join("case.cam.h1.0001-01.nc"), b"").expect("other");

        let rule = FileExtensionRule::new(r"\.h0\.", "hist", false);
        let pattern = FilePattern::for_category("case", &cam(), "", &rule).expect("pattern");
        assert_eq!(
            pattern.matching_files(temp.path()).expect("list"),
            ["case.cam.h0.0001-01.nc", "case.cam.h0.0001-02.nc"]
        );
    }
}
