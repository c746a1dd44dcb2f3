//! Read-only access to case variables.
//!
//! Variables live in `<caseroot>/env_case.toml` as a flat table. Strings,
//! integers, booleans, and arrays of strings are accepted; the literal
//! `UNSET` and empty strings are treated as absent so a freshly created case
//! behaves the same as one that never mentioned the variable.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CaseError, CaseResult};

/// File name of the case variable table inside a case root.
pub const ENV_CASE_FILE: &str = "env_case.toml";

/// Placeholder value that marks a variable as not configured.
pub const UNSET: &str = "UNSET";

/// A single case variable value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseValue {
    /// Free-form text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Boolean flag.
    Bool(bool),
    /// Ordered list of words.
    List(Vec<String>),
}

impl CaseValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Bool(true) => "TRUE".to_owned(),
            Self::Bool(false) => "FALSE".to_owned(),
            Self::List(items) => items.join(","),
        }
    }

    fn is_unset(&self) -> bool {
        match self {
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed.is_empty() || trimmed == UNSET
            }
            Self::List(items) => items.is_empty(),
            Self::Integer(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for CaseValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for CaseValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for CaseValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for CaseValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&Path> for CaseValue {
    fn from(value: &Path) -> Self {
        Self::Text(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for CaseValue {
    fn from(value: PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

/// Read interface over case variables.
///
/// Only [`lookup`](Self::lookup) must be provided; the typed accessors apply
/// the shared `UNSET` and boolean conventions.
pub trait CaseValues {
    /// Returns the raw value stored under `name`.
    fn lookup(&self, name: &str) -> Option<&CaseValue>;

    /// Returns the value rendered as text, or `None` when absent or unset.
    fn text(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .filter(|value| !value.is_unset())
            .map(CaseValue::render)
    }

    /// Returns the value rendered as text, failing when absent or unset.
    fn require_text(&self, name: &str) -> CaseResult<String> {
        self.text(name).ok_or_else(|| CaseError::missing(name))
    }

    /// Returns the value as a filesystem path.
    fn path(&self, name: &str) -> Option<PathBuf> {
        self.text(name).map(PathBuf::from)
    }

    /// Returns the value as a filesystem path, failing when absent or unset.
    fn require_path(&self, name: &str) -> CaseResult<PathBuf> {
        self.require_text(name).map(PathBuf::from)
    }

    /// Returns the value as an integer.
    fn integer(&self, name: &str) -> CaseResult<Option<i64>> {
        match self.lookup(name) {
            None => Ok(None),
            Some(value) if value.is_unset() => Ok(None),
            Some(CaseValue::Integer(number)) => Ok(Some(*number)),
            Some(other) => {
                let rendered = other.render();
                rendered
                    .trim()
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| CaseError::InvalidVariable {
                        name: name.to_owned(),
                        value: rendered,
                        expected: "an integer",
                    })
            }
        }
    }

    /// Returns the value as a boolean. Absent and unset variables are `false`.
    fn flag(&self, name: &str) -> CaseResult<bool> {
        match self.lookup(name) {
            None => Ok(false),
            Some(value) if value.is_unset() => Ok(false),
            Some(CaseValue::Bool(flag)) => Ok(*flag),
            Some(other) => {
                let rendered = other.render();
                match rendered.trim().to_ascii_uppercase().as_str() {
                    "TRUE" | "T" | "YES" | "1" => Ok(true),
                    "FALSE" | "F" | "NO" | "0" => Ok(false),
                    _ => Err(CaseError::InvalidVariable {
                        name: name.to_owned(),
                        value: rendered,
                        expected: "TRUE or FALSE",
                    }),
                }
            }
        }
    }

    /// Returns the value as a list of words.
    ///
    /// Text values are split on commas and whitespace.
    fn list(&self, name: &str) -> Vec<String> {
        match self.lookup(name) {
            None => Vec::new(),
            Some(value) if value.is_unset() => Vec::new(),
            Some(CaseValue::List(items)) => items.clone(),
            Some(other) => other
                .render()
                .split(|ch: char| ch == ',' || ch.is_whitespace())
                .filter(|word| !word.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Case variables loaded from `env_case.toml` or assembled in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaseConfig {
    values: BTreeMap<String, CaseValue>,
}

impl CaseConfig {
    /// Creates an empty variable table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `env_case.toml` from the supplied case root.
    pub fn load(caseroot: &Path) -> CaseResult<Self> {
        Self::from_path(&caseroot.join(ENV_CASE_FILE))
    }

    /// Loads a variable table from an explicit file.
    pub fn from_path(path: &Path) -> CaseResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CaseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Parses a variable table. `origin` is only used in diagnostics.
    pub fn from_toml_str(text: &str, origin: &Path) -> CaseResult<Self> {
        let table: toml::Table = toml::from_str(text).map_err(|source| CaseError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut config = Self::new();
        for (name, value) in table {
            let converted = convert_value(&name, value)?;
            config.values.insert(name, converted);
        }
        tracing::debug!(
            target: "archive::status",
            path = %origin.display(),
            variables = config.values.len(),
            "loaded case variables"
        );
        Ok(config)
    }

    /// Stores or replaces a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<CaseValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<CaseValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Stores a list-valued variable.
    pub fn set_list<I, S>(&mut self, name: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.values.insert(name.into(), CaseValue::List(items));
    }

    /// Number of variables in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Reports whether the table holds no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CaseValues for CaseConfig {
    fn lookup(&self, name: &str) -> Option<&CaseValue> {
        self.values.get(name)
    }
}

fn convert_value(name: &str, value: toml::Value) -> CaseResult<CaseValue> {
    match value {
        toml::Value::String(text) => Ok(CaseValue::Text(text)),
        toml::Value::Integer(number) => Ok(CaseValue::Integer(number)),
        toml::Value::Boolean(flag) => Ok(CaseValue::Bool(flag)),
        toml::Value::Float(number) => Ok(CaseValue::Text(number.to_string())),
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                toml::Value::String(text) => Ok(text),
                other => Err(CaseError::InvalidVariable {
                    name: name.to_owned(),
                    value: other.to_string(),
                    expected: "an array of strings",
                }),
            })
            .collect::<CaseResult<Vec<_>>>()
            .map(CaseValue::List),
        other => Err(CaseError::InvalidVariable {
            name: name.to_owned(),
            value: other.to_string(),
            expected: "a string, integer, boolean, or array of strings",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CaseConfig {
        CaseConfig::from_toml_str(text, Path::new("env_case.toml")).expect("parse")
    }

    #[test]
    fn unset_text_is_treated_as_absent() {
        let config = parse("DOUT_S_ROOT = \"UNSET\"\nCASE = \"\"\n");
        assert_eq!(config.text("DOUT_S_ROOT"), None);
        assert_eq!(config.text("CASE"), None);
        assert!(matches!(
            config.require_text("DOUT_S_ROOT"),
            Err(CaseError::MissingVariable { .. })
        ));
    }

    #[test]
    fn integers_render_as_text_and_parse_from_text() {
        let config = parse("REST_N = 5\nSTOP_N = \"10\"\n");
        assert_eq!(config.integer("REST_N").unwrap(), Some(5));
        assert_eq!(config.integer("STOP_N").unwrap(), Some(10));
        assert_eq!(config.text("REST_N").as_deref(), Some("5"));
        assert_eq!(config.integer("NINST_ATM").unwrap(), None);
    }

    #[test]
    fn non_numeric_integer_is_rejected() {
        let config = parse("NINST_ATM = \"two\"\n");
        assert!(matches!(
            config.integer("NINST_ATM"),
            Err(CaseError::InvalidVariable { .. })
        ));
    }

    #[test]
    fn flags_accept_booleans_and_upper_case_strings() {
        let config = parse(
            "A = true\nB = \"FALSE\"\nC = \"TRUE\"\nD = \"UNSET\"\nE = \"maybe\"\n",
        );
        assert!(config.flag("A").unwrap());
        assert!(!config.flag("B").unwrap());
        assert!(config.flag("C").unwrap());
        assert!(!config.flag("D").unwrap());
        assert!(!config.flag("MISSING").unwrap());
        assert!(config.flag("E").is_err());
    }

    #[test]
    fn lists_accept_arrays_and_separated_text() {
        let config = parse("ONE = [\"cam\", \"clm\"]\nTWO = \"cam, clm  cice\"\n");
        assert_eq!(config.list("ONE"), vec!["cam", "clm"]);
        assert_eq!(config.list("TWO"), vec!["cam", "clm", "cice"]);
        assert!(config.list("THREE").is_empty());
    }

    #[test]
    fn nested_tables_are_rejected() {
        let error = CaseConfig::from_toml_str("[nested]\nkey = 1\n", Path::new("x.toml"))
            .expect_err("tables are not case variables");
        assert!(matches!(error, CaseError::InvalidVariable { .. }));
    }

    #[test]
    fn malformed_toml_reports_origin() {
        let error = CaseConfig::from_toml_str("CASE = ", Path::new("/case/env_case.toml"))
            .expect_err("invalid toml");
        assert!(error.to_string().contains("/case/env_case.toml"));
    }

    #[test]
    fn builder_values_are_visible_through_the_trait() {
        let config = CaseConfig::new()
            .with("CASE", "b40")
            .with("NINST_ATM", 2_i64)
            .with("DOUT_L_DELETE_LOCAL_FILES", true);
        let values: &dyn CaseValues = &config;
        assert_eq!(values.text("CASE").as_deref(), Some("b40"));
        assert_eq!(values.integer("NINST_ATM").unwrap(), Some(2));
        assert!(values.flag("DOUT_L_DELETE_LOCAL_FILES").unwrap());
    }
}
