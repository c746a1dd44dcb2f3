use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for case configuration helpers.
pub type CaseResult<T> = Result<T, CaseError>;

/// Failures raised while reading case variables, archive specifications, or
/// the `CaseStatus` log.
#[derive(Debug, Error)]
pub enum CaseError {
    /// A configuration file could not be read.
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// A configuration file is not valid TOML or does not match the expected layout.
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: toml::de::Error,
    },
    /// A required case variable is absent or set to `UNSET`.
    #[error("case variable {name} is required but is not set")]
    MissingVariable {
        /// Name of the variable.
        name: String,
    },
    /// A case variable holds a value of the wrong shape.
    #[error("case variable {name} has invalid value '{value}': expected {expected}")]
    InvalidVariable {
        /// Name of the variable.
        name: String,
        /// Offending value rendered as text.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// An archive rule carries a suffix that does not compile as a regular expression.
    #[error("component '{component}' has invalid regex_suffix '{suffix}': {source}")]
    InvalidPattern {
        /// Component declaring the rule.
        component: String,
        /// Suffix as written in the archive specification.
        suffix: String,
        /// Regex compiler diagnostic.
        #[source]
        source: regex::Error,
    },
    /// Appending to the `CaseStatus` log failed.
    #[error("failed to append to '{}': {source}", .path.display())]
    StatusWrite {
        /// Status log path.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
}

impl CaseError {
    pub(crate) fn missing(name: &str) -> Self {
        Self::MissingVariable {
            name: name.to_owned(),
        }
    }
}
