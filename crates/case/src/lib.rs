#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `case` gathers the read-only inputs every archiving phase consumes: the
//! case variable table ([`CaseConfig`]), the append-only status log
//! ([`CaseStatus`]), and the per-component archive rules ([`ArchiveSpec`]).
//!
//! # Design
//!
//! - [`CaseValues`] is the accessor trait the archivers depend on. The
//!   [`CaseConfig`] implementation loads `env_case.toml`; tests assemble
//!   tables in memory with [`CaseConfig::with`].
//! - [`CaseStatus`] appends timestamped phase markers and answers the
//!   precondition questions ("did the run succeed?", "did short-term
//!   archiving finish?").
//! - [`ArchiveSpec`] is loaded once per invocation from `env_archive.toml`
//!   and never mutated afterwards.
//!
//! # Errors
//!
//! All fallible operations return [`CaseError`], which carries the offending
//! path or variable name.
//!
//! # Examples
//!
//! ```
//! use case::{CaseConfig, CaseValues};
//!
//! let config = CaseConfig::new()
//!     .with("CASE", "b40.1850")
//!     .with("DOUT_S_ROOT", "UNSET");
//!
//! assert_eq!(config.text("CASE").as_deref(), Some("b40.1850"));
//! assert!(config.require_text("DOUT_S_ROOT").is_err());
//! ```

mod config;
mod error;
mod spec;
mod status;

pub use config::{CaseConfig, CaseValue, CaseValues, ENV_CASE_FILE, UNSET};
pub use error::{CaseError, CaseResult};
pub use spec::{
    ArchiveSpec, ComponentSpec, ENV_ARCHIVE_FILE, FileExtensionRule, LOGS_SUBDIR, RESTART_SUBDIR,
    UNSET_VARNAME,
};
pub use status::{
    CASE_STATUS_FILE, CaseStatus, LT_ARCHIVE_COMPLETED, LT_ARCHIVE_STARTING, RUN_SUCCESSFUL,
    ST_ARCHIVE_COMPLETED, ST_ARCHIVE_STARTING,
};
