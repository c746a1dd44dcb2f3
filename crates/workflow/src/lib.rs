#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `workflow` holds the two top-level commands. [`ShortTermArchive`] checks
//! the run, then archives, lists, or undoes the short-term archive.
//! [`LongTermArchive`] checks that short-term archiving completed and hands
//! the archive tree to the configured transport.
//!
//! # Design
//!
//! Both commands read the case through the `case` crate and record their
//! progress in `CaseStatus`: the starting marker is appended before any file
//! moves and the completed marker only after every file relocated. The
//! per-file work lives in `engine` and `transport`; this crate decides when
//! it may run and converts failures into [`ArchiveError`].
//!
//! # Errors
//!
//! [`ArchiveError`] is the user-facing taxonomy. [`ArchiveError::exit_code`]
//! maps each failure onto an [`ExitCode`].
//!
//! # Examples
//!
//! ```
//! use case::{CaseConfig, CaseStatus, ST_ARCHIVE_STARTING};
//! use workflow::{ExitCode, LongTermArchive};
//!
//! let caseroot = tempfile::tempdir().unwrap();
//! CaseStatus::in_caseroot(caseroot.path())
//!     .append(ST_ARCHIVE_STARTING)
//!     .unwrap();
//!
//! let config = CaseConfig::new().with("DOUT_L_MODE", "copy_dirs_local");
//! let error = LongTermArchive::from_parts(caseroot.path(), config)
//!     .run()
//!     .unwrap_err();
//! assert_eq!(error.exit_code(), ExitCode::PreconditionNotMet);
//! ```

mod error;
mod exit_code;
mod long_term;
mod short_term;

pub use error::ArchiveError;
pub use exit_code::ExitCode;
pub use long_term::LongTermArchive;
pub use short_term::{RunCheck, ShortTermArchive, ShortTermMode, ShortTermOutcome};
